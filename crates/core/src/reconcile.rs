//! Reorders a board after a drag gesture and computes the diff to persist.

use crate::board::Board;
use crate::error::OrderingError;
use crate::model::{PositionUpdate, Status, Task};
use crate::position::position_for_index;

/// One end of a drag gesture: a column and a 0-based index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Column.
    pub status: Status,
    /// Index within the column.
    pub index: usize,
}

/// A drag gesture.
///
/// `dest` is `None` when the gesture was cancelled (dropped outside any
/// column); reconciling such a move is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Where the task was picked up.
    pub source: Slot,
    /// Where it was dropped, if anywhere.
    pub dest: Option<Slot>,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Board with the source and destination columns replaced.
    ///
    /// Task values inside keep their stored positions; only `diff` carries
    /// the recomputed ones. Fresh positions appear on the next authoritative
    /// fetch and re-projection.
    pub board: Board,
    /// `(id, status, position)` changes to persist, in emission order: the
    /// mandatory moved-task entry first, then the destination column sweep,
    /// then the source column sweep for cross-column moves.
    pub diff: Vec<PositionUpdate>,
}

/// Applies one drag gesture to `board`.
///
/// The moved task's entry is always emitted, even for a same-slot drop where
/// nothing changed; downstream consumers rely on one entry per completed
/// gesture. Column sweeps compare each task's recomputed position against its
/// stored one, so the moved task (whose stored position is stale) can appear
/// a second time when its rank actually changed.
///
/// A `source` slot that does not exist on the board is a consistency fault:
/// the call aborts with an error and no diff (the input board is never
/// mutated), and the caller is expected to log it and refresh from the store.
pub fn reconcile(board: &Board, mv: Move) -> Result<Reconciled, OrderingError> {
    let Some(dest) = mv.dest else {
        return Ok(Reconciled {
            board: board.clone(),
            diff: Vec::new(),
        });
    };

    let mut source_col: Vec<Task> = board.column(mv.source.status).to_vec();
    if mv.source.index >= source_col.len() {
        return Err(OrderingError::SourceTaskMissing {
            status: mv.source.status,
            index: mv.source.index,
        });
    }
    let mut moved = source_col.remove(mv.source.index);
    if mv.source.status != dest.status {
        moved.status = dest.status;
    }

    let mut board = board.clone();
    board.set_column(mv.source.status, source_col);

    let mut dest_col: Vec<Task> = board.column(dest.status).to_vec();
    // An index past the end appends.
    let insert_at = dest.index.min(dest_col.len());
    dest_col.insert(insert_at, moved.clone());
    board.set_column(dest.status, dest_col);

    let mut diff = Vec::new();
    diff.push(PositionUpdate {
        id: moved.id.clone(),
        status: dest.status,
        position: position_for_index(dest.index),
    });
    sweep_column(&board, dest.status, &mut diff);
    if mv.source.status != dest.status {
        sweep_column(&board, mv.source.status, &mut diff);
    }

    Ok(Reconciled { board, diff })
}

/// Emits an entry for every task whose recomputed position differs from its
/// stored one.
fn sweep_column(board: &Board, status: Status, diff: &mut Vec<PositionUpdate>) {
    for (index, task) in board.column(status).iter().enumerate() {
        let new_position = position_for_index(index);
        if task.position != new_position {
            diff.push(PositionUpdate {
                id: task.id.clone(),
                status,
                position: new_position,
            });
        }
    }
}
