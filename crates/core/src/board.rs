//! Grouping of a workspace's tasks into per-status columns.

use std::collections::BTreeMap;

use crate::model::{Status, Task};

/// Per-status grouping of tasks, each column ascending by position.
///
/// Every status key is always present, possibly empty, so consumers can
/// render empty columns without special cases.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    columns: BTreeMap<Status, Vec<Task>>,
}

impl Board {
    /// Empty board with every column present.
    pub fn new() -> Self {
        let columns = Status::ALL.iter().map(|s| (*s, Vec::new())).collect();
        Self { columns }
    }

    /// Groups `tasks` by status and sorts each column ascending by position.
    ///
    /// The sort is stable, so tasks sharing a position (saturated columns)
    /// keep their input order. Idempotent: projecting a flattened projection
    /// reproduces it.
    pub fn project(tasks: Vec<Task>) -> Self {
        let mut board = Board::new();
        for task in tasks {
            if let Some(col) = board.columns.get_mut(&task.status) {
                col.push(task);
            }
        }
        for col in board.columns.values_mut() {
            col.sort_by_key(|t| t.position);
        }
        board
    }

    /// Tasks in `status`, ascending by position.
    pub fn column(&self, status: Status) -> &[Task] {
        self.columns.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the contents of one column.
    pub(crate) fn set_column(&mut self, status: Status, tasks: Vec<Task>) {
        self.columns.insert(status, tasks);
    }

    /// Columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &[Task])> {
        self.columns.iter().map(|(s, col)| (*s, col.as_slice()))
    }

    /// All tasks, column by column in display order.
    pub fn flatten(&self) -> Vec<Task> {
        self.columns.values().flatten().cloned().collect()
    }

    /// Total task count across all columns.
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Whether the board holds no tasks at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locates a task by id, returning its column and 0-based index.
    pub fn find(&self, id: &crate::ids::TaskId) -> Option<(Status, usize)> {
        for (status, col) in self.iter() {
            if let Some(index) = col.iter().position(|t| &t.id == id) {
                return Some((status, index));
            }
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{TaskId, WorkspaceId};

    fn task(id: &str, status: Status, position: i64) -> Task {
        Task {
            id: TaskId::from_str(id),
            workspace_id: WorkspaceId::from_str("w1"),
            project_id: None,
            assignee_id: None,
            name: format!("task {id}"),
            description: None,
            status,
            position,
            due_date: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn ids(col: &[Task]) -> Vec<&str> {
        col.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn every_column_present_even_when_empty() {
        let board = Board::project(vec![]);
        let statuses: Vec<Status> = board.iter().map(|(s, _)| s).collect();
        assert_eq!(statuses, Status::ALL.to_vec());
        for (_, col) in board.iter() {
            assert!(col.is_empty());
        }
    }

    #[test]
    fn groups_by_status_and_sorts_by_position() {
        let board = Board::project(vec![
            task("b", Status::Todo, 2_000),
            task("c", Status::Done, 1_000),
            task("a", Status::Todo, 1_000),
        ]);
        assert_eq!(ids(board.column(Status::Todo)), vec!["a", "b"]);
        assert_eq!(ids(board.column(Status::Done)), vec!["c"]);
        assert!(board.column(Status::Backlog).is_empty());
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn equal_positions_keep_input_order() {
        let board = Board::project(vec![
            task("first", Status::Backlog, 1_000_000),
            task("second", Status::Backlog, 1_000_000),
            task("third", Status::Backlog, 1_000_000),
        ]);
        assert_eq!(
            ids(board.column(Status::Backlog)),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn projection_is_idempotent() {
        let board = Board::project(vec![
            task("a", Status::Todo, 3_000),
            task("b", Status::Todo, 1_000),
            task("c", Status::InReview, 2_000),
            task("d", Status::Done, 1_000),
        ]);
        let again = Board::project(board.flatten());
        assert_eq!(again, board);
    }

    #[test]
    fn find_reports_column_and_index() {
        let board = Board::project(vec![
            task("a", Status::Todo, 1_000),
            task("b", Status::Todo, 2_000),
        ]);
        assert_eq!(
            board.find(&TaskId::from_str("b")),
            Some((Status::Todo, 1))
        );
        assert_eq!(board.find(&TaskId::from_str("zz")), None);
    }
}
