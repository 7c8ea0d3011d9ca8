//! Faults surfaced by the ordering engine.

use thiserror::Error;

use crate::model::Status;
use crate::position::{POSITION_MAX, POSITION_MIN};

/// Errors from board projection and reconciliation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// The dragged task was not where the gesture said it was. The board is
    /// left untouched and no diff is produced; callers should log this and
    /// fall back to an authoritative refresh.
    #[error("no task at index {index} of the {status} column")]
    SourceTaskMissing {
        /// Column the gesture named as its source.
        status: Status,
        /// Index that was out of range.
        index: usize,
    },

    /// A position value escaped the legal range.
    #[error("position {position} out of range [{}, {}]", POSITION_MIN, POSITION_MAX)]
    PositionOutOfBounds {
        /// The offending value.
        position: i64,
    },
}
