//! Position arithmetic for board columns.
//!
//! These functions are the single source of truth for position values, both
//! when a task is created at the end of a column and when a column is
//! renumbered after a drag.

use crate::error::OrderingError;

/// Smallest legal position.
pub const POSITION_MIN: i64 = 1_000;
/// Spacing between consecutive ranks.
pub const POSITION_STEP: i64 = 1_000;
/// Saturation cap. Items past the cap share this value and keep their stable
/// list order; accepted degradation for very deep columns.
pub const POSITION_MAX: i64 = 1_000_000;

/// Position for the item at 0-based `index` within its column.
///
/// Monotone in `index`, deterministic, saturating at [`POSITION_MAX`] for
/// every `usize` input.
pub fn position_for_index(index: usize) -> i64 {
    let rank = i64::try_from(index).map_or(i64::MAX, |i| i.saturating_add(1));
    rank.saturating_mul(POSITION_STEP).min(POSITION_MAX)
}

/// Position for a task appended to a column whose current maximum position is
/// `max` (`None` for an empty column).
pub fn position_after(max: Option<i64>) -> i64 {
    match max {
        Some(m) => (m + POSITION_STEP).min(POSITION_MAX),
        None => POSITION_MIN,
    }
}

/// Checks that `position` lies in `[POSITION_MIN, POSITION_MAX]`.
pub fn validate_position(position: i64) -> Result<(), OrderingError> {
    if (POSITION_MIN..=POSITION_MAX).contains(&position) {
        Ok(())
    } else {
        Err(OrderingError::PositionOutOfBounds { position })
    }
}
