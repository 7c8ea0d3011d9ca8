#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and board-ordering logic for the trellis task tracker.

pub mod api;
pub mod board;
pub mod error;
pub mod ids;
pub mod model;
pub mod position;
pub mod reconcile;

mod util;

pub use util::{new_id, now_ms};
