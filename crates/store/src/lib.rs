#![forbid(unsafe_code)]

//! Storage backends for the trellis task tracker.
//!
//! One synchronous [`Store`] trait, two backends: an in-memory map for tests
//! and ephemeral runs, and embedded SQLite for durable ones.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{NewTask, Store, TaskFilter, TaskOrder, TaskPatch};
