#![forbid(unsafe_code)]

//! HTTP service for the task board: CRUD, filtered reads, and the
//! non-transactional bulk placement endpoint.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod seed;
pub mod tasks;
