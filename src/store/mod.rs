// src/store/mod.rs
//! Flat-file persistence

pub mod connections;
pub mod csv_fields;
pub mod jobs;

pub use connections::{ConnectionRecord, ConnectionStore, NO_TOKEN_MESSAGE};
pub use jobs::{JobRecord, JobStore};
