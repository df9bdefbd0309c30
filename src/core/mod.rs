// src/core/mod.rs
//! Configuration, vendor client and file helpers shared by the web and CLI

pub mod config_manager;
pub mod finch_client;
pub mod fs_ops;

pub use config_manager::AppConfig;
pub use finch_client::FinchClient;
pub use fs_ops::FsOps;
