pub mod connection_cli;
pub mod core;
pub mod error;
pub mod store;
pub mod template_processor;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::core::{AppConfig, FinchClient};
pub use error::{DataKind, FinchError};
pub use web::{build_rocket, start_web_server};
