//! Storage and persistence layer
//!
//! - File system operations
//! - Persisted data models

mod file_system;
mod models;

pub use file_system::Storage;
pub use models::{AccountRecord, WalletMetadata};
