//! Sync progress pipeline
//!
//! - `types.rs` - Status updates, stages and progress reports
//! - `listener.rs` - Engine callback contract and the buffered listener
//! - `notifier.rs` - Per-wallet fan-out and current-stage tracking

mod listener;
mod notifier;
mod types;

pub use listener::{SyncProgress, SyncProgressListener, SYNC_STATUS_BUFFER};
pub use notifier::SyncNotifier;
pub use types::{DebugInfo, ProgressReport, SyncStage, SyncStatusUpdate};
