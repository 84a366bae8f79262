//! Assets Core: multi-asset HD wallet registry
//!
//! Manages many independent wallets across asset types, each with several
//! HD accounts, and reports each wallet's sync progress through an ordered,
//! non-blocking event stream.
//!
//! # Architecture
//!
//! - **Wallet**: one HD wallet (standard or watch-only) of one asset type
//! - **Assets Manager**: the registry that provisions wallets and detects
//!   duplicates by seed or account xpub
//! - **Sync Progress**: turns sync-engine callbacks into `SyncStatusUpdate`s
//!
//! # Example
//!
//! ```ignore
//! use assets_core::{AssetType, AssetsConfig, AssetsManager, PassphraseType, SyncProgress};
//!
//! let manager = AssetsManager::new(AssetsConfig::from_env())?;
//!
//! if manager.wallet_with_seed(AssetType::Btc, &seed)?.is_none() {
//!     let wallet = manager.restore_wallet(AssetType::Btc, &seed, "savings", "1234", PassphraseType::Pin)?;
//!
//!     let (listener, mut updates) = SyncProgress::new();
//!     wallet.add_sync_progress_listener(Arc::new(listener), "ui")?;
//!     while let Some(update) = updates.recv().await {
//!         println!("{:?}", update.stage());
//!     }
//! }
//! ```

// Public modules
pub mod assets;
pub mod config;
pub mod error;
pub mod manager;
pub mod storage;
pub mod sync;
pub mod wallet;

// Re-exports for convenience
pub use assets::{AssetType, ChainParams, NetworkType};
pub use config::AssetsConfig;
pub use error::{ManagerError, StorageError, WalletError};
pub use manager::AssetsManager;
pub use sync::{
    DebugInfo, ProgressReport, SyncNotifier, SyncProgress, SyncProgressListener, SyncStage,
    SyncStatusUpdate,
};
pub use wallet::{
    Account, Asset, Balance, KeyManager, PassphraseType, Wallet, WalletAuthInfo, WalletId,
    IMPORTED_ACCOUNT_NUMBER,
};

// Common result type
pub type Result<T> = std::result::Result<T, ManagerError>;
