//! Error types for wallet provisioning, duplicate detection and storage
//!
//! `WalletError` is what a single wallet (or its constructor) reports.
//! `ManagerError` is what the registry surfaces to its callers; constructor
//! failures are carried through verbatim.

use crate::assets::AssetType;
use crate::wallet::WalletId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid wallet name: {0}")]
    InvalidName(String),

    #[error("Wallet already exists: {0}")]
    WalletExists(String),

    #[error("Invalid passphrase: {0}")]
    InvalidPassphrase(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid extended public key: {0}")]
    InvalidXpub(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),

    #[error("Wallet {0} is not open")]
    NotOpen(WalletId),

    #[error("Wallet {0} is watch-only and holds no private keys")]
    WatchOnly(WalletId),

    #[error("Account not found: {0}")]
    AccountNotFound(u32),

    #[error("Invalid account operation: {0}")]
    InvalidAccount(String),

    #[error("Invalid balance: {0}")]
    InvalidBalance(String),

    #[error("Sync progress listener already exists: {0}")]
    ListenerExists(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Failed to construct {asset} wallet: {source}")]
    Construction {
        asset: AssetType,
        #[source]
        source: WalletError,
    },

    #[error("Wallet {0} is not open and cannot be checked")]
    WalletNotOpen(WalletId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Wallet {wallet_id} is registered as {expected} but reports {actual}")]
    AssetTypeMismatch {
        wallet_id: WalletId,
        expected: AssetType,
        actual: AssetType,
    },

    #[error("Key lookup failed for wallet {wallet_id}: {source}")]
    Derivation {
        wallet_id: WalletId,
        #[source]
        source: WalletError,
    },

    #[error("{asset} wallet {wallet_id} not found")]
    WalletNotFound { asset: AssetType, wallet_id: WalletId },

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ManagerError {
    /// Wrap a constructor failure for the given asset
    pub fn construction(asset: AssetType, source: WalletError) -> Self {
        Self::Construction { asset, source }
    }

    /// Wrap a key-store or derivation failure hit while scanning a wallet
    pub fn derivation(wallet_id: WalletId, source: WalletError) -> Self {
        Self::Derivation { wallet_id, source }
    }
}
