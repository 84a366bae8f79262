/// Wallet Core Module
///
/// One HD wallet of one asset type:
///
/// - `keys.rs` - Seed parsing and account xpub derivation
/// - `account.rs` - Accounts and balances
/// - `lifecycle.rs` - Constructors, loading, open/close
/// - `account_ops.rs` - Account creation, renaming and bookkeeping

pub mod account;
pub mod account_ops;
pub mod keys;
pub mod lifecycle;

pub use account::{Account, Balance, IMPORTED_ACCOUNT_NUMBER};
pub use keys::KeyManager;

use crate::assets::{AssetType, ChainParams};
use crate::error::WalletError;
use crate::storage::{AccountRecord, Storage};
use crate::sync::{SyncNotifier, SyncProgressListener};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type WalletId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassphraseType {
    Pin,
    Password,
}

/// Naming and authentication handed to wallet constructors
#[derive(Debug, Clone)]
pub struct WalletAuthInfo {
    pub name: String,
    pub passphrase: String,
    pub passphrase_type: PassphraseType,
}

/// Capabilities the registry relies on when scanning wallets for duplicates
pub trait Asset: Send + Sync {
    fn wallet_id(&self) -> WalletId;

    fn asset_type(&self) -> AssetType;

    fn chain_params(&self) -> &ChainParams;

    fn wallet_opened(&self) -> bool;

    /// All accounts, including the imported-keys account
    fn accounts_raw(&self) -> Result<Vec<Account>, WalletError>;

    /// Stored xpub of an HD account
    fn account_xpub(&self, account: u32) -> Result<String, WalletError>;

    /// Derive an account xpub from a seed that is not attached to this wallet
    fn derive_account_xpub(
        &self,
        seed_mnemonic: &str,
        account: u32,
        params: &ChainParams,
    ) -> Result<String, WalletError> {
        KeyManager::derive_account_xpub(seed_mnemonic, account, params)
    }

    fn account_xpub_matches(&self, account: u32, xpub: &str) -> Result<bool, WalletError> {
        Ok(self.account_xpub(account)? == xpub)
    }
}

pub struct Wallet {
    id: WalletId,
    name: String,
    params: ChainParams,
    watch_only: bool,
    passphrase_hash: Option<String>,
    opened: AtomicBool,
    accounts: RwLock<Vec<AccountRecord>>,
    db: Arc<Storage>,
    sync: SyncNotifier,
}

impl Wallet {
    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_watch_only(&self) -> bool {
        self.watch_only
    }

    /// Persistence handle this wallet was created with
    pub fn db(&self) -> Option<Arc<Storage>> {
        Some(Arc::clone(&self.db))
    }

    pub fn account(&self, number: u32) -> Result<Account, WalletError> {
        self.ensure_open()?;
        read_guard(&self.accounts)
            .iter()
            .find(|record| record.number == number)
            .map(|record| record.to_account(self.id))
            .ok_or(WalletError::AccountNotFound(number))
    }

    /// Display path of an account, e.g. `m/84'/0'/0'`
    pub fn account_hd_path(&self, number: u32) -> String {
        format!("{}{}'", self.params.hd_prefix(), number)
    }

    /// Callbacks the network sync engine drives for this wallet
    pub fn sync_notifier(&self) -> &SyncNotifier {
        &self.sync
    }

    pub fn add_sync_progress_listener(
        &self,
        listener: Arc<dyn SyncProgressListener>,
        unique_id: &str,
    ) -> Result<(), WalletError> {
        self.sync.add_listener(unique_id, listener)
    }

    pub fn remove_sync_progress_listener(&self, unique_id: &str) {
        self.sync.remove_listener(unique_id);
    }

    fn ensure_open(&self) -> Result<(), WalletError> {
        if self.wallet_opened() {
            Ok(())
        } else {
            Err(WalletError::NotOpen(self.id))
        }
    }
}

impl Asset for Wallet {
    fn wallet_id(&self) -> WalletId {
        self.id
    }

    fn asset_type(&self) -> AssetType {
        self.params.asset_type
    }

    fn chain_params(&self) -> &ChainParams {
        &self.params
    }

    fn wallet_opened(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }

    fn accounts_raw(&self) -> Result<Vec<Account>, WalletError> {
        self.ensure_open()?;
        Ok(read_guard(&self.accounts)
            .iter()
            .map(|record| record.to_account(self.id))
            .collect())
    }

    fn account_xpub(&self, account: u32) -> Result<String, WalletError> {
        self.ensure_open()?;
        let accounts = read_guard(&self.accounts);
        let record = accounts
            .iter()
            .find(|record| record.number == account)
            .ok_or(WalletError::AccountNotFound(account))?;

        record.xpub.clone().ok_or_else(|| {
            WalletError::InvalidAccount(format!("account {} has no extended public key", account))
        })
    }
}

pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
