/// Wallet lifecycle operations
///
/// Handles wallet creation, restoration, watch-only import, loading and
/// open/close. Constructors validate every input before touching disk and
/// remove the wallet directory again if a later write fails.
use super::account::{DEFAULT_ACCOUNT_NAME, IMPORTED_ACCOUNT_NAME, IMPORTED_ACCOUNT_NUMBER};
use super::{
    read_guard, write_guard, Asset, KeyManager, PassphraseType, Wallet, WalletAuthInfo, WalletId,
};
use crate::assets::ChainParams;
use crate::error::WalletError;
use crate::storage::{AccountRecord, Storage, WalletMetadata};
use crate::sync::SyncNotifier;
use bip39::Mnemonic;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Key material a new wallet is provisioned from
enum KeySource<'a> {
    Seed {
        mnemonic: Mnemonic,
        auth: &'a WalletAuthInfo,
    },
    WatchOnly {
        xpub: String,
    },
}

impl Wallet {
    /// Create a new wallet with a freshly generated seed
    pub fn create_new(
        auth: &WalletAuthInfo,
        params: ChainParams,
        db: &Arc<Storage>,
    ) -> Result<Self, WalletError> {
        let name = validate_name(db, &params, &auth.name)?;
        validate_passphrase(auth)?;

        let mnemonic = KeyManager::generate_seed()?;
        Self::provision(name, params, db, KeySource::Seed { mnemonic, auth })
    }

    /// Restore a wallet from an existing seed phrase
    ///
    /// No duplicate check happens here, see `AssetsManager::wallet_with_seed`.
    pub fn restore(
        seed_mnemonic: &str,
        auth: &WalletAuthInfo,
        params: ChainParams,
        db: &Arc<Storage>,
    ) -> Result<Self, WalletError> {
        let name = validate_name(db, &params, &auth.name)?;
        validate_passphrase(auth)?;

        let mnemonic = KeyManager::parse_seed(seed_mnemonic)?;
        Self::provision(name, params, db, KeySource::Seed { mnemonic, auth })
    }

    /// Create a wallet that tracks a single account xpub and cannot sign
    pub fn create_watch_only(
        name: &str,
        extended_public_key: &str,
        params: ChainParams,
        db: &Arc<Storage>,
    ) -> Result<Self, WalletError> {
        let name = validate_name(db, &params, name)?;
        let xpub = KeyManager::parse_xpub(extended_public_key, &params)?.to_string();

        Self::provision(name, params, db, KeySource::WatchOnly { xpub })
    }

    fn provision(
        name: String,
        params: ChainParams,
        db: &Arc<Storage>,
        source: KeySource<'_>,
    ) -> Result<Self, WalletError> {
        let (default_xpub, passphrase) = match &source {
            KeySource::Seed { mnemonic, auth } => {
                let xpub = KeyManager::account_xpub_from_mnemonic(mnemonic, 0, &params)?;
                let hash = KeyManager::hash_passphrase(&auth.passphrase);
                (xpub.to_string(), Some((auth.passphrase_type, hash)))
            }
            KeySource::WatchOnly { xpub } => (xpub.clone(), None),
        };

        let accounts = vec![
            AccountRecord::new(0, DEFAULT_ACCOUNT_NAME, Some(default_xpub)),
            AccountRecord::new(IMPORTED_ACCOUNT_NUMBER, IMPORTED_ACCOUNT_NAME, None),
        ];

        let asset = params.asset_type;
        let id = db.allocate_wallet_dir(asset)?;

        let metadata = WalletMetadata {
            id,
            name: name.clone(),
            asset_type: asset,
            network: params.network_type,
            watch_only: passphrase.is_none(),
            passphrase_type: passphrase.as_ref().map(|(kind, _)| *kind),
            passphrase_hash: passphrase.as_ref().map(|(_, hash)| hash.clone()),
            created_at: Utc::now(),
        };

        let persisted = (|| {
            db.save_metadata(&metadata)?;
            db.save_accounts(asset, id, &accounts)?;
            if let KeySource::Seed { mnemonic, .. } = &source {
                db.save_seed(asset, id, mnemonic)?;
            }
            Ok::<(), crate::error::StorageError>(())
        })();

        if let Err(e) = persisted {
            log::error!("Failed to persist {} wallet '{}': {}", asset, name, e);
            db.discard_wallet_dir(asset, id);
            return Err(e.into());
        }

        log::info!(
            "Created {}{} wallet '{}' with id {}",
            if metadata.watch_only { "watch-only " } else { "" },
            asset,
            name,
            id
        );

        Ok(Self {
            id,
            name,
            params,
            watch_only: metadata.watch_only,
            passphrase_hash: metadata.passphrase_hash,
            opened: AtomicBool::new(true),
            accounts: RwLock::new(accounts),
            db: Arc::clone(db),
            sync: SyncNotifier::new(id),
        })
    }

    /// Load a persisted wallet in the closed state
    pub fn load(id: WalletId, params: ChainParams, db: &Arc<Storage>) -> Result<Self, WalletError> {
        let metadata = db.load_metadata(params.asset_type, id)?;

        Ok(Self {
            id,
            name: metadata.name,
            params,
            watch_only: metadata.watch_only,
            passphrase_hash: metadata.passphrase_hash,
            opened: AtomicBool::new(false),
            accounts: RwLock::new(Vec::new()),
            db: Arc::clone(db),
            sync: SyncNotifier::new(id),
        })
    }

    /// Read accounts back from disk and mark the wallet open
    pub fn open(&self) -> Result<(), WalletError> {
        if self.wallet_opened() {
            return Ok(());
        }

        let records = self.db.load_accounts(self.params.asset_type, self.id)?;
        *write_guard(&self.accounts) = records;
        self.opened.store(true, Ordering::Release);

        log::info!("Opened {} wallet {} ('{}')", self.params.asset_type, self.id, self.name);
        Ok(())
    }

    /// Drop in-memory account state; the wallet can no longer be scanned
    pub fn close(&self) {
        if self.opened.swap(false, Ordering::AcqRel) {
            write_guard(&self.accounts).clear();
            log::info!("Closed {} wallet {}", self.params.asset_type, self.id);
        }
    }

    pub(super) fn persist_accounts(&self) -> Result<(), WalletError> {
        let accounts = read_guard(&self.accounts);
        self.db.save_accounts(self.params.asset_type, self.id, &accounts)?;
        Ok(())
    }

    pub(super) fn verify_passphrase(&self, passphrase: &str) -> Result<(), WalletError> {
        match &self.passphrase_hash {
            Some(hash) if *hash == KeyManager::hash_passphrase(passphrase) => Ok(()),
            Some(_) => Err(WalletError::InvalidPassphrase("incorrect passphrase".to_string())),
            None => Err(WalletError::WatchOnly(self.id)),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_records(
        id: WalletId,
        params: ChainParams,
        records: Vec<AccountRecord>,
        db: &Arc<Storage>,
    ) -> Self {
        Self {
            id,
            name: format!("fixture-{}", id),
            params,
            watch_only: true,
            passphrase_hash: None,
            opened: AtomicBool::new(true),
            accounts: RwLock::new(records),
            db: Arc::clone(db),
            sync: SyncNotifier::new(id),
        }
    }
}

fn validate_name(db: &Storage, params: &ChainParams, name: &str) -> Result<String, WalletError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WalletError::InvalidName("wallet name cannot be empty".to_string()));
    }

    if db.wallet_name_exists(params.asset_type, name)? {
        return Err(WalletError::WalletExists(name.to_string()));
    }

    Ok(name.to_string())
}

fn validate_passphrase(auth: &WalletAuthInfo) -> Result<(), WalletError> {
    if auth.passphrase.is_empty() {
        return Err(WalletError::InvalidPassphrase("passphrase cannot be empty".to_string()));
    }

    if auth.passphrase_type == PassphraseType::Pin
        && !auth.passphrase.chars().all(|c| c.is_ascii_digit())
    {
        return Err(WalletError::InvalidPassphrase("PIN must contain only digits".to_string()));
    }

    Ok(())
}
