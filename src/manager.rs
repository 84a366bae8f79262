/// Assets Manager - Wallet Registry
///
/// Owns every loaded wallet, partitioned by asset type, provisions new
/// wallets through the per-asset constructors and answers duplicate-wallet
/// queries by seed or account xpub.
use crate::assets::{AssetType, ChainParams};
use crate::config::AssetsConfig;
use crate::error::{ManagerError, WalletError};
use crate::storage::Storage;
use crate::wallet::{
    read_guard, write_guard, Asset, PassphraseType, Wallet, WalletAuthInfo, WalletId,
    IMPORTED_ACCOUNT_NUMBER,
};
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, RwLock};

type Partition = BTreeMap<WalletId, Arc<Wallet>>;

pub struct AssetsManager {
    config: AssetsConfig,
    storage: Arc<Storage>,
    assets: RwLock<HashMap<AssetType, Partition>>,
    db: OnceLock<Arc<Storage>>,
}

impl AssetsManager {
    // ============================================================================
    // Constructor
    // ============================================================================

    /// Create the manager and load every persisted wallet in the closed state
    pub fn new(config: AssetsConfig) -> Result<Self> {
        let storage = Arc::new(Storage::new_with_base_dir(
            config.root_dir.join(config.network.as_str()),
        ));

        let manager = Self {
            config,
            storage,
            assets: RwLock::new(HashMap::new()),
            db: OnceLock::new(),
        };
        manager.load_wallets()?;
        Ok(manager)
    }

    /// Create the manager from environment configuration
    pub fn from_env() -> Result<Self> {
        Self::new(AssetsConfig::from_env())
    }

    fn load_wallets(&self) -> Result<()> {
        let mut assets = write_guard(&self.assets);

        for asset in AssetType::ALL {
            let params = self.chain_params(asset);
            for id in self.storage.list_wallet_ids(asset)? {
                if !self.storage.wallet_exists(asset, id) {
                    log::warn!("Skipping incomplete {} wallet directory {}", asset, id);
                    continue;
                }
                let wallet = Arc::new(Wallet::load(id, params, &self.storage)?);
                self.bind_db(&wallet);
                assets.entry(asset).or_default().insert(id, wallet);
            }
        }

        let total: usize = assets.values().map(BTreeMap::len).sum();
        log::info!("Loaded {} wallet(s) from {:?}", total, self.storage.base_dir());
        Ok(())
    }

    pub fn config(&self) -> &AssetsConfig {
        &self.config
    }

    pub fn chain_params(&self, asset: AssetType) -> ChainParams {
        ChainParams::new(asset, self.config.network)
    }

    /// Shared persistence handle, bound from the first wallet
    pub fn db(&self) -> Option<Arc<Storage>> {
        self.db.get().cloned()
    }

    fn bind_db(&self, wallet: &Wallet) {
        if self.db.get().is_some() {
            return;
        }
        if let Some(db) = wallet.db() {
            if self.db.set(db).is_ok() {
                log::debug!("Bound persistence handle from {} wallet {}", wallet.asset_type(), wallet.id());
            }
        }
    }

    // ============================================================================
    // Provisioning
    // ============================================================================

    pub fn create_wallet(
        &self,
        asset: AssetType,
        name: &str,
        passphrase: &str,
        passphrase_type: PassphraseType,
    ) -> Result<Arc<Wallet>> {
        let auth = auth_info(name, passphrase, passphrase_type);
        self.register(asset, |params, db| Wallet::create_new(&auth, params, db))
    }

    pub fn create_watch_only_wallet(
        &self,
        asset: AssetType,
        name: &str,
        extended_public_key: &str,
    ) -> Result<Arc<Wallet>> {
        self.register(asset, |params, db| {
            Wallet::create_watch_only(name, extended_public_key, params, db)
        })
    }

    /// Restore a wallet from a seed
    ///
    /// Does not check for an existing wallet with the same seed; callers that
    /// want to prevent duplicates run `wallet_with_seed` first.
    pub fn restore_wallet(
        &self,
        asset: AssetType,
        seed_mnemonic: &str,
        name: &str,
        passphrase: &str,
        passphrase_type: PassphraseType,
    ) -> Result<Arc<Wallet>> {
        let auth = auth_info(name, passphrase, passphrase_type);
        self.register(asset, |params, db| Wallet::restore(seed_mnemonic, &auth, params, db))
    }

    /// Run a constructor and insert its wallet; a failure changes nothing
    fn register(
        &self,
        asset: AssetType,
        construct: impl FnOnce(ChainParams, &Arc<Storage>) -> std::result::Result<Wallet, WalletError>,
    ) -> Result<Arc<Wallet>> {
        let params = self.chain_params(asset);

        // Held across construction so id allocation and insertion are one step
        let mut assets = write_guard(&self.assets);

        let wallet = construct(params, &self.storage)
            .map_err(|e| ManagerError::construction(asset, e))?;
        let wallet = Arc::new(wallet);

        assets.entry(asset).or_default().insert(wallet.id(), Arc::clone(&wallet));
        self.bind_db(&wallet);

        Ok(wallet)
    }

    // ============================================================================
    // Registry access
    // ============================================================================

    pub fn wallet(&self, asset: AssetType, wallet_id: WalletId) -> Result<Arc<Wallet>> {
        read_guard(&self.assets)
            .get(&asset)
            .and_then(|partition| partition.get(&wallet_id))
            .cloned()
            .ok_or(ManagerError::WalletNotFound { asset, wallet_id })
    }

    pub fn wallets_of(&self, asset: AssetType) -> Vec<Arc<Wallet>> {
        read_guard(&self.assets)
            .get(&asset)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn all_wallets(&self) -> Vec<Arc<Wallet>> {
        AssetType::ALL
            .into_iter()
            .flat_map(|asset| self.wallets_of(asset))
            .collect()
    }

    pub fn open_wallet(&self, asset: AssetType, wallet_id: WalletId) -> Result<Arc<Wallet>> {
        let wallet = self.wallet(asset, wallet_id)?;
        wallet.open()?;
        Ok(wallet)
    }

    pub fn close_wallet(&self, asset: AssetType, wallet_id: WalletId) -> Result<()> {
        self.wallet(asset, wallet_id)?.close();
        Ok(())
    }

    /// Unload a wallet and delete its data from disk
    pub fn delete_wallet(&self, asset: AssetType, wallet_id: WalletId) -> Result<()> {
        let mut assets = write_guard(&self.assets);
        let wallet = assets
            .get_mut(&asset)
            .and_then(|partition| partition.remove(&wallet_id))
            .ok_or(ManagerError::WalletNotFound { asset, wallet_id })?;

        wallet.close();
        self.storage.delete_wallet(asset, wallet_id)?;
        Ok(())
    }

    // ============================================================================
    // Duplicate detection
    // ============================================================================

    /// Id of the wallet that has an account with the given xpub
    ///
    /// Every wallet of the asset must be open; a closed one fails the search
    /// instead of being skipped.
    pub fn wallet_with_xpub(&self, asset: AssetType, xpub: &str) -> Result<Option<WalletId>> {
        let assets = read_guard(&self.assets);
        let Some(partition) = assets.get(&asset) else {
            return Ok(None);
        };
        find_by_xpub(asset, partition.values().map(|w| &**w as &dyn Asset), xpub)
    }

    /// Id of the wallet created or restored from the given seed
    ///
    /// A blank seed, including one of only whitespace, is rejected before
    /// any wallet is read.
    pub fn wallet_with_seed(&self, asset: AssetType, seed_mnemonic: &str) -> Result<Option<WalletId>> {
        if seed_mnemonic.trim().is_empty() {
            return Err(ManagerError::InvalidArgument("seed cannot be empty".to_string()));
        }

        let assets = read_guard(&self.assets);
        let Some(partition) = assets.get(&asset) else {
            return Ok(None);
        };
        find_by_seed(asset, partition.values().map(|w| &**w as &dyn Asset), seed_mnemonic)
    }
}

fn auth_info(name: &str, passphrase: &str, passphrase_type: PassphraseType) -> WalletAuthInfo {
    WalletAuthInfo {
        name: name.to_string(),
        passphrase: passphrase.to_string(),
        passphrase_type,
    }
}

/// Check a scan target is open and belongs to the partition being scanned
fn check_scan_target(asset: AssetType, wallet: &dyn Asset) -> Result<()> {
    if wallet.asset_type() != asset {
        return Err(ManagerError::AssetTypeMismatch {
            wallet_id: wallet.wallet_id(),
            expected: asset,
            actual: wallet.asset_type(),
        });
    }
    if !wallet.wallet_opened() {
        return Err(ManagerError::WalletNotOpen(wallet.wallet_id()));
    }
    Ok(())
}

fn find_by_xpub<'a>(
    asset: AssetType,
    wallets: impl IntoIterator<Item = &'a dyn Asset>,
    xpub: &str,
) -> Result<Option<WalletId>> {
    for wallet in wallets {
        check_scan_target(asset, wallet)?;
        let wallet_id = wallet.wallet_id();

        let accounts = wallet
            .accounts_raw()
            .map_err(|e| ManagerError::derivation(wallet_id, e))?;

        for account in accounts.iter().filter(|a| a.number != IMPORTED_ACCOUNT_NUMBER) {
            let account_xpub = wallet
                .account_xpub(account.number)
                .map_err(|e| ManagerError::derivation(wallet_id, e))?;

            if account_xpub == xpub {
                return Ok(Some(wallet_id));
            }
        }
    }
    Ok(None)
}

fn find_by_seed<'a>(
    asset: AssetType,
    wallets: impl IntoIterator<Item = &'a dyn Asset>,
    seed_mnemonic: &str,
) -> Result<Option<WalletId>> {
    for wallet in wallets {
        check_scan_target(asset, wallet)?;
        let wallet_id = wallet.wallet_id();

        let accounts = wallet
            .accounts_raw()
            .map_err(|e| ManagerError::derivation(wallet_id, e))?;

        for account in accounts.iter().filter(|a| a.number != IMPORTED_ACCOUNT_NUMBER) {
            let derived = wallet
                .derive_account_xpub(seed_mnemonic, account.number, wallet.chain_params())
                .map_err(|e| ManagerError::derivation(wallet_id, e))?;

            let uses_same_seed = wallet
                .account_xpub_matches(account.number, &derived)
                .map_err(|e| ManagerError::derivation(wallet_id, e))?;

            if uses_same_seed {
                return Ok(Some(wallet_id));
            }
        }
    }
    Ok(None)
}
