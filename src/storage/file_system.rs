use bip39::Mnemonic;
use std::fs;
use std::path::PathBuf;

use super::models::{AccountRecord, WalletMetadata};
use crate::assets::AssetType;
use crate::error::StorageError;
use crate::wallet::WalletId;

/// On-disk wallet store, laid out as `<base>/<ASSET>/<wallet id>/`
#[derive(Debug)]
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    /// Create storage with custom base directory
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the base directory path for wallet storage
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn asset_dir(&self, asset: AssetType) -> PathBuf {
        self.base_path.join(asset.as_str())
    }

    fn wallet_dir(&self, asset: AssetType, id: WalletId) -> PathBuf {
        self.asset_dir(asset).join(id.to_string())
    }

    /// Reserve a fresh wallet id for the asset and create its directory
    pub fn allocate_wallet_dir(&self, asset: AssetType) -> Result<WalletId, StorageError> {
        fs::create_dir_all(self.asset_dir(asset))?;
        let mut id = self.list_wallet_ids(asset)?.last().copied().unwrap_or(0) + 1;

        loop {
            match fs::create_dir(self.wallet_dir(asset, id)) {
                Ok(()) => {
                    log::debug!("Allocated {} wallet directory {}", asset, id);
                    return Ok(id);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => id += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Remove a partially written wallet directory after a failed construction
    pub fn discard_wallet_dir(&self, asset: AssetType, id: WalletId) {
        let dir = self.wallet_dir(asset, id);
        if let Err(e) = fs::remove_dir_all(&dir) {
            log::warn!("Failed to discard wallet directory {:?}: {}", dir, e);
        }
    }

    /// Check if a wallet with the given id exists for the asset
    pub fn wallet_exists(&self, asset: AssetType, id: WalletId) -> bool {
        self.wallet_dir(asset, id).join("metadata.json").exists()
    }

    /// Check if any wallet of the asset already uses `name`
    pub fn wallet_name_exists(&self, asset: AssetType, name: &str) -> Result<bool, StorageError> {
        for id in self.list_wallet_ids(asset)? {
            match self.load_metadata(asset, id) {
                Ok(meta) if meta.name == name => return Ok(true),
                Ok(_) => {}
                Err(StorageError::FileNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Save wallet metadata to disk
    pub fn save_metadata(&self, meta: &WalletMetadata) -> Result<(), StorageError> {
        let path = self.wallet_dir(meta.asset_type, meta.id).join("metadata.json");
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load wallet metadata from disk
    pub fn load_metadata(&self, asset: AssetType, id: WalletId) -> Result<WalletMetadata, StorageError> {
        let path = self.wallet_dir(asset, id).join("metadata.json");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let meta = serde_json::from_str(&contents)?;
        Ok(meta)
    }

    /// Save the account list (including xpubs) to disk
    pub fn save_accounts(
        &self,
        asset: AssetType,
        id: WalletId,
        accounts: &[AccountRecord],
    ) -> Result<(), StorageError> {
        let path = self.wallet_dir(asset, id).join("accounts.json");
        let json = serde_json::to_string_pretty(accounts)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load the account list from disk
    pub fn load_accounts(&self, asset: AssetType, id: WalletId) -> Result<Vec<AccountRecord>, StorageError> {
        let path = self.wallet_dir(asset, id).join("accounts.json");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let accounts = serde_json::from_str(&contents)?;
        Ok(accounts)
    }

    /// Save wallet seed mnemonic to disk
    pub fn save_seed(&self, asset: AssetType, id: WalletId, mnemonic: &Mnemonic) -> Result<(), StorageError> {
        let path = self.wallet_dir(asset, id).join("seed.txt");
        fs::write(path, mnemonic.to_string())?;
        Ok(())
    }

    /// Load wallet seed mnemonic from disk
    pub fn load_seed(&self, asset: AssetType, id: WalletId) -> Result<Mnemonic, StorageError> {
        let path = self.wallet_dir(asset, id).join("seed.txt");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let mnemonic = Mnemonic::parse(contents.trim()).map_err(|e| {
            StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid mnemonic: {}", e),
            ))
        })?;
        Ok(mnemonic)
    }

    /// List wallet ids stored for the asset, ascending
    pub fn list_wallet_ids(&self, asset: AssetType) -> Result<Vec<WalletId>, StorageError> {
        let asset_dir = self.asset_dir(asset);
        if !asset_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&asset_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(id) = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.parse::<WalletId>().ok())
                {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Delete a wallet and all its associated data from disk
    pub fn delete_wallet(&self, asset: AssetType, id: WalletId) -> Result<(), StorageError> {
        let wallet_dir = self.wallet_dir(asset, id);

        if !wallet_dir.exists() {
            return Err(StorageError::FileNotFound(wallet_dir.display().to_string()));
        }

        log::warn!("Deleting wallet directory: {:?}", wallet_dir);
        fs::remove_dir_all(&wallet_dir)?;
        log::info!("{} wallet {} deleted", asset, id);

        Ok(())
    }
}
