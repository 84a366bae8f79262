//! Data models for wallet storage

use crate::assets::{AssetType, NetworkType};
use crate::wallet::{Account, Balance, PassphraseType, WalletId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletMetadata {
    pub id: WalletId,
    pub name: String,
    pub asset_type: AssetType,
    pub network: NetworkType,
    pub watch_only: bool,
    /// Absent for watch-only wallets
    pub passphrase_type: Option<PassphraseType>,
    pub passphrase_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One account as persisted in `accounts.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub number: u32,
    pub name: String,
    /// Account-level xpub; none for the imported-keys account
    pub xpub: Option<String>,
    #[serde(default)]
    pub balance: Balance,
    #[serde(default)]
    pub external_key_count: u32,
    #[serde(default)]
    pub internal_key_count: u32,
    #[serde(default)]
    pub imported_key_count: u32,
}

impl AccountRecord {
    pub fn new(number: u32, name: impl Into<String>, xpub: Option<String>) -> Self {
        Self {
            number,
            name: name.into(),
            xpub,
            balance: Balance::default(),
            external_key_count: 0,
            internal_key_count: 0,
            imported_key_count: 0,
        }
    }

    pub fn to_account(&self, wallet_id: WalletId) -> Account {
        Account {
            wallet_id,
            number: self.number,
            name: self.name.clone(),
            balance: self.balance,
            external_key_count: self.external_key_count,
            internal_key_count: self.internal_key_count,
            imported_key_count: self.imported_key_count,
        }
    }
}
