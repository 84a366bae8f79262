//! Accounts and balances
//!
//! Every HD wallet owns an ordered list of accounts plus one imported-keys
//! pseudo-account that sits outside the derivation tree.

use super::WalletId;
use serde::{Deserialize, Serialize};

/// Account number reserved for individually imported keys (2^31 - 1)
pub const IMPORTED_ACCOUNT_NUMBER: u32 = 0x7fff_ffff;

pub const DEFAULT_ACCOUNT_NAME: &str = "default";
pub const IMPORTED_ACCOUNT_NAME: &str = "imported";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub wallet_id: WalletId,
    pub number: u32,
    pub name: String,
    pub balance: Balance,
    pub external_key_count: u32,
    pub internal_key_count: u32,
    pub imported_key_count: u32,
}

impl Account {
    pub fn is_imported(&self) -> bool {
        self.number == IMPORTED_ACCOUNT_NUMBER
    }
}

/// Account balance in the chain's smallest unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub total: u64,
    pub spendable: u64,
    pub immature_reward: u64,
    pub locked_by_tickets: u64,
    pub voting_authority: u64,
    pub immature_stake_generation: u64,
}

impl Balance {
    /// Balance for chains without stake-locked funds
    pub fn simple(total: u64, spendable: u64) -> Self {
        Self {
            total,
            spendable,
            ..Default::default()
        }
    }

    /// Funds tied up in staking, or `None` if the categories overflow
    pub fn staking_total(&self) -> Option<u64> {
        self.immature_reward
            .checked_add(self.locked_by_tickets)?
            .checked_add(self.voting_authority)?
            .checked_add(self.immature_stake_generation)
    }

    /// Check the balance categories add up
    ///
    /// Without staking support every stake category must be zero and only
    /// `total >= spendable` is required.
    pub fn validate(&self, supports_staking: bool) -> Result<(), String> {
        if self.total < self.spendable {
            return Err(format!(
                "spendable {} exceeds total {}",
                self.spendable, self.total
            ));
        }

        let staking = self
            .staking_total()
            .ok_or_else(|| "stake balances overflow".to_string())?;

        if supports_staking {
            if self.spendable.checked_add(staking) != Some(self.total) {
                return Err(format!(
                    "total {} does not equal spendable {} plus staking {}",
                    self.total, self.spendable, staking
                ));
            }
        } else if staking != 0 {
            return Err("chain has no staking but stake balances are set".to_string());
        }

        Ok(())
    }
}
