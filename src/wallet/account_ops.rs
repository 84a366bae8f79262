/// Account operations
///
/// Account creation, renaming and the balance / key-count bookkeeping the
/// sync engine feeds back into a wallet.
use super::account::IMPORTED_ACCOUNT_NUMBER;
use super::{write_guard, Balance, KeyManager, Wallet};
use crate::error::WalletError;
use crate::storage::AccountRecord;
use crate::wallet::Asset;

impl Wallet {
    /// Derive and store the next HD account
    ///
    /// Needs the private passphrase; watch-only wallets refuse.
    pub fn create_new_account(&self, name: &str, passphrase: &str) -> Result<u32, WalletError> {
        if self.watch_only {
            return Err(WalletError::WatchOnly(self.id));
        }
        self.ensure_open()?;
        self.verify_passphrase(passphrase)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(WalletError::InvalidAccount("account name cannot be empty".to_string()));
        }

        let seed = self.db.load_seed(self.asset_type(), self.id)?;

        let number = {
            let mut accounts = write_guard(&self.accounts);
            if accounts.iter().any(|record| record.name == name) {
                return Err(WalletError::InvalidAccount(format!("account '{}' already exists", name)));
            }

            let number = accounts
                .iter()
                .filter(|record| record.number != IMPORTED_ACCOUNT_NUMBER)
                .map(|record| record.number + 1)
                .max()
                .unwrap_or(0);

            let xpub = KeyManager::account_xpub_from_mnemonic(&seed, number, &self.params)?;

            // Keep the imported account last
            let position = accounts
                .iter()
                .position(|record| record.number == IMPORTED_ACCOUNT_NUMBER)
                .unwrap_or(accounts.len());
            accounts.insert(position, AccountRecord::new(number, name, Some(xpub.to_string())));
            number
        };

        self.persist_accounts()?;
        log::info!("Created account {} ('{}') in {} wallet {}", number, name, self.asset_type(), self.id);
        Ok(number)
    }

    pub fn rename_account(&self, number: u32, new_name: &str) -> Result<(), WalletError> {
        if number == IMPORTED_ACCOUNT_NUMBER {
            return Err(WalletError::InvalidAccount("imported account cannot be renamed".to_string()));
        }

        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(WalletError::InvalidAccount("account name cannot be empty".to_string()));
        }

        self.update_account(number, |record| record.name = new_name.to_string())
    }

    /// Record a balance reported for an account, rejecting inconsistent ones
    pub fn set_account_balance(&self, number: u32, balance: Balance) -> Result<(), WalletError> {
        balance
            .validate(self.params.supports_staking)
            .map_err(WalletError::InvalidBalance)?;

        self.update_account(number, |record| record.balance = balance)
    }

    pub fn set_account_key_counts(
        &self,
        number: u32,
        external: u32,
        internal: u32,
        imported: u32,
    ) -> Result<(), WalletError> {
        self.update_account(number, |record| {
            record.external_key_count = external;
            record.internal_key_count = internal;
            record.imported_key_count = imported;
        })
    }

    fn update_account(
        &self,
        number: u32,
        apply: impl FnOnce(&mut AccountRecord),
    ) -> Result<(), WalletError> {
        self.ensure_open()?;
        {
            let mut accounts = write_guard(&self.accounts);
            let record = accounts
                .iter_mut()
                .find(|record| record.number == number)
                .ok_or(WalletError::AccountNotFound(number))?;
            apply(record);
        }
        self.persist_accounts()
    }
}
