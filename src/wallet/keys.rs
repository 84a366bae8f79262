use bip39::Mnemonic;
use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv, Xpub};
use bitcoin::hashes::{sha256, Hash};
use bitcoin::key::rand;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::NetworkKind;
use std::str::FromStr;

use crate::assets::ChainParams;
use crate::error::WalletError;

pub struct KeyManager;

impl KeyManager {
    /// Generate a new random 24-word seed
    pub fn generate_seed() -> Result<Mnemonic, WalletError> {
        let entropy = rand::random::<[u8; 32]>();

        Mnemonic::from_entropy(&entropy).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
    }

    /// Parse an existing seed phrase
    pub fn parse_seed(words: &str) -> Result<Mnemonic, WalletError> {
        Mnemonic::parse(words.trim()).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
    }

    /// Derive the account xpub `m/purpose'/coin_type'/account'` from a seed phrase
    pub fn derive_account_xpub(
        seed_mnemonic: &str,
        account: u32,
        params: &ChainParams,
    ) -> Result<String, WalletError> {
        let mnemonic = Self::parse_seed(seed_mnemonic)?;
        Ok(Self::account_xpub_from_mnemonic(&mnemonic, account, params)?.to_string())
    }

    pub(crate) fn account_xpub_from_mnemonic(
        mnemonic: &Mnemonic,
        account: u32,
        params: &ChainParams,
    ) -> Result<Xpub, WalletError> {
        let secp = Secp256k1::new();
        let seed = mnemonic.to_seed("");

        let master_key = Xpriv::new_master(params.network, &seed)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;

        let path = Self::account_path(account, params)?;
        let account_key = master_key
            .derive_priv(&secp, &path)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;

        Ok(Xpub::from_priv(&secp, &account_key))
    }

    fn account_path(account: u32, params: &ChainParams) -> Result<DerivationPath, WalletError> {
        let hardened = |index: u32| {
            ChildNumber::from_hardened_idx(index).map_err(|e| WalletError::Derivation(e.to_string()))
        };

        Ok(DerivationPath::from(vec![
            hardened(params.purpose)?,
            hardened(params.coin_type)?,
            hardened(account)?,
        ]))
    }

    /// Parse an xpub and check it is encoded for the chain's network
    pub fn parse_xpub(xpub: &str, params: &ChainParams) -> Result<Xpub, WalletError> {
        let key = Xpub::from_str(xpub.trim()).map_err(|e| WalletError::InvalidXpub(e.to_string()))?;

        let expected = NetworkKind::from(params.network);
        if key.network != expected {
            return Err(WalletError::InvalidXpub(format!(
                "key is for {:?} but {} runs on {:?}",
                key.network, params.asset_type, params.network_type
            )));
        }

        Ok(key)
    }

    /// Digest stored in place of the private passphrase
    pub fn hash_passphrase(passphrase: &str) -> String {
        sha256::Hash::hash(passphrase.as_bytes()).to_string()
    }
}
