//! Supported asset types and their chain parameters
//!
//! Every wallet carries a `ChainParams` resolved from its asset type and the
//! configured network. Dispatch happens on the `AssetType` tag.

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    Btc,
    Dcr,
    Ltc,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [AssetType::Btc, AssetType::Dcr, AssetType::Ltc];

    /// Ticker symbol, also used as the on-disk directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Btc => "BTC",
            AssetType::Dcr => "DCR",
            AssetType::Ltc => "LTC",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BTC" => Ok(AssetType::Btc),
            "DCR" => Ok(AssetType::Dcr),
            "LTC" => Ok(AssetType::Ltc),
            other => Err(format!("unknown asset type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Regtest,
}

impl NetworkType {
    /// Directory name used to keep each network's wallets apart
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet3",
            NetworkType::Regtest => "regtest",
        }
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" | "testnet3" => Ok(NetworkType::Testnet),
            "regtest" | "simnet" => Ok(NetworkType::Regtest),
            other => Err(format!("unknown network type '{}'", other)),
        }
    }
}

/// Chain parameters used for key derivation and xpub encoding
///
/// Account keys live at `m/purpose'/coin_type'/account'`. Extended keys are
/// encoded with the BIP32 version bytes of `network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    pub asset_type: AssetType,
    pub network_type: NetworkType,
    pub network: Network,
    pub purpose: u32,
    pub coin_type: u32,
    /// Chain has ticket/stake style locked funds
    pub supports_staking: bool,
}

impl ChainParams {
    pub fn new(asset_type: AssetType, network_type: NetworkType) -> Self {
        let network = match network_type {
            NetworkType::Mainnet => Network::Bitcoin,
            NetworkType::Testnet => Network::Testnet,
            NetworkType::Regtest => Network::Regtest,
        };
        let mainnet = network_type == NetworkType::Mainnet;

        let (purpose, coin_type, supports_staking) = match asset_type {
            AssetType::Btc => (84, if mainnet { 0 } else { 1 }, false),
            AssetType::Ltc => (84, if mainnet { 2 } else { 1 }, false),
            AssetType::Dcr => (44, if mainnet { 42 } else { 1 }, true),
        };

        Self {
            asset_type,
            network_type,
            network,
            purpose,
            coin_type,
            supports_staking,
        }
    }

    /// Account-level derivation prefix, e.g. `m/84'/0'/`
    pub fn hd_prefix(&self) -> String {
        format!("m/{}'/{}'/", self.purpose, self.coin_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_types() {
        let btc = ChainParams::new(AssetType::Btc, NetworkType::Mainnet);
        assert_eq!((btc.purpose, btc.coin_type), (84, 0));
        assert!(!btc.supports_staking);

        let dcr = ChainParams::new(AssetType::Dcr, NetworkType::Mainnet);
        assert_eq!((dcr.purpose, dcr.coin_type), (44, 42));
        assert!(dcr.supports_staking);

        let ltc_test = ChainParams::new(AssetType::Ltc, NetworkType::Testnet);
        assert_eq!(ltc_test.coin_type, 1);
        assert_eq!(ltc_test.network, Network::Testnet);
    }

    #[test]
    fn test_hd_prefix() {
        let btc = ChainParams::new(AssetType::Btc, NetworkType::Testnet);
        assert_eq!(btc.hd_prefix(), "m/84'/1'/");
    }

    #[test]
    fn test_asset_type_parsing() {
        assert_eq!("btc".parse::<AssetType>().unwrap(), AssetType::Btc);
        assert_eq!("DCR".parse::<AssetType>().unwrap(), AssetType::Dcr);
        assert!("eth".parse::<AssetType>().is_err());
        assert_eq!(AssetType::Ltc.to_string(), "LTC");
    }
}
