/// Assets manager configuration from environment variables
///
/// Controls the network every asset runs on and where wallet data lives.
/// Defaults to testnet for safety.

use crate::assets::NetworkType;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AssetsConfig {
    /// Network shared by all assets
    pub network: NetworkType,
    /// Root directory holding one sub-directory per asset type
    pub root_dir: PathBuf,
}

impl AssetsConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `NETWORK_TYPE`: "testnet" (default), "mainnet" or "regtest"
    /// - `WALLETS_DIR`: wallet data root (default `./wallets`)
    pub fn from_env() -> Self {
        let network_str = env::var("NETWORK_TYPE")
            .unwrap_or_else(|_| "testnet".to_string())
            .to_lowercase();

        let network = match network_str.parse::<NetworkType>() {
            Ok(network) => {
                log::info!("Using {:?} network", network);
                network
            }
            Err(e) => {
                log::warn!("{}, defaulting to Testnet", e);
                NetworkType::Testnet
            }
        };

        let root_dir = env::var("WALLETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./wallets"));
        log::info!("Wallet data directory: {}", root_dir.display());

        Self { network, root_dir }
    }

    /// Configuration with an explicit data directory (for testing)
    pub fn with_root_dir(network: NetworkType, root_dir: PathBuf) -> Self {
        Self { network, root_dir }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::Testnet,
            root_dir: PathBuf::from("./wallets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_testnet() {
        let config = AssetsConfig::default();
        assert_eq!(config.network, NetworkType::Testnet);
        assert_eq!(config.root_dir, PathBuf::from("./wallets"));
    }

    #[test]
    fn test_with_root_dir() {
        let config = AssetsConfig::with_root_dir(NetworkType::Regtest, PathBuf::from("/tmp/w"));
        assert_eq!(config.network, NetworkType::Regtest);
        assert_eq!(config.root_dir, PathBuf::from("/tmp/w"));
    }
}
