/// Common test utilities for assets manager integration tests
///
/// Provides a temp-dir backed manager plus shared seed fixtures.
use assets_core::{AssetsConfig, AssetsManager, NetworkType};
use tempfile::TempDir;

pub const SEED_A: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const SEED_B: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";

/// Test environment with automatic cleanup
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub manager: AssetsManager,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        init_logger();

        let temp_dir = TempDir::new()?;
        log::info!("Test directory: {:?}", temp_dir.path());

        let manager = AssetsManager::new(Self::config_for(&temp_dir))?;
        Ok(Self { temp_dir, manager })
    }

    pub fn config_for(temp_dir: &TempDir) -> AssetsConfig {
        AssetsConfig::with_root_dir(NetworkType::Testnet, temp_dir.path().to_path_buf())
    }

    /// Build a second manager over the same directory, as after a restart
    pub fn reload(&self) -> anyhow::Result<AssetsManager> {
        Ok(AssetsManager::new(Self::config_for(&self.temp_dir))?)
    }
}

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}
