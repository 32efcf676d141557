use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use tracing::info;

use crate::config_manage::entity::config_entity::WrapperConfig;
use crate::APPLICATION_NAME;

pub const ENV_PREFIX: &str = "PFFMPEG";

pub struct ConfigManager {}

impl ConfigManager {
    /// `<config dir>/pffmpeg/config.toml`, when the platform has a config dir.
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APPLICATION_NAME).join("config.toml"))
    }

    /// Loads `config_file` if it exists, then `PFFMPEG_*` environment variables on top.
    pub fn read_config_with_file(config_file: Option<PathBuf>) -> Result<WrapperConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(config_file) = config_file {
            info!("loading config file {:?}", config_file.as_os_str());
            builder = builder.add_source(File::from(config_file).required(false));
        }
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn read_config() -> Result<WrapperConfig, ConfigError> {
        ConfigManager::read_config_with_file(ConfigManager::default_config_file())
    }
}

#[cfg(test)]
mod test_config_manager {
    use std::fs;

    use crate::config_manage::config_manager::ConfigManager;
    use crate::config_manage::entity::config_entity::{WrapperConfig, WrapperConfigBuilder};

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("pffmpeg-test-missing").join("config.toml");
        let config = ConfigManager::read_config_with_file(Some(path)).unwrap();
        assert_eq!(config.progress_bar, WrapperConfig::default().progress_bar);
    }

    #[test]
    fn reads_toml_file() {
        let dir = std::env::temp_dir().join(format!("pffmpeg-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "ffmpeg_binary = \"/opt/ffmpeg/bin/ffmpeg\"\nprogress_bar = false\n").unwrap();

        let config = ConfigManager::read_config_with_file(Some(path)).unwrap();
        assert_eq!(config.ffmpeg_binary, "/opt/ffmpeg/bin/ffmpeg");
        assert!(!config.progress_bar);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn builder_fills_defaults() {
        let config = WrapperConfigBuilder::default()
            .ffmpeg_binary("ffmpeg6")
            .build()
            .unwrap();
        assert_eq!(config.ffmpeg_binary, "ffmpeg6");
        assert_eq!(config.log_level, "warn");
        assert!(config.progress_bar);
    }
}
