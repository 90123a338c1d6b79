use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use log::debug;
use multiverse_catalog::{
    CatalogClientConfig,
    DEFAULT_CATALOG_URL,
    DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
use multiverse_views::DEFAULT_DEBOUNCE;
use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

/// Name of multiverse managed directories
const MULTIVERSE_DIR_NAME: &str = "multiverse";
pub const MULTIVERSE_CONFIG_DIR_VAR: &str = "MULTIVERSE_CONFIG_DIR";
pub const MULTIVERSE_CONFIG_FILE: &str = "multiverse.toml";
/// Prefix of environment variables overriding config keys
const ENV_PREFIX: &str = "MULTIVERSE_";
/// Variables with the config prefix that are not config keys
const NON_CONFIG_VARS: &[&str] = &["CONFIG_DIR", "CATALOG_MOCK_RECORD", "CATALOG_MOCK_REPLAY"];

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog API
    // Using a URL here adds an extra trailing slash,
    // so just use a String.
    pub api_url: String,

    /// Quiet period after the last keystroke before a search is sent
    pub search_debounce_ms: u64,

    /// Timeout for establishing a connection to the catalog
    pub connect_timeout_secs: u64,

    /// Timeout for a whole request to the catalog
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CATALOG_URL.to_string(),
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            user_agent: None,
        }
    }
}

impl Config {
    fn read_raw_config() -> Result<HierarchicalConfig> {
        let dirs = BaseDirectories::with_prefix(MULTIVERSE_DIR_NAME);

        let mut builder = HierarchicalConfig::builder();

        // read from /etc
        builder = builder.add_source(
            config::File::from(
                PathBuf::from("/etc")
                    .join(MULTIVERSE_DIR_NAME)
                    .join(MULTIVERSE_CONFIG_FILE),
            )
            .format(config::FileFormat::Toml)
            .required(false),
        );

        // look for files in XDG_CONFIG_DIRS locations
        for file in dirs.find_config_files(MULTIVERSE_CONFIG_FILE) {
            debug!("reading config file {file:?}");
            builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
        }

        // Add explicit MULTIVERSE_CONFIG_DIR file last
        if let Ok(config_dir) = env::var(MULTIVERSE_CONFIG_DIR_VAR) {
            debug!("`${MULTIVERSE_CONFIG_DIR_VAR}` set: {config_dir}");
            builder = builder.add_source(
                config::File::from(PathBuf::from(config_dir).join(MULTIVERSE_CONFIG_FILE))
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        // override via env variables
        let overrides = env::vars()
            .filter_map(|(k, v)| k.strip_prefix(ENV_PREFIX).map(|k| (k.to_owned(), v)))
            .filter(|(k, _)| !NON_CONFIG_VARS.contains(&k.as_str()))
            .collect::<HashMap<_, _>>();

        let builder = builder.add_source(
            Environment::default()
                .source(Some(overrides))
                .try_parsing(true),
        );

        Ok(builder.build()?)
    }

    /// Creates a [Config] from the config files and environment
    pub fn parse() -> Result<Config> {
        let raw_config = Self::read_raw_config()?;
        let config: Config = raw_config
            .try_deserialize()
            .context("Could not parse config")?;
        debug!("using config: {config:?}");
        Ok(config)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Client configuration without mock settings, see [crate::utils::init::init_catalog_client]
    pub fn catalog_client_config(&self) -> CatalogClientConfig {
        CatalogClientConfig {
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..CatalogClientConfig::new(self.api_url.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    fn path_string(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    /// Environment with no config files other than those in `config_dir`
    fn isolated_env(config_dir: &TempDir) -> Vec<(&'static str, Option<String>)> {
        vec![
            (
                MULTIVERSE_CONFIG_DIR_VAR,
                Some(config_dir.path().to_string_lossy().into_owned()),
            ),
            ("XDG_CONFIG_HOME", Some(path_string(config_dir, "xdg"))),
            ("XDG_CONFIG_DIRS", Some(path_string(config_dir, "xdg-dirs"))),
            ("MULTIVERSE_API_URL", None),
            ("MULTIVERSE_SEARCH_DEBOUNCE_MS", None),
            ("MULTIVERSE_USER_AGENT", None),
        ]
    }

    #[test]
    #[serial]
    fn defaults_without_config_files() {
        let config_dir = tempfile::tempdir().unwrap();
        let config = temp_env::with_vars(isolated_env(&config_dir), Config::parse).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "https://rickandmortyapi.com/api");
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
    }

    #[test]
    #[serial]
    fn config_file_in_config_dir() {
        let config_dir = tempfile::tempdir().unwrap();
        fs::write(
            config_dir.path().join(MULTIVERSE_CONFIG_FILE),
            indoc! {r#"
                api_url = "http://localhost:8080/api"
                search_debounce_ms = 250
            "#},
        )
        .unwrap();

        let config = temp_env::with_vars(isolated_env(&config_dir), Config::parse).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(config.search_debounce(), Duration::from_millis(250));
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    #[serial]
    fn env_overrides_config_file() {
        let config_dir = tempfile::tempdir().unwrap();
        fs::write(
            config_dir.path().join(MULTIVERSE_CONFIG_FILE),
            indoc! {r#"
                api_url = "http://localhost:8080/api"
            "#},
        )
        .unwrap();

        let mut vars = isolated_env(&config_dir);
        vars.push(("MULTIVERSE_API_URL", Some("http://mirror.test/api".to_string())));
        vars.push(("MULTIVERSE_SEARCH_DEBOUNCE_MS", Some("0".to_string())));
        vars.push(("MULTIVERSE_CATALOG_MOCK_REPLAY", Some("/nonexistent".to_string())));

        let config = temp_env::with_vars(vars, Config::parse).unwrap();
        assert_eq!(config.api_url, "http://mirror.test/api");
        assert_eq!(config.search_debounce_ms, 0);
    }

    #[test]
    #[serial]
    fn invalid_value_is_an_error() {
        let config_dir = tempfile::tempdir().unwrap();
        let mut vars = isolated_env(&config_dir);
        vars.push(("MULTIVERSE_REQUEST_TIMEOUT_SECS", Some("soon".to_string())));

        let err = temp_env::with_vars(vars, Config::parse).unwrap_err();
        assert!(err.to_string().contains("Could not parse config"), "{err:#}");
    }

    #[test]
    fn client_config_carries_timeouts_and_agent() {
        let config = Config {
            user_agent: Some("multiverse-test".to_string()),
            connect_timeout_secs: 1,
            ..Default::default()
        };
        let client_config = config.catalog_client_config();
        assert_eq!(client_config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(client_config.connect_timeout, Duration::from_secs(1));
        assert_eq!(client_config.request_timeout, Duration::from_secs(60));
        assert_eq!(client_config.user_agent.as_deref(), Some("multiverse-test"));
    }
}
