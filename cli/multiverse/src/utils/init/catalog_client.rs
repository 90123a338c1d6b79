use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use multiverse_catalog::{CatalogClient, CatalogMockMode};
use tracing::debug;

use crate::config::Config;
use crate::utils::message;

/// Record all catalog traffic to the given file
pub const CATALOG_MOCK_RECORD_VAR: &str = "MULTIVERSE_CATALOG_MOCK_RECORD";
/// Answer catalog requests from a recording at the given file
pub const CATALOG_MOCK_REPLAY_VAR: &str = "MULTIVERSE_CATALOG_MOCK_REPLAY";

/// Determine the mock mode from the given variable lookup.
///
/// Recording takes precedence over replaying.
fn mock_mode(var: impl Fn(&str) -> Option<String>) -> Result<CatalogMockMode> {
    if let Some(path) = var(CATALOG_MOCK_RECORD_VAR) {
        return Ok(CatalogMockMode::Record(PathBuf::from(path)));
    }
    if let Some(path) = var(CATALOG_MOCK_REPLAY_VAR) {
        let path = PathBuf::from(path);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }
        return Ok(CatalogMockMode::Replay(path));
    }
    Ok(CatalogMockMode::None)
}

/// Initialize the catalog client
///
/// - Record or replay through a mock server if one of the mock variables is set
/// - Talk to the configured catalog directly otherwise
pub fn init_catalog_client(config: &Config) -> Result<CatalogClient> {
    let mut client_config = config.catalog_client_config();
    client_config.mock_mode = mock_mode(|name| std::env::var(name).ok())?;
    if let CatalogMockMode::Record(path) = &client_config.mock_mode {
        message::warning(format!(
            "Recording catalog responses to {}",
            path.display()
        ));
    }

    debug!(
        catalog_url = %client_config.catalog_url,
        mock_mode = ?client_config.mock_mode,
        "using catalog client"
    );
    CatalogClient::new(client_config).context("Could not create catalog client")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn no_variables_no_mock() {
        assert_eq!(mock_mode(lookup(&[])).unwrap(), CatalogMockMode::None);
    }

    #[test]
    fn record_wins_over_replay() {
        let mode = mock_mode(lookup(&[
            (CATALOG_MOCK_RECORD_VAR, "/tmp/catalog.yaml"),
            (CATALOG_MOCK_REPLAY_VAR, "/tmp/other.yaml"),
        ]))
        .unwrap();
        assert_eq!(
            mode,
            CatalogMockMode::Record(PathBuf::from("/tmp/catalog.yaml"))
        );
    }

    #[test]
    fn replay_requires_existing_file() {
        let err = mock_mode(lookup(&[(CATALOG_MOCK_REPLAY_VAR, "/nonexistent/catalog.yaml")]))
            .unwrap_err();
        assert!(err.to_string().contains("doesn't exist"));

        let recording = tempfile::NamedTempFile::new().unwrap();
        let mode = mock_mode(lookup(&[(
            CATALOG_MOCK_REPLAY_VAR,
            recording.path().to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(
            mode,
            CatalogMockMode::Replay(recording.path().to_path_buf())
        );
    }

    #[test]
    fn client_uses_configured_url() {
        let config = Config {
            api_url: "http://localhost:9999/api".to_string(),
            ..Default::default()
        };
        let client = temp_env::with_vars_unset(
            [CATALOG_MOCK_RECORD_VAR, CATALOG_MOCK_REPLAY_VAR],
            || init_catalog_client(&config),
        )
        .unwrap();
        assert_eq!(client.catalog_url(), "http://localhost:9999/api");
    }
}
