use anyhow::{Context, Result};
use bpaf::Bpaf;

use crate::config::Config;

// Print the effective configuration
#[derive(Debug, Bpaf, Clone)]
pub struct ConfigArgs {
    /// Display the configuration as JSON instead of TOML
    #[bpaf(long)]
    pub json: bool,
}

impl ConfigArgs {
    pub fn handle(self, config: &Config) -> Result<()> {
        println!("{}", self.render(config)?);
        Ok(())
    }

    fn render(&self, config: &Config) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(config)?);
        }
        toml::to_string_pretty(config).context("Could not serialize config")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_as_toml() {
        let rendered = ConfigArgs { json: false }
            .render(&Config::default())
            .unwrap();
        assert_eq!(rendered, indoc! {r#"
            api_url = "https://rickandmortyapi.com/api"
            search_debounce_ms = 500
            connect_timeout_secs = 15
            request_timeout_secs = 60
        "#});
    }

    #[test]
    fn config_as_json() {
        let rendered = ConfigArgs { json: true }
            .render(&Config::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["search_debounce_ms"], 500);
        assert_eq!(value["user_agent"], serde_json::Value::Null);
    }
}
