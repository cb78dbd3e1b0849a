mod types;

pub use types::*;

use crate::Result;
use std::{env, io::ErrorKind, path::Path};
use tracing::debug;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Loads `CONFIG_PATH` (default `config.yaml`) and applies environment overrides.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let mut config = load_from(&config_path).await?;
    config.apply_env_overrides(|key| env::var(key).ok());

    Ok(config)
}

/// A missing file yields the default configuration; a malformed one is an error.
pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    match tokio::fs::read_to_string(path).await {
        Ok(config_str) => Ok(serde_yaml::from_str(&config_str)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No configuration file at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

impl Config {
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = non_empty(API_KEY_ENV) {
            self.llm.api_key = api_key;
        }
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            self.llm.base_url = base_url;
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.llm.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = Config::default();
        config.llm.api_key = "from-file".to_string();

        let env: HashMap<&str, &str> =
            HashMap::from([(API_KEY_ENV, "from-env"), (MODEL_ENV, "gpt-4o")]);
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key, "from-env");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = Config::default();
        config.llm.api_key = "from-file".to_string();

        config.apply_env_overrides(|_| Some("   ".to_string()));

        assert_eq!(config.llm.api_key, "from-file");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }
}
