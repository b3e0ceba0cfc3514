use super::TallyConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Parse a TOML document into a configuration; missing sections keep their defaults
pub fn load_config_from_str(content: &str) -> Result<TallyConfig> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from `path` (when given) and the environment.
///
/// A path that does not exist is an error; no path means defaults.
pub async fn load_config(path: Option<&Path>) -> Result<TallyConfig> {
    load_config_with(path, |name| std::env::var(name).ok()).await
}

/// Like [`load_config`], with `TALLY_*` overrides read through `lookup`
pub async fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<TallyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).await.map_err(|e| {
                Error::Config(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            debug!("Loaded configuration from {}", path.display());
            load_config_from_str(&content)?
        }
        None => TallyConfig::default(),
    };

    config.merge_env_with(lookup);
    Ok(config)
}
