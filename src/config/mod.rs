//! Runtime configuration
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file, `TALLY_*` environment variables, and command-line flags.
//!
//! ```toml
//! [pipeline]
//! workers = 10
//! buffer = 1
//!
//! [client]
//! url = "http://127.0.0.1:3000/api/v1/list/incidents"
//! timeout = "2s"
//! retries = 5
//! retry_delay = "100ms"
//!
//! [server]
//! addr = "127.0.0.1:3000"
//! file = "incidents.json"
//! ```

pub mod loader;


pub use loader::{load_config, load_config_from_str, load_config_with};

use crate::error::{Error, Result};
use crate::pipeline::PipelineConfig;
use crate::source::file::DEFAULT_STORE_FILE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub pipeline: PipelineConfig,
    pub client: ClientConfig,
    pub server: ServerConfig,
}

/// Settings for fetching incidents over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Incident endpoint to fetch from
    pub url: Option<String>,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Total attempts on transport errors
    pub retries: u32,

    /// Delay before the first retry; doubles on each subsequent one
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,

    /// Reject responses that declare a different Content-Length
    pub expected_content_length: Option<u64>,

    /// Skip TLS certificate verification (self-signed test servers)
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(2),
            retries: 5,
            retry_delay: Duration::from_millis(100),
            expected_content_length: None,
            accept_invalid_certs: false,
        }
    }
}

/// Settings for the incident store server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            file: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

impl TallyConfig {
    /// Apply `TALLY_*` overrides from the process environment
    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|name| std::env::var(name).ok());
    }

    /// Apply `TALLY_*` overrides from an arbitrary lookup
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TALLY_URL") {
            self.client.url = Some(url);
        }

        if let Some(workers) = lookup("TALLY_WORKERS") {
            if let Ok(value) = workers.parse::<usize>() {
                self.pipeline.worker_count = value;
            }
        }

        if let Some(file) = lookup("TALLY_STORE_FILE") {
            self.server.file = PathBuf::from(file);
        }

        if let Some(addr) = lookup("TALLY_ADDR") {
            self.server.addr = addr;
        }
    }

    /// Reject settings that would make the pipeline or client unusable
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;

        if self.client.retries == 0 {
            return Err(Error::Config(
                "client.retries must be at least 1".to_string(),
            ));
        }
        if self.client.timeout.is_zero() {
            return Err(Error::Config(
                "client.timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
