//! Startup configuration.
//!
//! Read once before serving; nothing re-reads it afterwards.
//!
//! ```toml
//! addr = "0.0.0.0:9999"
//! log_filter = "arbor=debug,info"
//! ```
//!
//! Every field is optional. `ARBOR_ADDR` and `ARBOR_LOG` override whatever
//! the file (or the defaults) said when [`ServerConfig::with_env`] is applied.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

pub const ADDR_ENV: &str = "ARBOR_ADDR";
pub const LOG_ENV: &str = "ARBOR_LOG";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub addr: String,
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9999".to_owned(),
            log_filter: "info".to_owned(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    pub fn with_env(self) -> Self {
        self.overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup(ADDR_ENV).filter(|v| !v.is_empty()) {
            self.addr = addr;
        }
        if let Some(filter) = lookup(LOG_ENV).filter(|v| !v.is_empty()) {
            self.log_filter = filter;
        }
        self
    }
}
