//! Configuration for api-rendr

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options handed to the router being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Match paths case-sensitively
    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// Let handlers of nested definitions see parameters captured above them
    #[serde(default = "default_true")]
    pub merge_params: bool,

    /// Treat `/path` and `/path/` as different routes
    #[serde(default = "default_true")]
    pub strict: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            case_sensitive: default_true(),
            merge_params: default_true(),
            strict: default_true(),
        }
    }
}

impl RouterConfig {
    /// Reject options axum cannot honor.
    ///
    /// axum matches paths case-sensitively, and nested definitions are
    /// registered as full paths so every handler sees every captured
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if !self.case_sensitive {
            return Err(Error::UnsupportedOption(
                "case_sensitive = false (axum routes always match case-sensitively)",
            ));
        }
        if !self.merge_params {
            return Err(Error::UnsupportedOption(
                "merge_params = false (nested routes always see parent parameters)",
            ));
        }
        Ok(())
    }
}

/// A directory served under a route, written `ROUTE=DIR` on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDir {
    pub route: String,
    pub dir: PathBuf,
}

impl FromStr for StaticDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (route, dir) = s
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("expected ROUTE=DIR, got \"{}\"", s)))?;
        if route.is_empty() || dir.is_empty() {
            return Err(Error::Config(format!("expected ROUTE=DIR, got \"{}\"", s)));
        }
        Ok(Self {
            route: route.to_string(),
            dir: PathBuf::from(dir),
        })
    }
}

/// Settings for the `api-rendr` server binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Address to bind
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Hide internal error messages from responses
    #[serde(default)]
    pub production: bool,

    /// Endpoint definition document (JSON, TOML or YAML)
    #[serde(default)]
    pub endpoints: Option<PathBuf>,

    /// Prefix for every rendered route
    #[serde(default)]
    pub mount_path: String,

    /// Static directories
    #[serde(default)]
    pub static_dirs: Vec<StaticDir>,

    /// Router options
    #[serde(default)]
    pub router: RouterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            production: false,
            endpoints: None,
            mount_path: String::new(),
            static_dirs: Vec::new(),
            router: RouterConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the default location or fall back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// `<config dir>/api-rendr/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("api-rendr").join("config.toml"))
    }

    /// Socket address to listen on
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_http_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
