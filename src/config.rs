//! Configuration for the connector server.
//!
//! A JSON config file is optional; every field falls back to an environment variable
//! and then to a hardcoded default during deserialization, so a bare deployment with
//! env vars alone works. Environment reads happen only here, once at startup — the
//! pipeline receives plain structs.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use url::Url;

/// CLI arguments for the connector server.
#[derive(Parser, Debug)]
#[command(name = "paymentsway-rs")]
#[command(about = "PaymentsWay payment-provider HTTP server")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "config.json")]
    config: PathBuf,
}

/// Identity of the hosting application, injected into settings resolution and used for
/// startup diagnostics. All fields come from the platform's environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppIdentity {
    /// Application id used against the settings store.
    pub app_id: Option<String>,
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub workspace: Option<String>,
    pub region: Option<String>,
}

impl AppIdentity {
    /// Reads the identity from the platform's environment variables.
    pub fn from_env() -> Self {
        AppIdentity {
            app_id: std::env::var("VTEX_APP_ID").ok(),
            vendor: std::env::var("VTEX_APP_VENDOR").ok(),
            name: std::env::var("VTEX_APP_NAME").ok(),
            version: std::env::var("VTEX_APP_VERSION").ok(),
            workspace: std::env::var("VTEX_WORKSPACE").ok(),
            region: std::env::var("VTEX_REGION").ok(),
        }
    }
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Server configuration.
///
/// Fields use serde defaults that fall back to environment variables,
/// then to hardcoded defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default = "config_defaults::default_gateway_url")]
    gateway_url: Url,
    #[serde(default = "config_defaults::default_settings_store_url")]
    settings_store_url: Url,
    #[serde(default)]
    app: AppIdentity,
}

pub mod config_defaults {
    use std::env;
    use std::net::IpAddr;
    use url::Url;

    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_SETTINGS_STORE_URL: &str = "https://apps.vtexcommercestable.com.br";

    /// Returns the default port value with fallback: $PORT env var -> 8080
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Returns the default host value with fallback: $HOST env var -> "0.0.0.0"
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(IpAddr::V4(DEFAULT_HOST.parse().unwrap()))
    }

    /// Gateway base URL with fallback: $PAYMENTSWAY_URL -> the documented test host.
    pub fn default_gateway_url() -> Url {
        env::var("PAYMENTSWAY_URL")
            .ok()
            .and_then(|s| Url::parse(&s).ok())
            .unwrap_or_else(|| {
                Url::parse(crate::gateway::DEFAULT_BASE_URL).expect("Invalid default gateway URL")
            })
    }

    /// Settings store base URL with fallback: $SETTINGS_STORE_URL -> platform apps host.
    pub fn default_settings_store_url() -> Url {
        env::var("SETTINGS_STORE_URL")
            .ok()
            .and_then(|s| Url::parse(&s).ok())
            .unwrap_or_else(|| {
                Url::parse(DEFAULT_SETTINGS_STORE_URL).expect("Invalid default store URL")
            })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    /// Get the port value.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the host value as an IpAddr.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Base URL of the PaymentsWay gateway.
    pub fn gateway_url(&self) -> &Url {
        &self.gateway_url
    }

    /// Base URL of the settings store.
    pub fn settings_store_url(&self) -> &Url {
        &self.settings_store_url
    }

    /// Identity of the hosting application.
    pub fn app(&self) -> &AppIdentity {
        &self.app
    }

    /// Load configuration from CLI arguments and JSON file.
    ///
    /// The config file path comes from `--config <path>` (or `$CONFIG`), defaulting to
    /// `./config.json`. A missing file is not an error: every value resolves through
    /// environment variables or defaults during deserialization.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        Self::load_from_path(&cli_args.config)
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            fs::read_to_string(path)
                .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?
        } else {
            "{}".to_string()
        };
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
