use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use pedalsafe_core::NetworkConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "pedalsafe-server", version, about = "Bike route planning HTTP service")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Bike lanes CSV, overrides `network.lanes_path`
    #[arg(long)]
    pub lanes: Option<PathBuf>,
    /// Accidents CSV, overrides `network.accidents_path`
    #[arg(long)]
    pub accidents: Option<PathBuf>,
    /// Listen address, overrides `bind`
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no bike lanes file given (use --lanes or network.lanes_path)")]
    MissingLanes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    pub network: NetworkConfig,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8050))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_concurrent_requests() -> usize {
    64
}

impl ServerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads the config file (if any) and applies command line overrides
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml_str(&contents)?
            }
            None => {
                let lanes = cli.lanes.clone().ok_or(ConfigError::MissingLanes)?;
                ServerConfig {
                    bind: default_bind(),
                    request_timeout_secs: default_request_timeout(),
                    max_concurrent_requests: default_max_concurrent_requests(),
                    network: NetworkConfig::new(lanes),
                }
            }
        };

        if let Some(lanes) = &cli.lanes {
            config.network.lanes_path = lanes.clone();
        }
        if let Some(accidents) = &cli.accidents {
            config.network.accidents_path = Some(accidents.clone());
        }
        if let Some(bind) = cli.bind {
            config.bind = bind;
        }

        Ok(config)
    }
}
