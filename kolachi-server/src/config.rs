//! Process configuration.
//!
//! Read once at startup from environment variables. Unset variables take
//! their defaults; set but unparsable ones are an error.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::valhalla::ValhallaConfig;

pub const API_TITLE: &str = "TRNSIT Kolachi API";
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const API_DESCRIPTION: &str = "Transit routing API for Karachi public transport";

const DEFAULT_VALHALLA_URL: &str = "http://localhost:8002";
const DEFAULT_VALHALLA_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VALHALLA_MAX_CONCURRENT: usize = 16;
const DEFAULT_GTFS_DIR: &str = "data/gtfs";
const DEFAULT_PORT: u16 = 8000;

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {name}={value:?}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which origins may call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Routing engine client settings
    pub valhalla: ValhallaConfig,
    /// Directory holding the GTFS tables
    pub gtfs_dir: PathBuf,
    /// Address to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
    /// Allowed CORS origins
    pub cors_origins: CorsOrigins,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let valhalla_url = lookup("VALHALLA_URL").unwrap_or_else(|| DEFAULT_VALHALLA_URL.into());
        let timeout_secs = parse_var(&lookup, "VALHALLA_TIMEOUT", DEFAULT_VALHALLA_TIMEOUT_SECS)?;
        let max_concurrent = parse_var(
            &lookup,
            "VALHALLA_MAX_CONCURRENT",
            DEFAULT_VALHALLA_MAX_CONCURRENT,
        )?;

        let valhalla = ValhallaConfig::new(valhalla_url)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_max_concurrent(max_concurrent);

        let gtfs_dir = lookup("GTFS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GTFS_DIR));

        Ok(Self {
            valhalla,
            gtfs_dir,
            host: parse_var(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            cors_origins: parse_cors(lookup("CORS_ORIGINS").as_deref()),
        })
    }

    /// The socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_cors(raw: Option<&str>) -> CorsOrigins {
    let origins: Vec<String> = raw
        .unwrap_or("*")
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}
