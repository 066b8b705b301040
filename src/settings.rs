// src/settings.rs
// Service configuration read from the environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_CANDLE_DIR: &str = "./data/candles";
pub const DEFAULT_BODY_LIMIT_MB: usize = 50;

#[derive(Error, Debug, PartialEq)]
#[error("configuration error: {key}={value:?} ({reason})")]
pub struct SettingsError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory holding `{symbol}.parquet` candle files
    pub candle_dir: PathBuf,
    pub body_limit_bytes: usize,
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| SettingsError {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

impl ServerConfig {
    /// Read `INDICATORS_HOST`, `INDICATORS_PORT`, `CANDLE_DIR` and
    /// `INDICATORS_BODY_LIMIT_MB` from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let host = parse_var(&lookup, "INDICATORS_HOST", DEFAULT_HOST)?;
        let port = parse_var(&lookup, "INDICATORS_PORT", DEFAULT_PORT)?;
        let body_limit_mb = parse_var(&lookup, "INDICATORS_BODY_LIMIT_MB", DEFAULT_BODY_LIMIT_MB)?;
        if body_limit_mb == 0 {
            return Err(SettingsError {
                key: "INDICATORS_BODY_LIMIT_MB",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let body_limit_bytes = body_limit_mb.checked_mul(1024 * 1024).ok_or_else(|| SettingsError {
            key: "INDICATORS_BODY_LIMIT_MB",
            value: body_limit_mb.to_string(),
            reason: "too large".to_string(),
        })?;
        let candle_dir = PathBuf::from(lookup("CANDLE_DIR").unwrap_or_else(|| DEFAULT_CANDLE_DIR.to_string()));

        Ok(Self {
            host,
            port,
            candle_dir,
            body_limit_bytes,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
