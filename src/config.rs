//! Runtime configuration
//!
//! Plain structs with defaults; there is no config file or CLI surface.

use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub market: MarketConfig,
}

/// Dashboard/API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Market data source configuration
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Base URL of the klines endpoint's host
    pub base_url: String,
    /// Number of candles requested per recompute cycle
    pub candle_limit: u32,
    /// Hard deadline on the outbound fetch
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            market: MarketConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            candle_limit: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}
