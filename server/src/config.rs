//! Node configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BLOCK_TIME_MS: u64 = 2000;
pub const DEFAULT_STORAGE_MINIMUM: u32 = 0;
pub const DEFAULT_WS_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub port: u16,
    /// Interval between authored blocks.
    pub block_time: Duration,
    /// Smallest value `store` accepts.
    pub storage_minimum: u32,
    /// Per-connection outbound frame queue.
    pub ws_channel_capacity: usize,
}

impl NodeConfig {
    /// Build typed node config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BLOCK_TIME_MS`: default 2000, clamped to at least 1
    /// - `STORAGE_MINIMUM`: default 0
    /// - `WS_CHANNEL_CAPACITY`: default 256, clamped to at least 1
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let block_time_ms = parse_or(&lookup, "BLOCK_TIME_MS", DEFAULT_BLOCK_TIME_MS).max(1);
        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            block_time: Duration::from_millis(block_time_ms),
            storage_minimum: parse_or(&lookup, "STORAGE_MINIMUM", DEFAULT_STORAGE_MINIMUM),
            ws_channel_capacity: parse_or(&lookup, "WS_CHANNEL_CAPACITY", DEFAULT_WS_CHANNEL_CAPACITY).max(1),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
