//! Streamer configuration
//!
//! Handles loading engine settings from a file.
//! Each line holds one `key = value` setting.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::StreamError;
use crate::types::Height;

/// Engine timing and start position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Baseline wait between ticks
    pub poll_interval: Duration,
    /// Wait after a tick that noticed a new tip
    pub retry_interval: Duration,
    /// Height already considered seen; 0 starts at the current tip
    pub start_height: Height,
    /// Capacity of the output channel
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            retry_interval: Duration::from_millis(50),
            start_height: 0,
            channel_capacity: 1,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.poll_interval.is_zero() {
            return Err(StreamError::Config("poll_interval must be positive".into()));
        }
        if self.retry_interval > self.poll_interval {
            return Err(StreamError::Config(
                "retry_interval must not exceed poll_interval".into(),
            ));
        }
        if self.start_height == Height::MAX {
            return Err(StreamError::Config(
                "start_height must be below the maximum height".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(StreamError::Config("channel_capacity must be positive".into()));
        }
        Ok(())
    }
}

/// Load a configuration file.
///
/// Empty lines and lines starting with '#' are ignored. Unset keys keep
/// their default value.
///
/// # Example file format:
/// ```text
/// # poll every two seconds
/// poll_interval_ms = 2000
/// retry_interval_ms = 100
/// start_height = 1200
/// channel_capacity = 4
/// ```
pub fn load_config(path: &Path) -> Result<StreamConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = StreamConfig::default();
    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        apply_setting(&mut config, line)
            .with_context(|| format!("Invalid setting on line {}: {}", line_num + 1, line))?;
    }

    config.validate()?;
    Ok(config)
}

fn apply_setting(config: &mut StreamConfig, line: &str) -> Result<()> {
    let (key, value) = line
        .split_once('=')
        .context("Expected `key = value`")?;
    let (key, value) = (key.trim(), value.trim());

    match key {
        "poll_interval_ms" => config.poll_interval = Duration::from_millis(parse_number(value)?),
        "retry_interval_ms" => config.retry_interval = Duration::from_millis(parse_number(value)?),
        "start_height" => config.start_height = parse_number(value)?,
        "channel_capacity" => config.channel_capacity = parse_number(value)? as usize,
        _ => anyhow::bail!("Unknown key: {}", key),
    }
    Ok(())
}

fn parse_number(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("Not a non-negative integer: {}", value))
}
