//! Simple TOML parser for the instrument configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the analyzer configuration. It does NOT support the full TOML spec.
//!
//! ```toml
//! [link]
//! baud_rate = 19200
//! tx_hold_ms = 6
//!
//! [channel.1]
//! label = "pH"
//! unit = ""
//!
//! [channel.2]
//! label = "T"
//! unit = "DegC"
//! ```
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - `[link]` and `[channel.N]` section headers
//! - Comments (# ...) on their own line
//!
//! Channel sections must appear in frame order, numbered from 1.

use super::types::{ChannelConfig, ConfigError, InstrumentConfig};

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Channel,
}

/// Parse TOML configuration into InstrumentConfig
pub fn parse_config(input: &str) -> Result<InstrumentConfig, ConfigError> {
    let mut config = InstrumentConfig::new();
    let mut section = Section::Root;
    let mut current_channel: Option<ChannelConfig> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some(channel) = current_channel.take() {
                config.push_channel(channel)?;
            }

            section = parse_section_header(header.trim(), config.channel_count())?;
            if section == Section::Channel {
                current_channel = Some(ChannelConfig::default());
            }
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ConfigError::InvalidValue)?;
        let (key, value) = (key.trim(), value.trim());

        match section {
            Section::Root => return Err(ConfigError::UnknownKey),
            Section::Link => match key {
                "baud_rate" => config.link.baud_rate = parse_u32(value)?,
                "tx_hold_ms" => config.link.tx_hold_ms = parse_u32(value)?,
                "rx_budget" => config.link.rx_budget = parse_u32(value)?,
                _ => return Err(ConfigError::UnknownKey),
            },
            Section::Channel => {
                let channel = current_channel.as_mut().ok_or(ConfigError::InvalidSection)?;
                let text = parse_string(value)?;
                match key {
                    "label" => channel.label = ChannelConfig::new(text, "")?.label,
                    "unit" => channel.unit = ChannelConfig::new("", text)?.unit,
                    _ => return Err(ConfigError::UnknownKey),
                }
            }
        }
    }

    if let Some(channel) = current_channel.take() {
        config.push_channel(channel)?;
    }

    Ok(config)
}

/// Parse a section header, checking channel numbering
fn parse_section_header(header: &str, channels_so_far: usize) -> Result<Section, ConfigError> {
    if header == "link" {
        return Ok(Section::Link);
    }

    let number = header
        .strip_prefix("channel.")
        .ok_or(ConfigError::InvalidSection)?;
    let number: usize = number.parse().map_err(|_| ConfigError::InvalidSection)?;
    if number != channels_so_far + 1 {
        return Err(ConfigError::ChannelOrder);
    }
    Ok(Section::Channel)
}

fn parse_u32(value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

/// Parse a double-quoted string without escapes
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|v| !v.contains('"'))
        .ok_or(ConfigError::InvalidValue)
}
