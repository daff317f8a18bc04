//! Configuration type definitions
//!
//! The instrument configuration is built once at startup and handed to the
//! reading register and the link. It never changes while a frame is being
//! decoded.

use heapless::{String, Vec};
use m800_hal::uart::UartConfig;

/// Maximum channels the analyzer reports in one frame
pub const MAX_CHANNELS: usize = 12;

/// Maximum channel label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum channel unit length
pub const MAX_UNIT_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// More than [`MAX_CHANNELS`] channels
    TooManyChannels,
    /// Label or unit exceeds its capacity
    TextTooLong,
    /// Label or unit contains a TAB, CR or non-printable byte
    InvalidText,
    /// Unknown or malformed `[section]` header
    InvalidSection,
    /// Unknown key in a section
    UnknownKey,
    /// Value of the wrong type or out of range
    InvalidValue,
    /// Channel sections not numbered 1, 2, 3, ...
    ChannelOrder,
}

/// One analyzer channel as it appears in the frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Channel label, e.g. "pH" (may be empty)
    pub label: String<MAX_LABEL_LEN>,
    /// Unit, e.g. "DegC" (may be empty)
    pub unit: String<MAX_UNIT_LEN>,
}

impl ChannelConfig {
    /// Create a channel, validating label and unit
    pub fn new(label: &str, unit: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            label: checked_text(label)?,
            unit: checked_text(unit)?,
        })
    }
}

/// Text must be printable ASCII so it can appear on the wire at all
fn checked_text<const N: usize>(text: &str) -> Result<String<N>, ConfigError> {
    if !text.bytes().all(|b| (32..=126).contains(&b)) {
        return Err(ConfigError::InvalidText);
    }
    let mut out = String::new();
    out.push_str(text).map_err(|_| ConfigError::TextTooLong)?;
    Ok(out)
}

/// Serial link parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Baud rate (8N1)
    pub baud_rate: u32,
    /// How long the transceiver stays in transmit after the request (ms)
    pub tx_hold_ms: u32,
    /// Poll budget for one response, in `read_byte` calls
    pub rx_budget: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: 19_200,
            tx_hold_ms: 6,
            rx_budget: 4096,
        }
    }
}

impl LinkConfig {
    /// UART settings for this link
    pub fn uart(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baud_rate,
            ..UartConfig::default()
        }
    }
}

/// Complete instrument configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InstrumentConfig {
    /// Serial link parameters
    pub link: LinkConfig,
    /// Channels in frame order
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
}

impl InstrumentConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from (label, unit) pairs in frame order
    pub fn with_channels(channels: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        for (label, unit) in channels {
            config.push_channel(ChannelConfig::new(label, unit)?)?;
        }
        Ok(config)
    }

    /// Append a channel
    pub fn push_channel(&mut self, channel: ChannelConfig) -> Result<(), ConfigError> {
        self.channels
            .push(channel)
            .map_err(|_| ConfigError::TooManyChannels)
    }

    /// Number of channels a complete frame carries
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
