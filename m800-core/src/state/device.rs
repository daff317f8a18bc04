//! Persisted device state types

use serde::{Deserialize, Serialize};

/// Current state layout version
///
/// Bump whenever a field is added, removed or reordered. `version` must
/// stay the first field: it is checked on the raw bytes before decoding.
pub const STATE_VERSION: u8 = 4;

/// When data is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataLogging {
    /// Log the averaged readings once per logging period
    #[default]
    ByTime,
    /// Log every committed frame
    ByRead,
}

/// Controller state kept across power cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Layout version, see [`STATE_VERSION`]
    pub version: u8,
    /// Remote commands locked out
    pub locked: bool,
    /// Report state changes
    pub state_logging: bool,
    /// Report readings
    pub data_logging: bool,
    /// Lower bound for `reading_period_ms`
    pub reading_period_min_ms: u32,
    /// Time between read requests
    pub reading_period_ms: u32,
    /// Time between data logs
    pub logging_period_ms: u32,
    /// Logging trigger
    pub logging: DataLogging,
    /// Display page shown (0-based)
    pub page: u8,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            locked: false,
            state_logging: true,
            data_logging: false,
            reading_period_min_ms: 1_000,
            reading_period_ms: 5_000,
            logging_period_ms: 600_000,
            logging: DataLogging::ByTime,
            page: 0,
        }
    }
}

impl DeviceState {
    /// Whether this state was written with the current layout
    pub fn is_current(&self) -> bool {
        self.version == STATE_VERSION
    }
}
