//! Non-volatile storage abstractions
//!
//! Provides a keyed blob store that chip-specific HALs implement on top of
//! their EEPROM or flash. Values are opaque bytes; versioning and encoding
//! are the caller's concern.

/// Storage keys for persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Versioned device state (binary postcard format)
    DeviceState = 0,
    /// Instrument configuration as TOML text
    InstrumentConfigToml = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::DeviceState),
            1 => Some(StorageKey::InstrumentConfigToml),
            _ => None,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying memory operation failed
    Device,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

/// Keyed blob storage
///
/// Implementations should make a single `write` atomic from the reader's
/// point of view: a later `read` returns either the old or the new value.
pub trait StateStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut probe = [0u8; 1];
        !matches!(self.read(key, &mut probe), Err(StorageError::NotFound))
    }
}
