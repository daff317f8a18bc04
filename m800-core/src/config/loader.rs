//! Configuration from storage
//!
//! The instrument configuration can be kept as TOML text under
//! [`StorageKey::InstrumentConfigToml`]. Boards without stored text build
//! the configuration in code instead.

use core::str;

use m800_hal::storage::{StateStorage, StorageError, StorageKey};

use super::toml::parse_config;
use super::types::{ConfigError, InstrumentConfig};

/// Maximum TOML config size
pub const MAX_TOML_SIZE: usize = 1024;

/// Errors loading the stored configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Storage operation failed
    Storage(StorageError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    Parse(ConfigError),
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        LoadError::Storage(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Parse(e)
    }
}

/// Load and parse the stored TOML configuration
pub fn load_config<S: StateStorage>(storage: &mut S) -> Result<InstrumentConfig, LoadError> {
    let mut buffer = [0u8; MAX_TOML_SIZE];
    let len = storage.read(StorageKey::InstrumentConfigToml, &mut buffer)?;
    let text = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("Parsing {} bytes of stored configuration", len);

    let config = parse_config(text)?;

    #[cfg(feature = "defmt")]
    defmt::info!("Loaded configuration: {} channels", config.channel_count());

    Ok(config)
}

/// Store TOML configuration text, validating it first
pub fn store_config<S: StateStorage>(storage: &mut S, text: &str) -> Result<(), LoadError> {
    if text.len() > MAX_TOML_SIZE {
        return Err(StorageError::BufferTooSmall.into());
    }
    parse_config(text)?;
    storage.write(StorageKey::InstrumentConfigToml, text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct TomlStorage {
        text: Option<Vec<u8>>,
    }

    impl StateStorage for TomlStorage {
        fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
            if key != StorageKey::InstrumentConfigToml {
                return Err(StorageError::NotFound);
            }
            let text = self.text.as_ref().ok_or(StorageError::NotFound)?;
            let target = buffer
                .get_mut(..text.len())
                .ok_or(StorageError::BufferTooSmall)?;
            target.copy_from_slice(text);
            Ok(text.len())
        }

        fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
            if key != StorageKey::InstrumentConfigToml {
                return Err(StorageError::Device);
            }
            self.text = Some(data.to_vec());
            Ok(())
        }
    }

    const TOML: &str = "[link]\nrx_budget = 512\n\n[channel.1]\nlabel = \"pH\"\nunit = \"\"\n";

    #[test]
    fn test_store_then_load() {
        let mut storage = TomlStorage::default();
        store_config(&mut storage, TOML).unwrap();

        let config = load_config(&mut storage).unwrap();
        assert_eq!(config.channel_count(), 1);
        assert_eq!(config.channels[0].label.as_str(), "pH");
        assert_eq!(config.link.rx_budget, 512);
    }

    #[test]
    fn test_missing_config() {
        let mut storage = TomlStorage::default();
        assert_eq!(
            load_config(&mut storage),
            Err(LoadError::Storage(StorageError::NotFound))
        );
    }

    #[test]
    fn test_invalid_text_not_stored() {
        let mut storage = TomlStorage::default();
        assert_eq!(
            store_config(&mut storage, "[motor]\n"),
            Err(LoadError::Parse(ConfigError::InvalidSection))
        );
        assert!(storage.text.is_none());
    }

    #[test]
    fn test_invalid_utf8() {
        let mut storage = TomlStorage {
            text: Some(std::vec![0xFF, 0xFE]),
        };
        assert_eq!(load_config(&mut storage), Err(LoadError::InvalidUtf8));
    }
}
