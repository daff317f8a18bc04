//! Device state persistence
//!
//! Saves and restores [`DeviceState`] as postcard bytes. A stored blob whose
//! version tag differs from [`STATE_VERSION`] is not recoverable: the
//! default state is used and immediately written back, so storage always
//! holds a blob of the current layout after boot.

use m800_hal::storage::{StateStorage, StorageError, StorageKey};

use super::device::{DeviceState, STATE_VERSION};

/// Maximum serialized state size
pub const MAX_STATE_SIZE: usize = 64;

/// State persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Storage operation failed
    Storage(StorageError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored layout version differs from the current one
    VersionMismatch { found: u8 },
}

impl From<StorageError> for PersistError {
    fn from(e: StorageError) -> Self {
        PersistError::Storage(e)
    }
}

/// Outcome of [`restore_state`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    /// State to run with
    pub state: DeviceState,
    /// Whether it came from storage (false: fresh default)
    pub recovered: bool,
}

/// Save state to storage
pub fn save_state<S: StateStorage>(
    storage: &mut S,
    state: &DeviceState,
) -> Result<(), PersistError> {
    let mut buffer = [0u8; MAX_STATE_SIZE];
    let bytes = postcard::to_slice(state, &mut buffer).map_err(|_| PersistError::Serialize)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("Saving {} bytes of device state", bytes.len());

    storage.write(StorageKey::DeviceState, bytes)?;
    Ok(())
}

/// Load state from storage, checking the version tag first
pub fn load_state<S: StateStorage>(storage: &mut S) -> Result<DeviceState, PersistError> {
    let mut buffer = [0u8; MAX_STATE_SIZE];
    let len = storage.read(StorageKey::DeviceState, &mut buffer)?;
    let bytes = &buffer[..len];

    // a u8 is encoded as a single raw byte, so the leading field is the tag
    let found = *bytes.first().ok_or(PersistError::Deserialize)?;
    if found != STATE_VERSION {
        return Err(PersistError::VersionMismatch { found });
    }

    postcard::from_bytes(bytes).map_err(|_| PersistError::Deserialize)
}

/// Restore state at boot
///
/// Anything that cannot be loaded is replaced by the default, which is then
/// persisted right away.
pub fn restore_state<S: StateStorage>(storage: &mut S) -> Restored {
    match load_state(storage) {
        Ok(state) => {
            #[cfg(feature = "defmt")]
            defmt::info!("Restored device state (version {})", STATE_VERSION);
            Restored {
                state,
                recovered: true,
            }
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::info!("Could not restore device state ({}), using defaults", _e);

            let state = DeviceState::default();
            if let Err(_e) = save_state(storage, &state) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Failed to persist default device state: {}", _e);
            }
            Restored {
                state,
                recovered: false,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use heapless::Vec;

    /// RAM-backed storage for host tests
    #[derive(Debug, Default)]
    pub(crate) struct MemoryStorage {
        pub(crate) state: Option<Vec<u8, MAX_STATE_SIZE>>,
        pub(crate) writes: usize,
        pub(crate) fail_writes: bool,
    }

    impl StateStorage for MemoryStorage {
        fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
            if key != StorageKey::DeviceState {
                return Err(StorageError::NotFound);
            }
            let data = self.state.as_ref().ok_or(StorageError::NotFound)?;
            if buffer.len() < data.len() {
                return Err(StorageError::BufferTooSmall);
            }
            buffer[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
            if self.fail_writes || key != StorageKey::DeviceState {
                return Err(StorageError::Device);
            }
            self.state = Some(Vec::from_slice(data).map_err(|_| StorageError::Full)?);
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::default();
        let state = DeviceState {
            page: 2,
            data_logging: true,
            ..DeviceState::default()
        };
        save_state(&mut storage, &state).unwrap();
        assert_eq!(load_state(&mut storage), Ok(state));
    }

    #[test]
    fn test_restore_existing_state() {
        let mut storage = MemoryStorage::default();
        let state = DeviceState {
            page: 1,
            ..DeviceState::default()
        };
        save_state(&mut storage, &state).unwrap();

        let restored = restore_state(&mut storage);
        assert!(restored.recovered);
        assert_eq!(restored.state, state);
        assert_eq!(storage.writes, 1);
    }

    #[test]
    fn test_version_mismatch_resets_and_persists() {
        let mut storage = MemoryStorage::default();
        let old = DeviceState {
            version: STATE_VERSION - 1,
            page: 3,
            ..DeviceState::default()
        };
        save_state(&mut storage, &old).unwrap();
        assert_eq!(
            load_state(&mut storage),
            Err(PersistError::VersionMismatch {
                found: STATE_VERSION - 1
            })
        );

        let restored = restore_state(&mut storage);
        assert!(!restored.recovered);
        assert_eq!(restored.state, DeviceState::default());
        // default written back immediately
        assert_eq!(storage.writes, 2);
        assert_eq!(load_state(&mut storage), Ok(DeviceState::default()));
    }

    #[test]
    fn test_empty_storage_self_heals() {
        let mut storage = MemoryStorage::default();
        assert_eq!(
            load_state(&mut storage),
            Err(PersistError::Storage(StorageError::NotFound))
        );

        let restored = restore_state(&mut storage);
        assert!(!restored.recovered);
        assert_eq!(storage.writes, 1);
    }

    #[test]
    fn test_truncated_blob() {
        let mut storage = MemoryStorage {
            state: Some(Vec::from_slice(&[STATE_VERSION, 1]).unwrap()),
            ..MemoryStorage::default()
        };
        assert_eq!(load_state(&mut storage), Err(PersistError::Deserialize));
    }

    #[test]
    fn test_restore_survives_write_failure() {
        let mut storage = MemoryStorage {
            fail_writes: true,
            ..MemoryStorage::default()
        };
        let restored = restore_state(&mut storage);
        assert!(!restored.recovered);
        assert_eq!(restored.state, DeviceState::default());
    }
}
