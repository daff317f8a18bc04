//! Device state
//!
//! The small versioned blob the controller keeps in non-volatile storage
//! across power cycles.

pub mod device;
pub mod persist;

pub use device::{DataLogging, DeviceState, STATE_VERSION};
pub use persist::{load_state, restore_state, save_state, PersistError, Restored};
