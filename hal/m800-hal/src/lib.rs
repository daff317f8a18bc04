//! M800 Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the analyzer controller talks
//! through. Chip-specific HALs implement them; the decoder and controller
//! logic in `m800-core` only ever sees these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  m800-core (controller, link, persist)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  m800-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          board-specific implementation
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - RS485 transceiver direction control
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`storage::StateStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod storage;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use storage::{StateStorage, StorageError, StorageKey};
pub use uart::{UartConfig, UartRx, UartTx};
