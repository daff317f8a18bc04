//! Board-agnostic controller logic for the M800 analyzer
//!
//! This crate contains everything between the wire decoder and the
//! hardware that does not depend on a specific board:
//!
//! - Instrument configuration types and a TOML subset loader
//! - The reading register the frame parser writes into
//! - Versioned device state and its persistence policy
//! - Display paging and remote commands
//! - Request sequencing on the half-duplex link
//! - The controller tying a frame to its commit decision

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod controller;
pub mod link;
pub mod pages;
pub mod register;
pub mod state;

pub use controller::{Controller, FrameOutcome};
pub use register::{ChannelSlot, ReadingRegister};

pub use m800_protocol as protocol;
