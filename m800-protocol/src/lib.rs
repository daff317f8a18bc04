//! M800 telemetry frame protocol
//!
//! The analyzer answers every read request with one ASCII frame on its
//! RS485 link:
//!
//! ```text
//! DATE<TAB>TIME<TAB>KEY1<TAB>VALUE1<TAB>...<TAB>KEYn<TAB>VALUEn<CR>
//! ```
//!
//! This crate decodes that stream one byte at a time:
//!
//! - [`wire`] - delimiters, terminator, request token and byte classes
//! - [`key`] - the accepted renderings of a channel's (label, unit) key
//! - [`value`] - numeric values and the "no reading" sentinels
//! - [`frame`] - the frame state machine behind [`FrameDecoder`]
//!
//! The parser never holds more than one key and one value. Readings are
//! handed to a [`ReadingSink`] as each pair completes.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod key;
pub mod value;
pub mod wire;

pub use frame::{Fault, FaultKind, FeedStatus, FrameDecoder, FrameParser, ReadingSink};
pub use key::{match_key, KeyForm};
pub use value::{parse_value, Sentinel, ValueParse, PRECISION_BONUS};
pub use wire::{ByteClass, FIELD_DELIMITER, FRAME_TERMINATOR, MAX_FIELD_LEN, REQUEST_TOKEN};
