//! Character display rendering for the M800 analyzer
//!
//! This crate provides:
//! - `DisplayBackend` trait for the character display the controller drives
//! - `Screen`, a text buffer that is only pushed to the backend when dirty
//! - `render_page`, which lays out the channels of the current page
//!
//! The controller decides when to redraw (after a committed frame or a
//! page change); this crate only turns register contents into text.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod backend;
pub mod page;
pub mod screen;

pub use backend::{DisplayBackend, DisplayError};
pub use page::{format_slot, render_page, NO_READING};
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
