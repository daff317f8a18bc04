//! Channel page layout
//!
//! One line per channel:
//!
//! ```text
//! T        25.300 DegC
//! ^label  ^value  ^unit
//! ```
//!
//! The label takes 6 columns, the value is right-aligned in the next 9
//! with the slot's decimal count, the unit follows after a space. A slot
//! that has not had a reading since boot shows [`NO_READING`]; after that
//! it keeps showing its last reading.

use core::fmt::Write;

use heapless::String;
use m800_core::pages::PageCursor;
use m800_core::register::{ChannelSlot, ReadingRegister};

use crate::screen::{Screen, SCREEN_ROWS};

/// Shown in place of a value before the first reading
pub const NO_READING: &str = "---";

/// Shown when a value does not fit its column
const OVERFLOW: &str = "####";

const LABEL_WIDTH: usize = 6;
const VALUE_WIDTH: usize = 9;

/// Format one channel line
pub fn format_slot(slot: &ChannelSlot) -> String<48> {
    let mut value: String<VALUE_WIDTH> = String::new();
    match slot.latest() {
        Some(reading) => {
            if write!(value, "{:.*}", usize::from(slot.decimals()), reading).is_err() {
                value.clear();
                let _ = value.push_str(OVERFLOW);
            }
        }
        None => {
            let _ = value.push_str(NO_READING);
        }
    }

    let mut line = String::new();
    // label and unit are at most 16 chars each, the whole line fits
    let _ = write!(
        line,
        "{:<lw$.lw$}{:>vw$} {}",
        slot.label(),
        value.as_str(),
        slot.unit(),
        lw = LABEL_WIDTH,
        vw = VALUE_WIDTH
    );
    let trimmed = line.trim_end().len();
    line.truncate(trimmed);
    line
}

/// Lay out the channels of the current page
///
/// Rows past the last channel on the page are blanked.
pub fn render_page(screen: &mut Screen, register: &ReadingRegister, cursor: &PageCursor) {
    let mut channels = cursor.channels();
    for row in 0..SCREEN_ROWS {
        match channels.next().and_then(|position| register.slot(position)) {
            Some(slot) => screen.set_line(row, &format_slot(slot)),
            None => screen.set_line(row, ""),
        }
    }

    #[cfg(feature = "defmt")]
    defmt::trace!("Rendered page {}/{}", cursor.page() + 1, cursor.page_count());
}
