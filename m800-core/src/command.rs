//! Remote commands
//!
//! Commands arrive as short text from the cloud link. Only commands
//! specific to this instrument are handled here.

/// Flip to the next display page
pub const CMD_PAGE: &str = "page";

/// A parsed remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Advance the display page (wrapping)
    PageAdvance,
}

/// Command errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Not a known command
    Unknown,
    /// Commands are locked out in the device state
    Locked,
}

impl Command {
    /// Parse command text
    ///
    /// Surrounding whitespace is ignored, case is not.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        match text.trim() {
            CMD_PAGE => Ok(Command::PageAdvance),
            _ => Err(CommandError::Unknown),
        }
    }

    /// Command text
    pub const fn as_str(self) -> &'static str {
        match self {
            Command::PageAdvance => CMD_PAGE,
        }
    }
}
