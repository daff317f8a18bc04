//! Wire-level constants and byte classification.

/// Field delimiter (TAB)
pub const FIELD_DELIMITER: u8 = 9;

/// Frame terminator (CR)
pub const FRAME_TERMINATOR: u8 = 13;

/// Token that asks the analyzer for one data frame
pub const REQUEST_TOKEN: &[u8] = b"D00Z";

/// Line ending sent after the request token
pub const REQUEST_LINE_END: &[u8] = b"\r\n";

/// Capacity of the key and value buffers.
///
/// Larger than the longest key rendering (`label unit` with two
/// 16-character parts), so a truncated key can never match.
pub const MAX_FIELD_LEN: usize = 40;

/// How the decoder treats a received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteClass {
    /// NUL, ignored
    Null,
    /// End of a field
    Delimiter,
    /// End of the frame
    Terminator,
    /// Printable ASCII (32..=126), field content
    Printable,
    /// Anything else; the link injects stray bytes, so these are dropped
    Noise,
}

impl ByteClass {
    /// Classify a received byte
    pub const fn of(byte: u8) -> Self {
        match byte {
            0 => ByteClass::Null,
            FIELD_DELIMITER => ByteClass::Delimiter,
            FRAME_TERMINATOR => ByteClass::Terminator,
            32..=126 => ByteClass::Printable,
            _ => ByteClass::Noise,
        }
    }
}
