//! Frame decoding for the M800 telemetry stream.
//!
//! Frame format:
//! - DATE, TIME: skipped, only counted
//! - KEY, VALUE pairs: one per configured channel, in channel order
//! - every field but the last ends with TAB, the frame ends with CR
//!
//! The parser is driven one byte at a time between [`FrameDecoder::start_frame`]
//! and [`FrameDecoder::finish_frame`]. Bad pairs are counted and skipped; the
//! caller decides from the final count whether the frame is kept.

use heapless::String;

use crate::key;
use crate::value::{parse_value, ValueParse};
use crate::wire::{ByteClass, MAX_FIELD_LEN};

/// Number of leading fields (date, time) before the first pair
const HEADER_FIELDS: usize = 2;

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedStatus {
    /// More bytes needed
    Waiting,
    /// Terminator seen, call `finish_frame`
    Complete,
    /// Byte fed without an active session, or after the terminator
    Error,
}

/// Frame decoding capability
///
/// Transports depend on this trait only, never on a concrete parser.
pub trait FrameDecoder {
    /// Begin a new frame, discarding any session in progress
    fn start_frame(&mut self);

    /// Consume one received byte
    fn feed_byte(&mut self, byte: u8) -> FeedStatus;

    /// Close the session and return the number of errors in the frame
    fn finish_frame(&mut self) -> u16;

    /// Feed bytes until the frame completes or a byte is rejected
    ///
    /// Bytes after a `Complete` or `Error` are not consumed.
    fn feed_bytes(&mut self, bytes: &[u8]) -> FeedStatus {
        for &byte in bytes {
            match self.feed_byte(byte) {
                FeedStatus::Waiting => {}
                status => return status,
            }
        }
        FeedStatus::Waiting
    }
}

/// Destination of decoded readings
///
/// Channel indices are 0-based positions in the frame.
pub trait ReadingSink {
    /// Number of pairs a complete frame carries
    fn channel_count(&self) -> usize;

    /// Label and unit of a channel, or `None` past the last channel
    fn channel_key(&self, index: usize) -> Option<(&str, &str)>;

    /// Store a reading decoded from the current frame
    fn record(&mut self, index: usize, value: f32, decimals: u8);

    /// A new frame starts; readings recorded for an earlier frame are no
    /// longer pending
    fn discard_pending(&mut self);
}

/// Kind of per-frame error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Key matched none of the channel's renderings
    KeyMismatch { channel: usize },
    /// Value neither numeric nor a known sentinel
    ValueInvalid { channel: usize },
    /// Pair count differs from the configured channel count
    CountMismatch { expected: usize, received: usize },
    /// Byte fed without an active session
    CallerMisuse,
}

/// Detail of the most recent error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// What went wrong
    pub kind: FaultKind,
    /// Running error count of the frame, this error included
    pub errors: u16,
    /// Key text as received
    pub key: String<MAX_FIELD_LEN>,
    /// Value text as received
    pub value: String<MAX_FIELD_LEN>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    /// No frame started, or the last one was finished
    Idle,
    /// Accepting bytes
    Active,
    /// Terminator seen, waiting for `finish_frame`
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Time,
    Key,
    Value,
}

/// Byte-at-a-time frame state machine
///
/// Owns the sink it writes readings into; borrow it through [`Self::sink`]
/// between frames.
#[derive(Debug, Clone)]
pub struct FrameParser<S> {
    sink: S,
    session: Session,
    field: Field,
    /// Completed date, time and value fields
    pair_counter: usize,
    key: String<MAX_FIELD_LEN>,
    value: String<MAX_FIELD_LEN>,
    key_overflow: bool,
    value_overflow: bool,
    errors: u16,
    last_fault: Option<Fault>,
}

impl<S: ReadingSink> FrameParser<S> {
    /// Create a parser writing into `sink`
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            session: Session::Idle,
            field: Field::Date,
            pair_counter: 0,
            key: String::new(),
            value: String::new(),
            key_overflow: false,
            value_overflow: false,
            errors: 0,
            last_fault: None,
        }
    }

    /// Readings decoded so far
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access for committing or resetting readings between frames
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the parser and return the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Errors counted in the current (or last) frame
    pub fn errors(&self) -> u16 {
        self.errors
    }

    /// Channel pairs completed in the current (or last) frame
    pub fn pairs_received(&self) -> usize {
        self.pair_counter.saturating_sub(HEADER_FIELDS)
    }

    /// Detail of the most recent error, if any
    pub fn last_fault(&self) -> Option<&Fault> {
        self.last_fault.as_ref()
    }

    /// Whether a session is accepting bytes
    pub fn is_active(&self) -> bool {
        self.session == Session::Active
    }

    fn push(&mut self, byte: u8) {
        let (buffer, overflow) = match self.field {
            // date and time content is not kept
            Field::Date | Field::Time => return,
            Field::Key => (&mut self.key, &mut self.key_overflow),
            Field::Value => (&mut self.value, &mut self.value_overflow),
        };
        if buffer.push(char::from(byte)).is_err() {
            *overflow = true;
        }
    }

    fn end_field(&mut self) {
        match self.field {
            Field::Date => {
                self.pair_counter += 1;
                self.field = Field::Time;
            }
            Field::Time => {
                self.pair_counter += 1;
                self.field = Field::Key;
            }
            Field::Key => self.field = Field::Value,
            Field::Value => {
                self.complete_pair();
                self.field = Field::Key;
            }
        }
    }

    fn terminate(&mut self) {
        // the last value has no trailing delimiter; a dangling key is a
        // pair without a value
        let pending = match self.field {
            Field::Value => true,
            Field::Key => !self.key.is_empty() || self.key_overflow,
            Field::Date | Field::Time => false,
        };
        if pending {
            self.complete_pair();
            self.field = Field::Key;
        }

        self.check_count();
        self.session = Session::Terminated;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Frame complete: {} pairs, {} errors",
            self.pairs_received(),
            self.errors
        );
    }

    fn check_count(&mut self) {
        let expected = self.sink.channel_count();
        let received = self.pairs_received();
        if received != expected {
            self.fault(FaultKind::CountMismatch { expected, received });
        }
    }

    fn complete_pair(&mut self) {
        let channel = self.pairs_received();

        let key_ok = !self.key_overflow
            && self
                .sink
                .channel_key(channel)
                .is_some_and(|(label, unit)| key::matches(&self.key, label, unit));

        let parsed = if self.value_overflow {
            ValueParse::Invalid
        } else {
            parse_value(&self.value)
        };

        if !key_ok {
            self.fault(FaultKind::KeyMismatch { channel });
        } else {
            match parsed {
                ValueParse::Parsed { value, decimals } => {
                    self.sink.record(channel, value, decimals);
                }
                ValueParse::Sentinel(_sentinel) => {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("Channel {}: no reading ({})", channel, _sentinel);
                }
                ValueParse::Invalid => self.fault(FaultKind::ValueInvalid { channel }),
            }
        }

        self.key.clear();
        self.value.clear();
        self.key_overflow = false;
        self.value_overflow = false;
        self.pair_counter += 1;
    }

    fn fault(&mut self, kind: FaultKind) {
        if kind != FaultKind::CallerMisuse {
            self.errors = self.errors.saturating_add(1);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "Frame error #{}: {} key '{}' value '{}'",
            self.errors,
            kind,
            self.key.as_str(),
            self.value.as_str()
        );

        self.last_fault = Some(Fault {
            kind,
            errors: self.errors,
            key: self.key.clone(),
            value: self.value.clone(),
        });
    }
}

impl<S: ReadingSink> FrameDecoder for FrameParser<S> {
    fn start_frame(&mut self) {
        self.session = Session::Active;
        self.field = Field::Date;
        self.pair_counter = 0;
        self.key.clear();
        self.value.clear();
        self.key_overflow = false;
        self.value_overflow = false;
        self.errors = 0;
        self.last_fault = None;
        self.sink.discard_pending();
    }

    fn feed_byte(&mut self, byte: u8) -> FeedStatus {
        match self.session {
            Session::Active => {}
            // trailing bytes after the terminator; keep the frame's fault
            Session::Terminated => return FeedStatus::Error,
            Session::Idle => {
                self.fault(FaultKind::CallerMisuse);
                return FeedStatus::Error;
            }
        }

        match ByteClass::of(byte) {
            ByteClass::Null | ByteClass::Noise => FeedStatus::Waiting,
            ByteClass::Printable => {
                self.push(byte);
                FeedStatus::Waiting
            }
            ByteClass::Delimiter => {
                self.end_field();
                FeedStatus::Waiting
            }
            ByteClass::Terminator => {
                self.terminate();
                FeedStatus::Complete
            }
        }
    }

    fn finish_frame(&mut self) -> u16 {
        if self.session == Session::Active {
            // terminator never arrived
            self.check_count();
        }
        self.session = Session::Idle;
        self.errors
    }
}
