//! Half-duplex RS485 link
//!
//! The analyzer only talks when asked. A request drives the transceiver
//! into transmit, sends the request token, holds the line long enough for
//! the last byte to leave the shift register, then hands the line back to
//! the receiver for the response.

use embedded_hal::delay::DelayNs;
use m800_hal::gpio::OutputPin;
use m800_hal::uart::{UartRx, UartTx};
use m800_protocol::wire::{REQUEST_LINE_END, REQUEST_TOKEN};
use m800_protocol::{FeedStatus, FrameDecoder};

use crate::config::LinkConfig;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// UART reported an error
    Uart(E),
    /// No terminator within the poll budget
    Timeout,
    /// The decoder refused a byte (no frame started)
    Rejected,
}

/// Request side of the link
pub struct Link<P, T, D> {
    direction: P,
    tx: T,
    delay: D,
    tx_hold_ms: u32,
}

impl<P, T, D> Link<P, T, D>
where
    P: OutputPin,
    T: UartTx,
    D: DelayNs,
{
    /// Create the link, leaving the transceiver in receive
    pub fn new(mut direction: P, tx: T, delay: D, config: &LinkConfig) -> Self {
        direction.set_low();
        Self {
            direction,
            tx,
            delay,
            tx_hold_ms: config.tx_hold_ms,
        }
    }

    /// Send one read request
    ///
    /// The transceiver is back in receive when this returns, also on error.
    pub fn send_request(&mut self) -> Result<(), LinkError<T::Error>> {
        self.direction.set_high();
        let written = self.write_request();
        self.delay.delay_ms(self.tx_hold_ms);
        self.direction.set_low();

        #[cfg(feature = "defmt")]
        defmt::trace!("Request sent");

        written.map_err(LinkError::Uart)
    }

    fn write_request(&mut self) -> Result<(), T::Error> {
        self.tx.write_blocking(REQUEST_TOKEN)?;
        self.tx.write_blocking(REQUEST_LINE_END)?;
        self.tx.flush()
    }

    /// Whether the transceiver is currently in receive
    pub fn is_receiving(&self) -> bool {
        self.direction.is_set_low()
    }

    /// Release the hardware
    pub fn release(self) -> (P, T, D) {
        (self.direction, self.tx, self.delay)
    }
}

/// Feed received bytes into `decoder` until the frame completes
///
/// The frame must already be started. `budget` bounds the number of
/// `read_byte` polls, idle ones included.
pub fn receive_frame<F, R>(
    decoder: &mut F,
    rx: &mut R,
    budget: u32,
) -> Result<(), LinkError<R::Error>>
where
    F: FrameDecoder + ?Sized,
    R: UartRx,
{
    for _ in 0..budget {
        let Some(byte) = rx.read_byte().map_err(LinkError::Uart)? else {
            continue;
        };
        match decoder.feed_byte(byte) {
            FeedStatus::Waiting => {}
            FeedStatus::Complete => return Ok(()),
            FeedStatus::Error => return Err(LinkError::Rejected),
        }
    }

    #[cfg(feature = "defmt")]
    defmt::warn!("No frame terminator after {} polls", budget);

    Err(LinkError::Timeout)
}
