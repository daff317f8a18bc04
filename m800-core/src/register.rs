//! Reading register
//!
//! One slot per configured channel, in frame order. The frame parser
//! writes each decoded value into its slot as soon as the pair is
//! validated; [`ReadingRegister::commit`] later folds the values written
//! in that frame into the running averages. A slot the frame did not
//! write (sentinel, or a pair that failed) keeps its stored value. The controller only commits frames without
//! errors, so an average never mixes in data from a corrupted frame.

use heapless::{String, Vec};
use m800_protocol::ReadingSink;

use crate::config::{InstrumentConfig, MAX_CHANNELS, MAX_LABEL_LEN, MAX_UNIT_LEN};

/// One channel's readings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSlot {
    index: u8,
    label: String<MAX_LABEL_LEN>,
    unit: String<MAX_UNIT_LEN>,
    latest: Option<f32>,
    decimals: u8,
    /// `latest` was written in the current frame and not yet committed
    fresh: bool,
    average: Option<f32>,
    samples: u32,
}

impl ChannelSlot {
    fn new(index: u8, label: &str, unit: &str) -> Self {
        let mut slot = Self {
            index,
            label: String::new(),
            unit: String::new(),
            latest: None,
            decimals: 0,
            fresh: false,
            average: None,
            samples: 0,
        };
        // capacities match the config types
        let _ = slot.label.push_str(label);
        let _ = slot.unit.push_str(unit);
        slot
    }

    /// 1-based channel number
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Most recent value decoded for this channel
    pub fn latest(&self) -> Option<f32> {
        self.latest
    }

    /// Display precision of the latest value
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Running average of committed values
    pub fn average(&self) -> Option<f32> {
        self.average
    }

    /// Number of values in the running average
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Whether the current frame wrote this slot
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Fold a value written in the current frame into the running average
    ///
    /// Returns false when the frame did not write this slot.
    pub fn commit(&mut self) -> bool {
        let Some(latest) = self.latest.filter(|_| self.fresh) else {
            return false;
        };
        self.fresh = false;

        let n = self.samples as f32;
        self.average = Some(match self.average {
            Some(average) => average + (latest - average) / (n + 1.0),
            None => latest,
        });
        self.samples = self.samples.saturating_add(1);
        true
    }

    /// Drop the running average, keeping the latest value
    pub fn reset_average(&mut self) {
        self.average = None;
        self.samples = 0;
    }
}

/// Fixed-length set of channel slots
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadingRegister {
    slots: Vec<ChannelSlot, MAX_CHANNELS>,
}

impl ReadingRegister {
    /// One slot per configured channel
    pub fn new(config: &InstrumentConfig) -> Self {
        let slots = config
            .channels
            .iter()
            .enumerate()
            .map(|(i, channel)| ChannelSlot::new(i as u8 + 1, &channel.label, &channel.unit))
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[ChannelSlot] {
        &self.slots
    }

    /// Slot at a 0-based frame position
    pub fn slot(&self, position: usize) -> Option<&ChannelSlot> {
        self.slots.get(position)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Commit every slot holding a value from the last frame
    ///
    /// Returns the number of slots committed.
    pub fn commit(&mut self) -> usize {
        self.slots
            .iter_mut()
            .map(ChannelSlot::commit)
            .filter(|&committed| committed)
            .count()
    }

    /// Reset all running averages
    pub fn reset_averages(&mut self) {
        for slot in &mut self.slots {
            slot.reset_average();
        }
    }
}

impl ReadingSink for ReadingRegister {
    fn channel_count(&self) -> usize {
        self.slots.len()
    }

    fn channel_key(&self, index: usize) -> Option<(&str, &str)> {
        self.slots.get(index).map(|s| (s.label(), s.unit()))
    }

    fn record(&mut self, index: usize, value: f32, decimals: u8) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.latest = Some(value);
            slot.decimals = decimals;
            slot.fresh = true;
        }
    }

    fn discard_pending(&mut self) {
        for slot in &mut self.slots {
            slot.fresh = false;
        }
    }
}
