//! Analyzer controller
//!
//! Owns the frame parser (and through it the reading register), the
//! persisted device state and the display page. One read cycle is:
//!
//! 1. [`Controller::begin_frame`] (or [`Controller::poll`], which also
//!    sends the request and drains the link)
//! 2. bytes through [`Controller::decoder`]
//! 3. [`Controller::complete_frame`] applies the commit policy: a frame
//!    with any error commits nothing
//!
//! The reading register is only written from here, readers borrow it
//! between cycles through [`Controller::register`].

use embedded_hal::delay::DelayNs;
use m800_hal::gpio::OutputPin;
use m800_hal::storage::StateStorage;
use m800_hal::uart::{UartRx, UartTx};
use m800_protocol::{FrameDecoder, FrameParser};

use crate::command::{Command, CommandError};
use crate::config::InstrumentConfig;
use crate::link::{receive_frame, Link, LinkError};
use crate::pages::PageCursor;
use crate::register::ReadingRegister;
use crate::state::{restore_state, save_state, DeviceState, PersistError};

/// What happened to a completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameOutcome {
    /// No errors; `channels` slots got a new sample
    Committed { channels: usize },
    /// At least one error; nothing committed
    Discarded { errors: u16 },
}

/// Frame counters since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    pub committed: u32,
    pub discarded: u32,
}

/// Errors from handling a remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    Command(CommandError),
    Persist(PersistError),
}

impl From<CommandError> for ControllerError {
    fn from(e: CommandError) -> Self {
        ControllerError::Command(e)
    }
}

impl From<PersistError> for ControllerError {
    fn from(e: PersistError) -> Self {
        ControllerError::Persist(e)
    }
}

pub struct Controller<S> {
    parser: FrameParser<ReadingRegister>,
    state: DeviceState,
    pages: PageCursor,
    storage: S,
    stats: FrameStats,
    refresh: bool,
    rx_budget: u32,
}

impl<S: StateStorage> Controller<S> {
    /// Build the controller and restore the persisted state
    ///
    /// `per_page` is the number of channels the display shows at once.
    pub fn new(config: &InstrumentConfig, mut storage: S, per_page: usize) -> Self {
        let mut state = restore_state(&mut storage).state;
        let mut pages = PageCursor::new(config.channel_count(), per_page);
        pages.set_page(state.page);
        // a page stored under a larger configuration wraps
        state.page = pages.page();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Controller ready: {} channels, {} pages",
            config.channel_count(),
            pages.page_count()
        );

        Self {
            parser: FrameParser::new(ReadingRegister::new(config)),
            state,
            pages,
            storage,
            stats: FrameStats::default(),
            refresh: true,
            rx_budget: config.link.rx_budget,
        }
    }

    pub fn register(&self) -> &ReadingRegister {
        self.parser.sink()
    }

    /// Reset running averages after they have been logged
    pub fn reset_averages(&mut self) {
        self.parser.sink_mut().reset_averages();
    }

    /// The parser, for feeding received bytes
    pub fn decoder(&mut self) -> &mut FrameParser<ReadingRegister> {
        &mut self.parser
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn pages(&self) -> &PageCursor {
        &self.pages
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Whether the display needs redrawing; clears the flag
    pub fn take_refresh(&mut self) -> bool {
        core::mem::take(&mut self.refresh)
    }

    /// Start decoding a new frame, discarding any partial one
    pub fn begin_frame(&mut self) {
        self.parser.start_frame();
    }

    /// Close the frame and commit it if it had no errors
    pub fn complete_frame(&mut self) -> FrameOutcome {
        let errors = self.parser.finish_frame();
        if errors > 0 {
            self.stats.discarded = self.stats.discarded.saturating_add(1);

            #[cfg(feature = "defmt")]
            defmt::warn!("Frame discarded with {} error(s)", errors);

            return FrameOutcome::Discarded { errors };
        }

        let channels = self.parser.sink_mut().commit();
        self.stats.committed = self.stats.committed.saturating_add(1);
        self.refresh = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("Frame committed: {} channel(s)", channels);

        FrameOutcome::Committed { channels }
    }

    /// Run one request/response cycle
    ///
    /// The response is read within the configured `rx_budget`. A failed
    /// request starts no frame; a receive error discards the frame.
    pub fn poll<P, T, D, R>(
        &mut self,
        link: &mut Link<P, T, D>,
        rx: &mut R,
    ) -> Result<FrameOutcome, LinkError<R::Error>>
    where
        P: OutputPin,
        T: UartTx<Error = R::Error>,
        D: DelayNs,
        R: UartRx,
    {
        link.send_request()?;
        self.begin_frame();
        let received = receive_frame(&mut self.parser, rx, self.rx_budget);
        let outcome = self.complete_frame();
        received.map(|()| outcome)
    }

    /// Handle a remote command
    pub fn handle_command(&mut self, text: &str) -> Result<Command, ControllerError> {
        let command = Command::parse(text)?;
        if self.state.locked {
            return Err(CommandError::Locked.into());
        }

        match command {
            Command::PageAdvance => {
                self.state.page = self.pages.advance();
                self.refresh = true;
                save_state(&mut self.storage, &self.state)?;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Command '{}' handled", command.as_str());

        Ok(command)
    }

    /// Persist the current state
    pub fn save(&mut self) -> Result<(), PersistError> {
        save_state(&mut self.storage, &self.state)
    }

    /// Release the storage
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::tests::{Delay, Pin, Rx, Tx, Wire};
    use crate::state::load_state;
    use crate::state::persist::tests::MemoryStorage;
    use core::cell::RefCell;
    use m800_protocol::FeedStatus;
    use proptest::prelude::*;

    const FRAME: &[u8] = b"07/01/24\t12:00:00\tpH\t7.21\tT DegC\t25.3\r";

    fn config() -> InstrumentConfig {
        InstrumentConfig::with_channels(&[("pH", ""), ("T", "DegC")]).unwrap()
    }

    fn controller() -> Controller<MemoryStorage> {
        Controller::new(&config(), MemoryStorage::default(), 1)
    }

    fn cycle(controller: &mut Controller<MemoryStorage>, frame: &[u8]) -> FrameOutcome {
        controller.begin_frame();
        controller.decoder().feed_bytes(frame);
        controller.complete_frame()
    }

    #[test]
    fn test_clean_frame_commits() {
        let mut controller = controller();
        assert_eq!(
            cycle(&mut controller, FRAME),
            FrameOutcome::Committed { channels: 2 }
        );

        let slots = controller.register().slots();
        assert_eq!(slots[0].latest(), Some(7.21));
        assert_eq!(slots[0].decimals(), 4);
        assert_eq!(slots[0].samples(), 1);
        assert_eq!(slots[1].average(), Some(25.3));
        assert_eq!(slots[1].decimals(), 3);
    }

    #[test]
    fn test_short_frame_commits_nothing() {
        let mut controller = controller();
        assert_eq!(
            cycle(&mut controller, b"07/01/24\t12:00:00\tpH\t7.21\r"),
            FrameOutcome::Discarded { errors: 1 }
        );
        for slot in controller.register().slots() {
            assert_eq!(slot.samples(), 0);
            assert_eq!(slot.average(), None);
        }
        assert_eq!(controller.stats().discarded, 1);
    }

    #[test]
    fn test_one_bad_pair_blocks_all_commits() {
        let mut controller = controller();
        cycle(&mut controller, FRAME);

        let outcome = cycle(&mut controller, b"d\tt\tpH\t9.99\tT DegC\tbad\r");
        assert_eq!(outcome, FrameOutcome::Discarded { errors: 1 });
        // pH decoded fine but was not folded into the average
        let ph = controller.register().slot(0).unwrap();
        assert_eq!(ph.latest(), Some(9.99));
        assert_eq!(ph.average(), Some(7.21));
        assert_eq!(ph.samples(), 1);
    }

    #[test]
    fn test_identical_frames_give_identical_slots() {
        let mut a = controller();
        let mut b = controller();
        cycle(&mut a, FRAME);
        cycle(&mut b, FRAME);
        cycle(&mut b, FRAME);
        for (x, y) in a.register().slots().iter().zip(b.register().slots()) {
            assert_eq!(x.latest(), y.latest());
            assert_eq!(x.decimals(), y.decimals());
            assert_eq!(x.average(), y.average());
        }
    }

    #[test]
    fn test_page_command_advances_and_persists() {
        let mut controller = controller();
        assert!(controller.take_refresh());
        assert!(!controller.take_refresh());

        assert_eq!(controller.handle_command("page"), Ok(Command::PageAdvance));
        assert_eq!(controller.pages().page(), 1);
        assert!(controller.take_refresh());

        // two channels, one per page: wraps back
        controller.handle_command("page").unwrap();
        assert_eq!(controller.pages().page(), 0);

        let mut storage = controller.into_storage();
        assert_eq!(load_state(&mut storage).unwrap().page, 0);
        // default written at boot, then one write per command
        assert_eq!(storage.writes, 3);
    }

    #[test]
    fn test_page_restored_at_boot() {
        let mut storage = MemoryStorage::default();
        let state = DeviceState {
            page: 1,
            ..DeviceState::default()
        };
        save_state(&mut storage, &state).unwrap();

        let controller = Controller::new(&config(), storage, 1);
        assert_eq!(controller.pages().page(), 1);
        assert_eq!(controller.state().page, 1);
    }

    #[test]
    fn test_commands_rejected_when_locked() {
        let mut storage = MemoryStorage::default();
        let state = DeviceState {
            locked: true,
            ..DeviceState::default()
        };
        save_state(&mut storage, &state).unwrap();

        let mut controller = Controller::new(&config(), storage, 1);
        assert_eq!(
            controller.handle_command("page"),
            Err(ControllerError::Command(CommandError::Locked))
        );
        assert_eq!(
            controller.handle_command("nope"),
            Err(ControllerError::Command(CommandError::Unknown))
        );
        assert_eq!(controller.pages().page(), 0);
    }

    #[test]
    fn test_poll_cycle() {
        let wire = RefCell::new(Wire::default());
        let mut link = Link::new(
            Pin(&wire, false),
            Tx(&wire, false),
            Delay(&wire),
            &config().link,
        );
        let mut controller = controller();

        let mut rx = Rx::bytes(FRAME);
        rx.0.push_front(None);
        assert_eq!(
            controller.poll(&mut link, &mut rx),
            Ok(FrameOutcome::Committed { channels: 2 })
        );
        assert_eq!(wire.borrow().sent.as_slice(), b"D00Z\r\n");
    }

    #[test]
    fn test_poll_timeout_discards() {
        let wire = RefCell::new(Wire::default());
        let mut link = Link::new(
            Pin(&wire, false),
            Tx(&wire, false),
            Delay(&wire),
            &config().link,
        );
        let mut controller = controller();

        let mut rx = Rx::bytes(b"07/01/24\t12:00:00\tpH\t7.21\tT DegC\t25.3");
        assert_eq!(
            controller.poll(&mut link, &mut rx),
            Err(LinkError::Timeout)
        );
        assert_eq!(controller.register().slot(0).unwrap().samples(), 0);
        assert_eq!(controller.stats().discarded, 1);
        assert!(!controller.decoder().is_active());
        assert_eq!(controller.decoder().feed_byte(b'x'), FeedStatus::Error);
    }

    #[test]
    fn test_poll_uses_configured_budget() {
        let mut config = config();
        config.link.rx_budget = 8;
        let wire = RefCell::new(Wire::default());
        let mut link = Link::new(
            Pin(&wire, false),
            Tx(&wire, false),
            Delay(&wire),
            &config.link,
        );
        let mut controller = Controller::new(&config, MemoryStorage::default(), 1);

        // a complete frame, but longer than eight polls
        let mut rx = Rx::bytes(FRAME);
        assert_eq!(
            controller.poll(&mut link, &mut rx),
            Err(LinkError::Timeout)
        );
        assert_eq!(rx.0.len(), FRAME.len() - 8);
        assert_eq!(controller.stats().discarded, 1);
    }

    #[test]
    fn test_failed_request_starts_no_frame() {
        let wire = RefCell::new(Wire::default());
        let mut link = Link::new(
            Pin(&wire, false),
            Tx(&wire, true),
            Delay(&wire),
            &config().link,
        );
        let mut controller = controller();

        let mut rx = Rx::bytes(FRAME);
        assert_eq!(
            controller.poll(&mut link, &mut rx),
            Err(LinkError::Uart(()))
        );
        assert!(!controller.decoder().is_active());
        assert_eq!(rx.0.len(), FRAME.len());
        assert_eq!(controller.stats(), FrameStats::default());
    }

    #[test]
    fn test_out_of_range_page_wraps_into_state() {
        let mut storage = MemoryStorage::default();
        let state = DeviceState {
            page: 5,
            ..DeviceState::default()
        };
        save_state(&mut storage, &state).unwrap();

        // two channels, one per page
        let controller = Controller::new(&config(), storage, 1);
        assert_eq!(controller.pages().page(), 1);
        assert_eq!(controller.state().page, controller.pages().page());
    }

    proptest! {
        #[test]
        fn prop_discarded_frames_leave_averages(frame in proptest::collection::vec(any::<u8>(), 0..96)) {
            let mut controller = controller();
            cycle(&mut controller, FRAME);
            let before: std::vec::Vec<_> = controller
                .register()
                .slots()
                .iter()
                .map(|slot| (slot.average(), slot.samples()))
                .collect();

            if let FrameOutcome::Discarded { .. } = cycle(&mut controller, &frame) {
                let after: std::vec::Vec<_> = controller
                    .register()
                    .slots()
                    .iter()
                    .map(|slot| (slot.average(), slot.samples()))
                    .collect();
                prop_assert_eq!(before, after);
            }
        }
    }
}
