//! Mock implementations for testing without hardware.
//!
//! All mocks created from one [`MockBus`] append to a shared event log, so a
//! test can see the exact interleaving of line transitions, delays and duty
//! writes, and decode what the shift registers would have received.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockLine`] | [`OutputLine`] | Records level changes for one [`LineId`] |
//! | [`MockPwm`] | [`PwmOutput`] | Records duty fractions |
//! | [`MockDelay`] | [`Delay`] | Records delays (does not sleep) |
//!
//! # Example
//!
//! ```rust
//! use easy_nixie::{Color, Digit};
//! use easy_nixie::config::{ChainConfig, Config};
//! use easy_nixie::hal::MockBus;
//!
//! let bus = MockBus::new();
//! let mut display = bus
//!     .display(&Config::default().with_chain(ChainConfig::default().with_num_tubes(2)))
//!     .unwrap();
//!
//! display.set_tube(0, Digit::from(1), Color::Red, true, false, 255).unwrap();
//! display.render().unwrap();
//!
//! // Tube 1 is shifted first, tube 0 last; control byte before digit byte
//! let frames = bus.frames();
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0], vec![0b0010_0000, 0, 0b0010_1100, 0b0000_0010]);
//! ```
//!
//! [`OutputLine`]: crate::traits::OutputLine
//! [`PwmOutput`]: crate::traits::PwmOutput
//! [`Delay`]: crate::traits::Delay

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::brightness::BrightnessController;
use crate::config::{ChainConfig, Config, ShiftTiming};
use crate::display::NixieDisplay;
use crate::error::Error;
use crate::link::SerialLink;
use crate::traits::{Delay, OutputLine, PwmOutput};

/// Display type assembled entirely from mocks.
pub type MockDisplay = NixieDisplay<MockLine, MockPwm, MockDelay>;

/// The four lines of an EasyNixie chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineId {
    /// SHCP, shift clock.
    Clock,
    /// DSIN, serial data.
    Data,
    /// STCP, storage latch.
    Latch,
    /// OUT_EN, driven as a plain output when PWM is unavailable.
    Enable,
}

impl LineId {
    const fn slot(self) -> usize {
        match self {
            LineId::Clock => 0,
            LineId::Data => 1,
            LineId::Latch => 2,
            LineId::Enable => 3,
        }
    }
}

/// One recorded hardware interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum BusEvent {
    /// A line was driven.
    Level {
        /// Which line.
        line: LineId,
        /// New level.
        high: bool,
    },
    /// PWM duty written.
    Duty(f32),
    /// Delay requested.
    DelayUs(u32),
}

/// Error a caller can hand to [`BrightnessController::acquire`] to simulate
/// a pin without PWM capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmUnavailable;

#[derive(Debug, Default)]
struct BusState {
    events: Vec<BusEvent>,
    levels: [Option<bool>; 4],
    /// Levels at the start of `events`, for decoding after `clear()`
    initial: [Option<bool>; 4],
}

/// Shared event log for a set of mocks.
///
/// Cloning the bus shares the log.
#[derive(Clone, Debug, Default)]
pub struct MockBus {
    state: Rc<RefCell<BusState>>,
}

impl MockBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a line recording to this bus.
    pub fn line(&self, id: LineId) -> MockLine {
        MockLine {
            id,
            bus: Some(self.clone()),
        }
    }

    /// Creates a PWM channel recording to this bus.
    pub fn pwm(&self) -> MockPwm {
        MockPwm {
            bus: Some(self.clone()),
        }
    }

    /// Creates a delay source recording to this bus.
    pub fn delay(&self) -> MockDelay {
        MockDelay { bus: self.clone() }
    }

    /// Builds a [`SerialLink`] from this bus's clock, data and latch lines.
    pub fn link(&self, timing: ShiftTiming) -> SerialLink<MockLine, MockDelay> {
        match SerialLink::new(
            self.line(LineId::Clock),
            self.line(LineId::Data),
            self.line(LineId::Latch),
            self.delay(),
            timing,
        ) {
            Ok(link) => link,
            Err(()) => unreachable!("bus lines never fail"),
        }
    }

    /// Builds a PWM-backed [`BrightnessController`] at `initial_level`.
    pub fn brightness(&self, initial_level: u8) -> BrightnessController<MockPwm, MockLine> {
        match BrightnessController::pwm(self.pwm(), initial_level) {
            Ok(brightness) => brightness,
            Err(()) => unreachable!("bus PWM never fails"),
        }
    }

    /// Builds a [`BrightnessController`] whose PWM acquisition failed.
    pub fn brightness_without_pwm(&self) -> BrightnessController<MockPwm, MockLine> {
        match BrightnessController::acquire(
            Err::<MockPwm, _>(PwmUnavailable),
            || Ok(self.line(LineId::Enable)),
            u8::MAX,
        ) {
            Ok(brightness) => brightness,
            Err(()) => unreachable!("bus lines never fail"),
        }
    }

    /// Builds a complete display from `config`.
    pub fn display(&self, config: &Config) -> Result<MockDisplay, Error<()>> {
        NixieDisplay::new(
            &config.chain,
            self.link(config.timing),
            self.brightness(config.brightness.initial_level),
        )
    }

    /// Builds a default-configured display with `num_tubes` tubes.
    pub fn display_with_tubes(&self, num_tubes: usize) -> Result<MockDisplay, Error<()>> {
        self.display(
            &Config::default().with_chain(ChainConfig::default().with_num_tubes(num_tubes)),
        )
    }

    /// Builds a display whose OUT_EN fell back to a plain output.
    pub fn display_without_pwm(&self, config: &Config) -> Result<MockDisplay, Error<()>> {
        NixieDisplay::new(
            &config.chain,
            self.link(config.timing),
            self.brightness_without_pwm(),
        )
    }

    fn record(&self, event: BusEvent) {
        let mut state = self.state.borrow_mut();
        if let BusEvent::Level { line, high } = event {
            state.levels[line.slot()] = Some(high);
        }
        state.events.push(event);
    }

    /// Returns a copy of every recorded event.
    pub fn events(&self) -> Vec<BusEvent> {
        self.state.borrow().events.clone()
    }

    /// Forgets recorded events. Current line levels are kept.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.events.clear();
        state.initial = state.levels;
    }

    /// Current level of `id`, `None` if it was never driven.
    pub fn level(&self, id: LineId) -> Option<bool> {
        self.state.borrow().levels[id.slot()]
    }

    /// Every duty fraction written, in order.
    pub fn duties(&self) -> Vec<f32> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Duty(duty) => Some(*duty),
                _ => None,
            })
            .collect()
    }

    /// Every delay requested, in microseconds.
    pub fn delays(&self) -> Vec<u32> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                BusEvent::DelayUs(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    /// Number of rising edges on the latch line.
    pub fn latch_pulses(&self) -> usize {
        self.decode().1.len()
    }

    /// Bytes clocked into the chain, in transmission order.
    ///
    /// Samples DSIN on each SHCP rising edge, MSB first. A trailing partial
    /// byte is discarded.
    pub fn shifted_bytes(&self) -> Vec<u8> {
        self.decode().0
    }

    /// Bytes shifted before each latch pulse.
    ///
    /// Bytes shifted after the last latch are not part of any frame.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        let (bytes, latches) = self.decode();
        let mut frames = Vec::with_capacity(latches.len());
        let mut start = 0;
        for end in latches {
            frames.push(bytes[start..end].to_vec());
            start = end;
        }
        frames
    }

    /// Decoded bytes plus, for each latch rising edge, the number of whole
    /// bytes shifted before it.
    fn decode(&self) -> (Vec<u8>, Vec<usize>) {
        let state = self.state.borrow();
        let mut levels = state.initial.map(|l| l.unwrap_or(false));
        let mut bytes = Vec::new();
        let mut latches = Vec::new();
        let mut current = 0u8;
        let mut bits = 0;

        for event in &state.events {
            let BusEvent::Level { line, high } = *event else {
                continue;
            };
            let rising = high && !levels[line.slot()];
            levels[line.slot()] = high;
            if !rising {
                continue;
            }
            match line {
                LineId::Clock => {
                    current = (current << 1) | levels[LineId::Data.slot()] as u8;
                    bits += 1;
                    if bits == 8 {
                        bytes.push(current);
                        current = 0;
                        bits = 0;
                    }
                }
                LineId::Latch => latches.push(bytes.len()),
                _ => {}
            }
        }

        (bytes, latches)
    }
}

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock output line.
///
/// A line created by [`MockBus::line`] records every level. A line created
/// by [`MockLine::broken`] fails every write, for testing initialization
/// errors.
#[derive(Clone, Debug)]
pub struct MockLine {
    id: LineId,
    bus: Option<MockBus>,
}

impl MockLine {
    /// Creates a line whose writes always fail.
    pub fn broken(id: LineId) -> Self {
        Self { id, bus: None }
    }

    /// Which line this is.
    #[inline]
    pub fn id(&self) -> LineId {
        self.id
    }
}

impl OutputLine for MockLine {
    type Error = ();

    fn set(&mut self, high: bool) -> Result<(), ()> {
        match &self.bus {
            Some(bus) => {
                bus.record(BusEvent::Level { line: self.id, high });
                Ok(())
            }
            None => Err(()),
        }
    }
}

/// Mock PWM channel.
///
/// Duty fractions are clamped to `0.0..=1.0` before being recorded.
#[derive(Clone, Debug)]
pub struct MockPwm {
    bus: Option<MockBus>,
}

impl MockPwm {
    /// Creates a channel whose writes always fail.
    pub fn broken() -> Self {
        Self { bus: None }
    }
}

impl PwmOutput for MockPwm {
    type Error = ();

    fn set_duty_fraction(&mut self, fraction: f32) -> Result<(), ()> {
        match &self.bus {
            Some(bus) => {
                bus.record(BusEvent::Duty(fraction.clamp(0.0, 1.0)));
                Ok(())
            }
            None => Err(()),
        }
    }
}

/// Mock delay. Records the requested duration and returns immediately.
#[derive(Clone, Debug)]
pub struct MockDelay {
    bus: MockBus,
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.bus.record(BusEvent::DelayUs(us));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_bus_default() {
        let bus = MockBus::new();
        assert!(bus.events().is_empty());
        assert_eq!(bus.level(LineId::Clock), None);
        assert!(bus.shifted_bytes().is_empty());
        assert_eq!(bus.latch_pulses(), 0);
    }

    #[test]
    fn mock_line_records_levels() {
        let bus = MockBus::new();
        let mut line = bus.line(LineId::Data);
        line.set_high().unwrap();
        line.set_low().unwrap();

        assert_eq!(line.id(), LineId::Data);
        assert_eq!(bus.level(LineId::Data), Some(false));
        assert_eq!(
            bus.events(),
            vec![
                BusEvent::Level {
                    line: LineId::Data,
                    high: true
                },
                BusEvent::Level {
                    line: LineId::Data,
                    high: false
                },
            ]
        );
    }

    #[test]
    fn broken_line_fails() {
        let mut line = MockLine::broken(LineId::Clock);
        assert_eq!(line.set_high(), Err(()));
    }

    #[test]
    fn mock_pwm_clamps() {
        let bus = MockBus::new();
        let mut pwm = bus.pwm();
        pwm.set_duty_fraction(1.5).unwrap();
        pwm.set_duty_fraction(-0.5).unwrap();
        assert_eq!(bus.duties(), vec![1.0, 0.0]);
        assert_eq!(MockPwm::broken().set_duty_fraction(0.5), Err(()));
    }

    #[test]
    fn mock_delay_records() {
        let bus = MockBus::new();
        let mut delay = bus.delay();
        delay.delay_us(7);
        delay.delay_ms(1);
        assert_eq!(bus.delays(), vec![7, 1_000]);
    }

    #[test]
    fn decode_bytes_from_clock_edges() {
        let bus = MockBus::new();
        let mut clock = bus.line(LineId::Clock);
        let mut data = bus.line(LineId::Data);

        for bit in [true, true, false, false, true, false, true, false] {
            data.set(bit).unwrap();
            clock.set_high().unwrap();
            clock.set_low().unwrap();
        }
        // Partial byte is dropped
        clock.set_high().unwrap();

        assert_eq!(bus.shifted_bytes(), vec![0b1100_1010]);
    }

    #[test]
    fn repeated_high_is_not_an_edge() {
        let bus = MockBus::new();
        let mut latch = bus.line(LineId::Latch);
        latch.set_high().unwrap();
        latch.set_high().unwrap();
        latch.set_low().unwrap();
        latch.set_high().unwrap();
        assert_eq!(bus.latch_pulses(), 2);
    }

    #[test]
    fn clear_keeps_levels_for_decoding() {
        let bus = MockBus::new();
        let mut latch = bus.line(LineId::Latch);
        latch.set_high().unwrap();
        bus.clear();

        // Already high: not a new edge
        latch.set_high().unwrap();
        assert_eq!(bus.latch_pulses(), 0);
        assert_eq!(bus.level(LineId::Latch), Some(true));
    }

    #[test]
    fn frames_split_at_latch() {
        let bus = MockBus::new();
        let mut link = bus.link(ShiftTiming::default());
        link.shift_byte(0xAA).unwrap();
        link.latch().unwrap();
        link.shift_bytes(&[0x01, 0x02]).unwrap();
        link.latch().unwrap();
        link.shift_byte(0xFF).unwrap();

        assert_eq!(bus.frames(), vec![vec![0xAA], vec![0x01, 0x02]]);
        assert_eq!(bus.shifted_bytes(), vec![0xAA, 0x01, 0x02, 0xFF]);
    }

    #[test]
    fn cloned_bus_shares_log() {
        let bus = MockBus::new();
        let other = bus.clone();
        bus.line(LineId::Enable).set_high().unwrap();
        assert_eq!(other.level(LineId::Enable), Some(true));
    }

    #[test]
    fn display_without_pwm_helper() {
        let bus = MockBus::new();
        let display = bus.display_without_pwm(&Config::default()).unwrap();
        assert!(!display.brightness().is_dimmable());
        assert_eq!(bus.level(LineId::Enable), Some(true));
    }
}
