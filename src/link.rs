//! Bit-banged serial link to the chain's shift registers.
//!
//! Three lines drive the cascaded 74HC595-style registers on every module:
//!
//! - **SHCP** (clock): data is sampled on the rising edge
//! - **DSIN** (data): bit presented before each clock pulse
//! - **STCP** (latch): storage registers capture on the rising edge
//!
//! Bytes go out MSB first. Shifting only moves data through the shift
//! registers; nothing changes on the tubes until [`SerialLink::latch`].

use crate::config::ShiftTiming;
use crate::traits::{Delay, OutputLine};

/// Owner of the clock, data and latch lines.
///
/// # Example
///
/// ```rust
/// use easy_nixie::{SerialLink, config::ShiftTiming};
/// use easy_nixie::hal::{LineId, MockBus};
///
/// let bus = MockBus::new();
/// let mut link = SerialLink::new(
///     bus.line(LineId::Clock),
///     bus.line(LineId::Data),
///     bus.line(LineId::Latch),
///     bus.delay(),
///     ShiftTiming::default(),
/// )
/// .unwrap();
///
/// link.shift_byte(0b1010_0001).unwrap();
/// link.latch().unwrap();
///
/// assert_eq!(bus.shifted_bytes(), vec![0b1010_0001]);
/// assert_eq!(bus.level(LineId::Latch), Some(true)); // idles high
/// ```
pub struct SerialLink<L: OutputLine, D: Delay> {
    clock: L,
    data: L,
    latch: L,
    delay: D,
    timing: ShiftTiming,
}

impl<L: OutputLine, D: Delay> SerialLink<L, D> {
    /// Takes ownership of the lines and drives all three low.
    ///
    /// Zero delays in `timing` are raised to 1 µs.
    ///
    /// # Errors
    ///
    /// Returns the line error if any line cannot be driven. This is the only
    /// point where a line failure is expected.
    pub fn new(
        mut clock: L,
        mut data: L,
        mut latch: L,
        delay: D,
        timing: ShiftTiming,
    ) -> Result<Self, L::Error> {
        clock.set_low()?;
        latch.set_low()?;
        data.set_low()?;

        Ok(Self {
            clock,
            data,
            latch,
            delay,
            timing: timing.normalized(),
        })
    }

    /// Shifts one byte, most significant bit first.
    ///
    /// Per bit: present data, wait, clock high, wait, clock low, wait.
    pub fn shift_byte(&mut self, value: u8) -> Result<(), L::Error> {
        let hold = self.timing.bit_delay_us;
        for bit in (0..8).rev() {
            self.data.set(value & (1 << bit) != 0)?;
            self.delay.delay_us(hold);
            self.clock.set_high()?;
            self.delay.delay_us(hold);
            self.clock.set_low()?;
            self.delay.delay_us(hold);
        }
        Ok(())
    }

    /// Shifts a sequence of bytes in order.
    pub fn shift_bytes(&mut self, bytes: &[u8]) -> Result<(), L::Error> {
        for &byte in bytes {
            self.shift_byte(byte)?;
        }
        Ok(())
    }

    /// Copies the shift registers to the outputs.
    ///
    /// Drives STCP low, waits the settling delay, then drives it high and
    /// leaves it there. The idle state of the latch line is high.
    pub fn latch(&mut self) -> Result<(), L::Error> {
        self.latch.set_low()?;
        self.delay.delay_us(self.timing.latch_delay_us);
        self.latch.set_high()
    }

    /// Returns the link timing.
    #[inline]
    pub fn timing(&self) -> ShiftTiming {
        self.timing
    }

    /// Blocks on the link's delay source.
    ///
    /// Lets frame pacing share the delay the link already owns.
    pub fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{BusEvent, LineId, MockBus, MockDelay, MockLine};

    fn link(bus: &MockBus) -> SerialLink<MockLine, MockDelay> {
        SerialLink::new(
            bus.line(LineId::Clock),
            bus.line(LineId::Data),
            bus.line(LineId::Latch),
            bus.delay(),
            ShiftTiming::default(),
        )
        .unwrap()
    }

    #[test]
    fn new_drives_lines_low() {
        let bus = MockBus::new();
        let _link = link(&bus);
        assert_eq!(bus.level(LineId::Clock), Some(false));
        assert_eq!(bus.level(LineId::Data), Some(false));
        assert_eq!(bus.level(LineId::Latch), Some(false));
    }

    #[test]
    fn new_fails_on_broken_line() {
        let bus = MockBus::new();
        let result = SerialLink::new(
            bus.line(LineId::Clock),
            bus.line(LineId::Data),
            MockLine::broken(LineId::Latch),
            bus.delay(),
            ShiftTiming::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn shift_byte_msb_first() {
        let bus = MockBus::new();
        let mut link = link(&bus);
        bus.clear();

        link.shift_byte(0b1000_0001).unwrap();

        let data_levels: Vec<bool> = bus
            .events()
            .into_iter()
            .filter_map(|e| match e {
                BusEvent::Level {
                    line: LineId::Data,
                    high,
                } => Some(high),
                _ => None,
            })
            .collect();
        assert_eq!(
            data_levels,
            vec![true, false, false, false, false, false, false, true]
        );
        assert_eq!(bus.shifted_bytes(), vec![0b1000_0001]);
    }

    #[test]
    fn shift_byte_timing_sequence() {
        let bus = MockBus::new();
        let mut link = link(&bus);
        bus.clear();

        link.shift_byte(0xFF).unwrap();

        let events = bus.events();
        // 8 bits * (data, delay, clock high, delay, clock low, delay)
        assert_eq!(events.len(), 48);
        assert_eq!(
            &events[..6],
            &[
                BusEvent::Level {
                    line: LineId::Data,
                    high: true
                },
                BusEvent::DelayUs(1),
                BusEvent::Level {
                    line: LineId::Clock,
                    high: true
                },
                BusEvent::DelayUs(1),
                BusEvent::Level {
                    line: LineId::Clock,
                    high: false
                },
                BusEvent::DelayUs(1),
            ]
        );
        assert_eq!(bus.level(LineId::Clock), Some(false));
    }

    #[test]
    fn shift_bytes_preserves_order() {
        let bus = MockBus::new();
        let mut link = link(&bus);
        link.shift_bytes(&[0x12, 0x34, 0x56]).unwrap();
        assert_eq!(bus.shifted_bytes(), vec![0x12, 0x34, 0x56]);
    }

    #[test]
    fn latch_leaves_line_high() {
        let bus = MockBus::new();
        let mut link = link(&bus);
        bus.clear();

        link.latch().unwrap();

        assert_eq!(
            bus.events(),
            vec![
                BusEvent::Level {
                    line: LineId::Latch,
                    high: false
                },
                BusEvent::DelayUs(1_000),
                BusEvent::Level {
                    line: LineId::Latch,
                    high: true
                },
            ]
        );
        assert_eq!(bus.level(LineId::Latch), Some(true));
        assert_eq!(bus.latch_pulses(), 1);
    }

    #[test]
    fn custom_timing_is_used() {
        let bus = MockBus::new();
        let timing = ShiftTiming::default()
            .with_bit_delay_us(3)
            .with_latch_delay_us(50);
        let mut link = SerialLink::new(
            bus.line(LineId::Clock),
            bus.line(LineId::Data),
            bus.line(LineId::Latch),
            bus.delay(),
            timing,
        )
        .unwrap();
        bus.clear();

        link.shift_byte(0).unwrap();
        link.latch().unwrap();

        let delays = bus.delays();
        assert_eq!(delays.len(), 25);
        assert!(delays[..24].iter().all(|&us| us == 3));
        assert_eq!(delays[24], 50);
        assert_eq!(link.timing(), timing);
    }

    #[test]
    fn zero_timing_is_raised_to_minimum() {
        let bus = MockBus::new();
        let mut link = SerialLink::new(
            bus.line(LineId::Clock),
            bus.line(LineId::Data),
            bus.line(LineId::Latch),
            bus.delay(),
            ShiftTiming {
                bit_delay_us: 0,
                latch_delay_us: 0,
            },
        )
        .unwrap();
        bus.clear();

        link.shift_bytes(&[0b0010_0000, 0]).unwrap();
        link.latch().unwrap();

        let delays = bus.delays();
        assert_eq!(delays.len(), 49);
        assert!(delays.iter().all(|&us| us >= 1));
        assert_eq!(link.timing().bit_delay_us, 1);
        assert_eq!(link.timing().latch_delay_us, 1);
    }

    #[test]
    fn pause_uses_link_delay() {
        let bus = MockBus::new();
        let mut link = link(&bus);
        bus.clear();
        link.pause_ms(2);
        assert_eq!(bus.delays(), vec![1_000, 1_000]);
    }
}
