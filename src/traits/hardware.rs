//! Hardware abstraction traits for the tube chain's control lines.
//!
//! These are the only points where the driver touches the outside world.
//! Everything above them (encoding, buffering, sequencing) is plain data
//! manipulation and runs unchanged on desktop and on the target.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`OutputLine`] | Push-pull digital output (clock, data, latch, fallback enable) |
//! | [`PwmOutput`] | PWM channel driving the shared OUT_EN line |
//! | [`Delay`] | Blocking microsecond delay for line setup/hold timing |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. Any `embedded-hal` 1.0 implementation can be
//! adapted with the wrappers in `hal::embedded` (requires `embedded-hal`
//! feature). `hal::esp32` implements them directly on esp-idf drivers.
//!
//! # Example
//!
//! ```rust
//! use easy_nixie::traits::OutputLine;
//! use easy_nixie::hal::{LineId, MockBus};
//!
//! let bus = MockBus::new();
//! let mut clock = bus.line(LineId::Clock);
//! clock.set_high().unwrap();
//! assert_eq!(bus.level(LineId::Clock), Some(true));
//! ```

/// A single digital output line.
///
/// Implement this for whatever drives SHCP, STCP and DSIN on your board.
/// Errors are only expected while the line is being configured; once a
/// driver has been constructed, writes are assumed to succeed.
pub trait OutputLine {
    /// Error type for line operations.
    type Error;

    /// Drive the line to `high` (true) or low (false).
    fn set(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Convenience method to drive the line high.
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }

    /// Convenience method to drive the line low.
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }
}

/// PWM channel trait.
///
/// Abstracts the duty cycle of a PWM-capable pin. The channel is acquired
/// once by the caller (frequency, timer, pin routing) and handed over in a
/// ready-to-use state; see [`BrightnessController`] for the fallback
/// behavior when acquisition fails.
///
/// [`BrightnessController`]: crate::BrightnessController
pub trait PwmOutput {
    /// Error type for PWM operations.
    type Error;

    /// Set duty cycle as a fraction in `0.0..=1.0`.
    ///
    /// Values outside this range should be clamped.
    fn set_duty_fraction(&mut self, fraction: f32) -> Result<(), Self::Error>;
}

/// Blocking delay trait.
///
/// Used between line transitions. On ESP32 this is a busy-wait on the ROM
/// `ets_delay_us`; the mock records every call.
pub trait Delay {
    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}
