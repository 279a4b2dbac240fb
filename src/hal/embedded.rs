//! Adapters from `embedded-hal` 1.0 traits to the driver's hardware traits.
//!
//! Any board support crate that implements `embedded-hal` can drive the
//! chain through these wrappers:
//!
//! | Wrapper | Wraps | Implements |
//! |---------|-------|------------|
//! | [`HalLine`] | `digital::OutputPin` | [`OutputLine`] |
//! | [`HalPwm`] | `pwm::SetDutyCycle` | [`PwmOutput`] |
//! | [`HalDelay`] | `delay::DelayNs` | [`Delay`] |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::traits::{Delay, OutputLine, PwmOutput};

/// [`OutputLine`] over an `embedded-hal` output pin.
#[derive(Debug)]
pub struct HalLine<P>(P);

impl<P: OutputPin> HalLine<P> {
    /// Wraps `pin`.
    pub fn new(pin: P) -> Self {
        Self(pin)
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: OutputPin> OutputLine for HalLine<P> {
    type Error = P::Error;

    #[inline]
    fn set(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.0.set_high()
        } else {
            self.0.set_low()
        }
    }
}

/// [`PwmOutput`] over an `embedded-hal` duty-cycle channel.
///
/// The fraction is scaled to the channel's `max_duty_cycle()` and rounded
/// to the nearest step.
#[derive(Debug)]
pub struct HalPwm<P>(P);

impl<P: SetDutyCycle> HalPwm<P> {
    /// Wraps `channel`.
    pub fn new(channel: P) -> Self {
        Self(channel)
    }

    /// Returns the wrapped channel.
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: SetDutyCycle> PwmOutput for HalPwm<P> {
    type Error = P::Error;

    fn set_duty_fraction(&mut self, fraction: f32) -> Result<(), Self::Error> {
        let max = self.0.max_duty_cycle();
        let duty = fraction.clamp(0.0, 1.0) * max as f32 + 0.5;
        self.0.set_duty_cycle((duty as u16).min(max))
    }
}

/// [`Delay`] over an `embedded-hal` delay provider.
#[derive(Debug)]
pub struct HalDelay<D>(D);

impl<D: DelayNs> HalDelay<D> {
    /// Wraps `delay`.
    pub fn new(delay: D) -> Self {
        Self(delay)
    }
}

impl<D: DelayNs> Delay for HalDelay<D> {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}
