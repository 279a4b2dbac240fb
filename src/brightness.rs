//! Chain-wide brightness on the shared OUT_EN line.
//!
//! Every module in the chain has its output-enable tied to the same line, so
//! brightness is a property of the whole chain. When the pin supports PWM the
//! level maps linearly onto the duty cycle; when it does not, the line is
//! held high and brightness requests are ignored.

use core::convert::Infallible;
use core::fmt::Debug;

use crate::traits::{OutputLine, PwmOutput};

/// Which hardware drives OUT_EN. Chosen once, at construction.
#[derive(Debug)]
pub enum BrightnessBackend<P, L> {
    /// PWM channel; brightness is adjustable.
    Pwm(P),
    /// Plain output held high; display always at full brightness.
    AlwaysOn(L),
}

/// Placeholder PWM type for boards that never have one.
///
/// `BrightnessController<NoPwm, L>` can only be built with
/// [`BrightnessController::always_on`].
#[derive(Debug)]
pub enum NoPwm {}

impl PwmOutput for NoPwm {
    type Error = Infallible;

    fn set_duty_fraction(&mut self, _fraction: f32) -> Result<(), Infallible> {
        match *self {}
    }
}

/// Owner of the OUT_EN line.
///
/// # Example
///
/// ```rust
/// use easy_nixie::BrightnessController;
/// use easy_nixie::hal::{LineId, MockBus, PwmUnavailable};
///
/// let bus = MockBus::new();
///
/// // PWM available: duty follows the level
/// let mut brightness = BrightnessController::acquire(
///     Ok::<_, PwmUnavailable>(bus.pwm()),
///     || Ok(bus.line(LineId::Enable)),
///     255,
/// )
/// .unwrap();
/// brightness.set_brightness(0);
/// assert_eq!(bus.duties(), vec![1.0, 0.0]);
///
/// // PWM missing: line pinned high, requests ignored
/// let bus = MockBus::new();
/// let mut brightness = BrightnessController::acquire(
///     Err::<easy_nixie::hal::MockPwm, _>(PwmUnavailable),
///     || Ok(bus.line(LineId::Enable)),
///     255,
/// )
/// .unwrap();
/// brightness.set_brightness(10);
/// assert!(!brightness.is_dimmable());
/// assert_eq!(bus.level(LineId::Enable), Some(true));
/// ```
#[derive(Debug)]
pub struct BrightnessController<P: PwmOutput, L: OutputLine> {
    backend: BrightnessBackend<P, L>,
    level: Option<u8>,
    ignored: u32,
}

impl<P, L> BrightnessController<P, L>
where
    P: PwmOutput,
    P::Error: Debug,
    L: OutputLine,
{
    /// Uses the PWM channel if it was acquired, otherwise falls back to a
    /// plain output held high.
    ///
    /// `pwm` is the outcome of trying to set up PWM on the OUT_EN pin.
    /// `fallback` is only called when that failed (or the channel rejects
    /// `initial_level`) and must hand back the same pin as a digital output.
    ///
    /// # Errors
    ///
    /// Returns the line error if the fallback output cannot be created or
    /// driven high. A missing PWM channel alone is never an error.
    pub fn acquire<E, F>(pwm: Result<P, E>, fallback: F, initial_level: u8) -> Result<Self, L::Error>
    where
        E: Debug,
        F: FnOnce() -> Result<L, L::Error>,
    {
        match pwm {
            Ok(mut channel) => match channel.set_duty_fraction(level_to_fraction(initial_level)) {
                Ok(()) => {
                    log::info!("OUT_EN: PWM dimming enabled (level {})", initial_level);
                    Ok(Self {
                        backend: BrightnessBackend::Pwm(channel),
                        level: Some(initial_level),
                        ignored: 0,
                    })
                }
                Err(e) => {
                    log::warn!("OUT_EN: PWM channel rejected initial duty: {:?}", e);
                    drop(channel);
                    Self::always_on(fallback()?)
                }
            },
            Err(e) => {
                log::warn!("OUT_EN: PWM setup failed: {:?}", e);
                Self::always_on(fallback()?)
            }
        }
    }

    /// Drives OUT_EN from a PWM channel at `initial_level`.
    ///
    /// Unlike [`acquire`](Self::acquire) there is no fallback: a failing
    /// initial duty write is returned.
    pub fn pwm(mut channel: P, initial_level: u8) -> Result<Self, P::Error> {
        channel.set_duty_fraction(level_to_fraction(initial_level))?;
        Ok(Self {
            backend: BrightnessBackend::Pwm(channel),
            level: Some(initial_level),
            ignored: 0,
        })
    }

    /// Holds OUT_EN permanently high. Brightness control is unavailable.
    pub fn always_on(mut line: L) -> Result<Self, L::Error> {
        line.set_high()?;
        log::warn!("OUT_EN: falling back to digital output (always on)");
        Ok(Self {
            backend: BrightnessBackend::AlwaysOn(line),
            level: None,
            ignored: 0,
        })
    }

    /// Applies `level` (0 = off, 255 = full) to the whole chain.
    ///
    /// Best effort: never fails. Without PWM the request is counted and
    /// logged, and the line stays high.
    pub fn set_brightness(&mut self, level: u8) {
        match &mut self.backend {
            BrightnessBackend::Pwm(channel) => {
                match channel.set_duty_fraction(level_to_fraction(level)) {
                    Ok(()) => self.level = Some(level),
                    Err(e) => log::warn!("OUT_EN: duty write for level {} failed: {:?}", level, e),
                }
            }
            BrightnessBackend::AlwaysOn(_) => {
                self.ignored = self.ignored.saturating_add(1);
                if level > 0 {
                    log::debug!("OUT_EN: brightness {} requested but PWM not available", level);
                }
            }
        }
    }

    /// Returns true if the PWM backend is active.
    #[inline]
    pub fn is_dimmable(&self) -> bool {
        matches!(self.backend, BrightnessBackend::Pwm(_))
    }

    /// Last level written to the PWM channel, `None` without PWM.
    #[inline]
    pub fn level(&self) -> Option<u8> {
        self.level
    }

    /// Number of requests dropped because PWM is not available.
    #[inline]
    pub fn ignored_requests(&self) -> u32 {
        self.ignored
    }

    /// Returns the active backend.
    pub fn backend(&self) -> &BrightnessBackend<P, L> {
        &self.backend
    }
}

/// Maps 0..=255 linearly onto 0.0..=1.0.
#[inline]
pub fn level_to_fraction(level: u8) -> f32 {
    level as f32 / u8::MAX as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{LineId, MockBus, MockLine, MockPwm, PwmUnavailable};

    fn pwm_controller(bus: &MockBus) -> BrightnessController<MockPwm, MockLine> {
        BrightnessController::acquire(
            Ok::<_, PwmUnavailable>(bus.pwm()),
            || Ok(bus.line(LineId::Enable)),
            255,
        )
        .unwrap()
    }

    fn fallback_controller(bus: &MockBus) -> BrightnessController<MockPwm, MockLine> {
        BrightnessController::acquire(
            Err::<MockPwm, _>(PwmUnavailable),
            || Ok(bus.line(LineId::Enable)),
            255,
        )
        .unwrap()
    }

    #[test]
    fn level_mapping_endpoints() {
        assert_eq!(level_to_fraction(0), 0.0);
        assert_eq!(level_to_fraction(255), 1.0);
        assert!((level_to_fraction(128) - 0.502).abs() < 0.001);
    }

    #[test]
    fn acquire_pwm_starts_at_initial_level() {
        let bus = MockBus::new();
        let brightness = pwm_controller(&bus);
        assert!(brightness.is_dimmable());
        assert_eq!(brightness.level(), Some(255));
        assert_eq!(bus.duties(), vec![1.0]);
        // Enable line never touched as a digital output
        assert_eq!(bus.level(LineId::Enable), None);
    }

    #[test]
    fn pwm_set_brightness_maps_linearly() {
        let bus = MockBus::new();
        let mut brightness = pwm_controller(&bus);
        bus.clear();

        brightness.set_brightness(0);
        brightness.set_brightness(51);
        brightness.set_brightness(255);

        assert_eq!(bus.duties(), vec![0.0, 0.2, 1.0]);
        assert_eq!(brightness.level(), Some(255));
        assert_eq!(brightness.ignored_requests(), 0);
    }

    #[test]
    fn fallback_holds_line_high() {
        let bus = MockBus::new();
        let brightness = fallback_controller(&bus);
        assert!(!brightness.is_dimmable());
        assert_eq!(brightness.level(), None);
        assert_eq!(bus.level(LineId::Enable), Some(true));
        assert!(matches!(
            brightness.backend(),
            BrightnessBackend::AlwaysOn(_)
        ));
    }

    #[test]
    fn fallback_ignores_every_level() {
        let bus = MockBus::new();
        let mut brightness = fallback_controller(&bus);
        bus.clear();

        for level in [0u8, 1, 128, 255] {
            brightness.set_brightness(level);
        }

        assert!(bus.events().is_empty());
        assert!(bus.duties().is_empty());
        assert_eq!(bus.level(LineId::Enable), Some(true));
        assert_eq!(brightness.ignored_requests(), 4);
    }

    #[test]
    fn rejected_initial_duty_falls_back() {
        let bus = MockBus::new();
        let brightness = BrightnessController::acquire(
            Ok::<_, PwmUnavailable>(MockPwm::broken()),
            || Ok(bus.line(LineId::Enable)),
            255,
        )
        .unwrap();
        assert!(!brightness.is_dimmable());
        assert_eq!(bus.level(LineId::Enable), Some(true));
    }

    #[test]
    fn fallback_line_failure_is_fatal() {
        let result = BrightnessController::<MockPwm, MockLine>::acquire(
            Err::<MockPwm, _>(PwmUnavailable),
            || Ok(MockLine::broken(LineId::Enable)),
            255,
        );
        assert!(result.is_err());
    }

    #[test]
    fn fallback_not_called_when_pwm_available() {
        let bus = MockBus::new();
        let mut called = false;
        let _brightness = BrightnessController::acquire(
            Ok::<_, PwmUnavailable>(bus.pwm()),
            || {
                called = true;
                Ok(bus.line(LineId::Enable))
            },
            128,
        )
        .unwrap();
        assert!(!called);
    }

    #[test]
    fn explicit_pwm_constructor() {
        let bus = MockBus::new();
        let brightness = BrightnessController::<MockPwm, MockLine>::pwm(bus.pwm(), 0).unwrap();
        assert_eq!(brightness.level(), Some(0));
        assert_eq!(bus.duties(), vec![0.0]);

        assert!(BrightnessController::<MockPwm, MockLine>::pwm(MockPwm::broken(), 0).is_err());
    }

    #[test]
    fn no_pwm_always_on() {
        let bus = MockBus::new();
        let mut brightness =
            BrightnessController::<NoPwm, MockLine>::always_on(bus.line(LineId::Enable)).unwrap();
        brightness.set_brightness(99);
        assert_eq!(brightness.ignored_requests(), 1);
    }
}
