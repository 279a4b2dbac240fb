//! Display state manager: tube buffer, encoding and chain updates.
//!
//! This module provides [`NixieDisplay`], which owns the serial link, the
//! brightness controller and one [`TubeState`] per module in the chain.
//!
//! # Overview
//!
//! Setters only stage state in memory. Nothing reaches the tubes until
//! [`render`](NixieDisplay::render), which shifts every tube's two bytes
//! (furthest tube first) and then latches once, so the whole chain changes
//! in the same instant.
//!
//! # Tube Order
//!
//! Index 0 is the module wired directly to the controller. Its data is
//! shifted last. [`set_number`](NixieDisplay::set_number) puts the most
//! significant digit at index 0 and the least significant at the highest
//! index.
//!
//! # Example
//!
//! ```rust
//! use easy_nixie::{Color, Digit, NixieDisplay};
//! use easy_nixie::config::Config;
//! use easy_nixie::hal::MockBus;
//!
//! let bus = MockBus::new();
//! let mut display = bus
//!     .display(&Config::default().with_chain(
//!         easy_nixie::config::ChainConfig::default().with_num_tubes(2),
//!     ))
//!     .unwrap();
//!
//! display.set_number(42, Color::Green, false, 255).unwrap();
//! assert_eq!(display.tube(0).unwrap().digit, Digit::from(4));
//! assert_eq!(display.tube(1).unwrap().digit, Digit::from(2));
//!
//! display.render().unwrap();
//! assert!(display.is_committed());
//! ```

use core::fmt::Debug;

use heapless::Vec;

use crate::brightness::BrightnessController;
use crate::config::{ChainConfig, InputPolicy, MAX_TUBES};
use crate::encoding::{Color, Digit, TubeState};
use crate::error::{Error, InputError};
use crate::link::SerialLink;
use crate::traits::{Delay, OutputLine, PwmOutput};

/// Decimal digits in `u64::MAX`.
const MAX_DIGITS: usize = 20;

/// Buffered state for a fixed-length chain of tubes.
///
/// # Type Parameters
///
/// - `L`: control line type ([`OutputLine`]), shared by clock, data, latch
///   and the non-PWM enable fallback
/// - `P`: PWM channel for OUT_EN ([`PwmOutput`])
/// - `D`: delay source ([`Delay`])
///
/// # Thread Safety
///
/// The display owns its lines exclusively and is not thread-safe. In a
/// multi-threaded host, wrap it in `Arc<Mutex<NixieDisplay<..>>>` so a whole
/// `render()` runs under one lock.
pub struct NixieDisplay<L, P, D>
where
    L: OutputLine,
    P: PwmOutput,
    D: Delay,
{
    link: SerialLink<L, D>,
    brightness: BrightnessController<P, L>,
    tubes: Vec<TubeState, MAX_TUBES>,
    policy: InputPolicy,
    committed: bool,
}

impl<L, P, D> NixieDisplay<L, P, D>
where
    L: OutputLine,
    P: PwmOutput,
    P::Error: Debug,
    D: Delay,
{
    /// Creates a display with every tube at its default state.
    ///
    /// Nothing is rendered; call [`clear`](Self::clear) or
    /// [`render`](Self::render) to bring the hardware in line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChainLength`] unless
    /// `1 <= chain.num_tubes <= MAX_TUBES`.
    pub fn new(
        chain: &ChainConfig,
        link: SerialLink<L, D>,
        brightness: BrightnessController<P, L>,
    ) -> Result<Self, Error<L::Error>> {
        if chain.num_tubes == 0 || chain.num_tubes > MAX_TUBES {
            return Err(Error::InvalidChainLength {
                requested: chain.num_tubes,
                max: MAX_TUBES,
            });
        }

        let mut tubes = Vec::new();
        for _ in 0..chain.num_tubes {
            // Capacity checked above
            let _ = tubes.push(TubeState::default());
        }

        Ok(Self {
            link,
            brightness,
            tubes,
            policy: chain.policy,
            committed: false,
        })
    }

    // =========================================================================
    // Staging
    // =========================================================================

    /// Stages the full state of one tube.
    ///
    /// Under [`InputPolicy::BestEffort`] an out-of-range `index` is ignored
    /// and `Ok(())` is returned. Under [`InputPolicy::Strict`] it is reported
    /// as [`InputError::TubeOutOfRange`].
    pub fn set_tube(
        &mut self,
        index: usize,
        digit: Digit,
        color: Color,
        voltage: bool,
        comma: bool,
        brightness: u8,
    ) -> Result<(), InputError> {
        self.set_tube_state(
            index,
            TubeState {
                digit,
                color,
                voltage,
                comma,
                brightness,
            },
        )
    }

    /// Stages a prepared [`TubeState`] at `index`. Same policy as
    /// [`set_tube`](Self::set_tube).
    pub fn set_tube_state(&mut self, index: usize, state: TubeState) -> Result<(), InputError> {
        let num_tubes = self.tubes.len();
        match self.tubes.get_mut(index) {
            Some(tube) => {
                *tube = state;
                self.committed = false;
                Ok(())
            }
            None => self.absorb(InputError::TubeOutOfRange { index, num_tubes }),
        }
    }

    /// Stages `value` across the chain, right-aligned.
    ///
    /// Every tube is first reset to blank in `color` at `brightness` (voltage
    /// on, no comma). Digits are then written from the highest index down;
    /// digits that do not fit are dropped from the most significant end.
    /// With `leading_zeros`, tubes left of the number show `0`.
    ///
    /// Negative values show their magnitude. Under [`InputPolicy::Strict`],
    /// a negative value or a number wider than the chain is rejected and the
    /// buffer is left as it was.
    pub fn set_number(
        &mut self,
        value: i64,
        color: Color,
        leading_zeros: bool,
        brightness: u8,
    ) -> Result<(), InputError> {
        let digits = decimal_digits(value.unsigned_abs());
        let num_tubes = self.tubes.len();

        if self.policy == InputPolicy::Strict {
            if value < 0 {
                return Err(InputError::NegativeNumber(value));
            }
            if digits.len() > num_tubes {
                return Err(InputError::DigitOverflow {
                    digits: digits.len(),
                    num_tubes,
                });
            }
        } else if digits.len() > num_tubes {
            log::debug!(
                "set_number({}): dropping {} leading digit(s)",
                value,
                digits.len() - num_tubes
            );
        }

        let blank = TubeState {
            digit: Digit::BLANK,
            color,
            voltage: true,
            comma: false,
            brightness,
        };
        for tube in self.tubes.iter_mut() {
            *tube = blank;
        }

        // digits[0] is the least significant
        for (i, &d) in digits.iter().take(num_tubes).enumerate() {
            self.tubes[num_tubes - 1 - i].digit = Digit::from(d);
        }

        if leading_zeros {
            let padding = num_tubes.saturating_sub(digits.len());
            for tube in self.tubes.iter_mut().take(padding) {
                if tube.digit.is_blank() {
                    tube.digit = Digit::from(0);
                }
            }
        }

        self.committed = false;
        Ok(())
    }

    /// Stages the same brightness on every tube.
    ///
    /// The chain has a single OUT_EN line, so this is the way to get a
    /// predictable brightness after [`render`](Self::render).
    pub fn set_brightness_all(&mut self, level: u8) {
        for tube in self.tubes.iter_mut() {
            tube.brightness = level;
        }
        self.committed = false;
    }

    /// Resets the buffer to defaults without rendering.
    pub fn reset(&mut self) {
        for tube in self.tubes.iter_mut() {
            *tube = TubeState::default();
        }
        self.committed = false;
    }

    // =========================================================================
    // Hardware
    // =========================================================================

    /// Shifts every tube's state out and latches once.
    ///
    /// Tubes go out from the highest index down to 0. Before each tube the
    /// OUT_EN duty is set to that tube's brightness, so tube 0's value is the
    /// one in effect afterwards. The displayed digits change only at the
    /// final latch.
    pub fn render(&mut self) -> Result<(), L::Error> {
        log::trace!("render: {} tube(s)", self.tubes.len());
        for tube in self.tubes.iter().rev() {
            self.brightness.set_brightness(tube.brightness);
            self.link.shift_bytes(&tube.encode().bytes())?;
        }
        self.link.latch()?;
        self.committed = true;
        Ok(())
    }

    /// Resets every tube to blank, white, voltage on, no comma, brightness 0
    /// and renders.
    pub fn clear(&mut self) -> Result<(), L::Error> {
        self.reset();
        self.render()
    }

    /// Applies `state`'s brightness and shifts its two bytes, without
    /// latching and without touching the buffer.
    ///
    /// For driving the chain directly; follow with [`latch`](Self::latch).
    /// Leaves the display in the staged state.
    pub fn push_tube(&mut self, state: &TubeState) -> Result<(), L::Error> {
        self.brightness.set_brightness(state.brightness);
        self.committed = false;
        self.link.shift_bytes(&state.encode().bytes())
    }

    /// Issues a single latch pulse.
    pub fn latch(&mut self) -> Result<(), L::Error> {
        self.link.latch()
    }

    /// Blocks for `ms` milliseconds on the link's delay source.
    pub fn pause_ms(&mut self, ms: u32) {
        self.link.pause_ms(ms);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Chain length fixed at construction.
    #[inline]
    pub fn num_tubes(&self) -> usize {
        self.tubes.len()
    }

    /// Buffered state of one tube.
    #[inline]
    pub fn tube(&self, index: usize) -> Option<&TubeState> {
        self.tubes.get(index)
    }

    /// Buffered state of every tube, index 0 first.
    #[inline]
    pub fn tubes(&self) -> &[TubeState] {
        &self.tubes
    }

    /// Input policy chosen at construction.
    #[inline]
    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    /// True if the buffer matches what the last [`render`](Self::render) sent.
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Brightness the whole chain will show after the next render.
    ///
    /// This is tube 0's stored level because it is shifted last.
    pub fn effective_brightness(&self) -> u8 {
        self.tubes.first().map_or(0, |tube| tube.brightness)
    }

    /// Returns the brightness controller.
    pub fn brightness(&self) -> &BrightnessController<P, L> {
        &self.brightness
    }

    fn absorb(&self, err: InputError) -> Result<(), InputError> {
        match self.policy {
            InputPolicy::Strict => Err(err),
            InputPolicy::BestEffort => {
                log::debug!("ignored: {}", err);
                Ok(())
            }
        }
    }
}

/// Base-10 digits of `value`, least significant first. Zero yields `[0]`.
fn decimal_digits(mut value: u64) -> Vec<u8, MAX_DIGITS> {
    let mut digits = Vec::new();
    loop {
        // At most 20 digits for any u64
        let _ = digits.push((value % 10) as u8);
        value /= 10;
        if value == 0 {
            break;
        }
    }
    digits
}
