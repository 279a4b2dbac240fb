//! Error types.
//!
//! Hardware failures are only fatal while the driver is being built. After
//! that, the staging setters can report [`InputError`] under
//! [`InputPolicy::Strict`](crate::config::InputPolicy::Strict) and never
//! touch hardware.

use core::fmt;

/// Caller input the chain cannot represent.
///
/// Under the default best-effort policy these are absorbed (index ignored,
/// extra digits dropped, sign discarded) and never returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputError {
    /// Tube index is not in `0..num_tubes`.
    TubeOutOfRange {
        /// Requested index.
        index: usize,
        /// Chain length.
        num_tubes: usize,
    },
    /// Number has more decimal digits than there are tubes.
    DigitOverflow {
        /// Digits needed.
        digits: usize,
        /// Chain length.
        num_tubes: usize,
    },
    /// Negative numbers have no sign cathode.
    NegativeNumber(i64),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::TubeOutOfRange { index, num_tubes } => {
                write!(f, "tube index {} out of range (chain has {})", index, num_tubes)
            }
            InputError::DigitOverflow { digits, num_tubes } => {
                write!(f, "{} digits do not fit on {} tubes", digits, num_tubes)
            }
            InputError::NegativeNumber(value) => write!(f, "cannot display negative number {}", value),
        }
    }
}

/// Errors returned by the driver.
///
/// `E` is the error type of the control lines ([`OutputLine::Error`]).
///
/// [`OutputLine::Error`]: crate::traits::OutputLine::Error
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// A clock, data or latch line could not be driven.
    Line(E),
    /// Chain length must be between 1 and [`MAX_TUBES`](crate::config::MAX_TUBES).
    InvalidChainLength {
        /// Requested chain length.
        requested: usize,
        /// Largest supported chain.
        max: usize,
    },
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Line(e) => write!(f, "control line error: {:?}", e),
            Error::InvalidChainLength { requested, max } => {
                write!(f, "chain length {} not in 1..={}", requested, max)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InputError {}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
