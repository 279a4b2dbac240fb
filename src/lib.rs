//! # easy-nixie
//!
//! Driver for chains of EasyNixie IN-12 tube modules: daisy-chained shift
//! registers fed over three bit-banged lines, with one shared output-enable
//! line for brightness.
//!
//! ## Features
//!
//! - **Wire encoding**: digit, backlight color, high-voltage and comma packed
//!   into the two bytes each module expects
//! - **Buffered updates**: stage any number of tubes, then render the whole
//!   chain with a single latch
//! - **Number layout**: right-aligned integers with optional leading zeros
//! - **Brightness**: PWM on OUT_EN when available, always-on fallback otherwise
//! - **Input policy**: silently absorb bad input (default) or reject it
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Line, PWM and delay abstractions
//! - `encoding` - Per-tube state and its two-byte wire form
//! - `link` - Serial shifting and latching
//! - `brightness` - OUT_EN ownership and PWM fallback
//! - `display` - Tube buffer and chain rendering
//! - `patterns` - Self-test and counter sequences
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use easy_nixie::{Color, Digit};
//! use easy_nixie::config::{ChainConfig, Config};
//! use easy_nixie::hal::MockBus;
//!
//! // Two tubes on a recording bus
//! let bus = MockBus::new();
//! let config = Config::default().with_chain(ChainConfig::default().with_num_tubes(2));
//! let mut display = bus.display(&config).unwrap();
//!
//! // Stage "07" in green at half brightness, then push it out
//! display.set_number(7, Color::Green, true, 128).unwrap();
//! display.render().unwrap();
//!
//! assert_eq!(display.tube(0).unwrap().digit, Digit::from(0));
//! assert_eq!(bus.latch_pulses(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Brightness control on the shared OUT_EN line.
pub mod brightness;
/// Construction-time configuration.
pub mod config;
/// Display state manager owning the tube buffer.
pub mod display;
/// Tube state and its two-byte wire encoding.
pub mod encoding;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Bit-banged serial link to the shift registers.
pub mod link;
/// Self-test and demo sequences.
pub mod patterns;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use brightness::{BrightnessBackend, BrightnessController, NoPwm};
pub use display::NixieDisplay;
pub use encoding::{ChainLink, Color, Digit, TubeState};
pub use error::{Error, InputError};
pub use link::SerialLink;
pub use traits::{Delay, OutputLine, PwmOutput};

// Config re-exports
pub use config::{BrightnessConfig, ChainConfig, Config, InputPolicy, ShiftTiming, MAX_TUBES};
