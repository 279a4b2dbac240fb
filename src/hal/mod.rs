//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Recording bus for tests and desktop development
//! - `embedded`: Adapters over `embedded-hal` 1.0 traits (requires `embedded-hal` feature)
//! - `esp32`: ESP32 GPIO and LEDC wiring for an EasyNixie chain (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "embedded-hal")]
pub mod embedded;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "embedded-hal")]
pub use embedded::*;
