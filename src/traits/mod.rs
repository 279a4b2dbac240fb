//! Trait definitions for hardware abstraction.
//!
//! This module defines the collaborator interfaces that allow easy-nixie to:
//! - Run on different hardware (ESP32, any `embedded-hal` board, desktop mock)
//! - Be tested bit-for-bit without a tube attached
//!
//! # Hardware Abstraction
//!
//! - [`OutputLine`]: Clock, data and latch lines (and the non-PWM enable fallback)
//! - [`PwmOutput`]: Duty cycle on the shared OUT_EN line
//! - [`Delay`]: Setup/hold timing between line transitions

pub mod hardware;

pub use hardware::*;
