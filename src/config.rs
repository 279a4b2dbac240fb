//! Construction-time configuration for the tube chain.
//!
//! Everything here is fixed once a [`NixieDisplay`](crate::NixieDisplay) is
//! built; there is no runtime reconfiguration of chain length or timing.
//!
//! # Example
//!
//! ```rust
//! use easy_nixie::config::{ChainConfig, Config, InputPolicy, ShiftTiming};
//!
//! // Use defaults (one tube, best-effort input handling)
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_chain(ChainConfig::default().with_num_tubes(4).with_policy(InputPolicy::Strict))
//!     .with_timing(ShiftTiming::default().with_bit_delay_us(2));
//! ```

/// Largest supported chain. Bounds the fixed-capacity tube buffer.
pub const MAX_TUBES: usize = 16;

// ============================================================================
// Main Config
// ============================================================================

/// Complete driver configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Chain length and input policy
    pub chain: ChainConfig,
    /// Serial link timing
    pub timing: ShiftTiming,
    /// OUT_EN brightness control
    pub brightness: BrightnessConfig,
}

impl Config {
    /// Set chain configuration
    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }

    /// Set link timing
    pub fn with_timing(mut self, timing: ShiftTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set brightness configuration
    pub fn with_brightness(mut self, brightness: BrightnessConfig) -> Self {
        self.brightness = brightness;
        self
    }
}

// ============================================================================
// Chain Config
// ============================================================================

/// How the staging setters treat input the chain cannot show.
///
/// # Default
///
/// Defaults to [`BestEffort`](Self::BestEffort).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputPolicy {
    /// Ignore out-of-range tube indices, drop digits that do not fit and
    /// show negative numbers by magnitude. Setters always succeed.
    #[default]
    BestEffort,
    /// Reject such input with an [`InputError`](crate::InputError) and
    /// leave the buffer unchanged.
    Strict,
}

/// Daisy chain configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainConfig {
    /// Number of daisy-chained modules (1 to [`MAX_TUBES`])
    pub num_tubes: usize,
    /// Input validation policy
    pub policy: InputPolicy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            num_tubes: 1,
            policy: InputPolicy::BestEffort,
        }
    }
}

impl ChainConfig {
    /// Set the chain length
    pub fn with_num_tubes(mut self, num_tubes: usize) -> Self {
        self.num_tubes = num_tubes;
        self
    }

    /// Set the input policy
    pub fn with_policy(mut self, policy: InputPolicy) -> Self {
        self.policy = policy;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Setup/hold delays on the serial link.
///
/// The exact values are not part of the protocol; they only have to respect
/// the shift register's timing. Both delays are kept at least 1 µs so clock
/// edges stay distinguishable: the builders clamp, and
/// [`SerialLink::new`](crate::SerialLink::new) normalizes values set
/// directly or deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftTiming {
    /// Delay after each data/clock transition while shifting, in microseconds
    pub bit_delay_us: u32,
    /// Latch-low hold before the rising edge, in microseconds
    pub latch_delay_us: u32,
}

impl Default for ShiftTiming {
    fn default() -> Self {
        Self {
            bit_delay_us: 1,
            latch_delay_us: 1_000,
        }
    }
}

impl ShiftTiming {
    /// Set the per-transition shift delay
    pub fn with_bit_delay_us(mut self, us: u32) -> Self {
        self.bit_delay_us = us.max(1);
        self
    }

    /// Set the latch settling delay
    pub fn with_latch_delay_us(mut self, us: u32) -> Self {
        self.latch_delay_us = us.max(1);
        self
    }

    /// Copy with both delays raised to at least 1 µs.
    pub fn normalized(self) -> Self {
        Self {
            bit_delay_us: self.bit_delay_us.max(1),
            latch_delay_us: self.latch_delay_us.max(1),
        }
    }

    /// Worst-case blocking time of one `render()` on a chain of `num_tubes`.
    ///
    /// Three delays per bit, sixteen bits per tube, plus one latch.
    pub fn render_time_us(&self, num_tubes: usize) -> u64 {
        let per_tube = 2 * 8 * 3 * self.bit_delay_us as u64;
        num_tubes as u64 * per_tube + self.latch_delay_us as u64
    }
}

// ============================================================================
// Brightness Config
// ============================================================================

/// OUT_EN PWM configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrightnessConfig {
    /// PWM frequency in Hz
    pub pwm_frequency_hz: u32,
    /// Level applied when the PWM channel is acquired (255 = fully on)
    pub initial_level: u8,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: 1_000,
            initial_level: 255,
        }
    }
}

impl BrightnessConfig {
    /// Set the PWM frequency
    pub fn with_pwm_frequency_hz(mut self, hz: u32) -> Self {
        self.pwm_frequency_hz = hz.max(1);
        self
    }

    /// Set the level applied at start-up
    pub fn with_initial_level(mut self, level: u8) -> Self {
        self.initial_level = level;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.chain.num_tubes, 1);
        assert_eq!(config.chain.policy, InputPolicy::BestEffort);
        assert_eq!(config.timing.bit_delay_us, 1);
        assert_eq!(config.timing.latch_delay_us, 1_000);
        assert_eq!(config.brightness.pwm_frequency_hz, 1_000);
        assert_eq!(config.brightness.initial_level, 255);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_chain(
                ChainConfig::default()
                    .with_num_tubes(6)
                    .with_policy(InputPolicy::Strict),
            )
            .with_timing(ShiftTiming::default().with_bit_delay_us(5))
            .with_brightness(BrightnessConfig::default().with_pwm_frequency_hz(500));

        assert_eq!(config.chain.num_tubes, 6);
        assert_eq!(config.chain.policy, InputPolicy::Strict);
        assert_eq!(config.timing.bit_delay_us, 5);
        assert_eq!(config.brightness.pwm_frequency_hz, 500);
    }

    #[test]
    fn timing_delays_never_zero() {
        let timing = ShiftTiming::default()
            .with_bit_delay_us(0)
            .with_latch_delay_us(0);
        assert_eq!(timing.bit_delay_us, 1);
        assert_eq!(timing.latch_delay_us, 1);
    }

    #[test]
    fn normalized_raises_zero_fields() {
        let timing = ShiftTiming {
            bit_delay_us: 0,
            latch_delay_us: 0,
        };
        let normalized = timing.normalized();
        assert_eq!(normalized.bit_delay_us, 1);
        assert_eq!(normalized.latch_delay_us, 1);

        let custom = ShiftTiming {
            bit_delay_us: 5,
            latch_delay_us: 200,
        };
        assert_eq!(custom.normalized(), custom);
    }

    #[test]
    fn latch_delay_dominates_bit_delay_by_default() {
        let timing = ShiftTiming::default();
        assert_eq!(timing.latch_delay_us / timing.bit_delay_us, 1_000);
    }

    #[test]
    fn render_time_estimate() {
        let timing = ShiftTiming::default();
        // 2 tubes * 48 us + 1000 us latch
        assert_eq!(timing.render_time_us(2), 1_096);
    }

    #[test]
    fn pwm_frequency_clamped() {
        let brightness = BrightnessConfig::default().with_pwm_frequency_hz(0);
        assert_eq!(brightness.pwm_frequency_hz, 1);
    }

    #[test]
    fn initial_level_builder() {
        let brightness = BrightnessConfig::default().with_initial_level(64);
        assert_eq!(brightness.initial_level, 64);
    }
}
