//! ESP32 bring-up for an EasyNixie chain.
//!
//! Control lines are plain GPIO outputs, OUT_EN is driven by the LEDC
//! peripheral when it can be configured, and setup/hold delays use the ROM
//! busy-wait (`Ets`).
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini
//! - **Tubes**: EasyNixie IN-12 modules, daisy chained (DSOUT to next DSIN)
//! - **Supply**: 12 V to the first module; logic at 3.3 V
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyOutputPin, Level, Output, PinDriver};
use esp_idf_hal::ledc::{config::TimerConfig, LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, Resolution};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;
use esp_idf_hal::sys::EspError;

use crate::brightness::BrightnessController;
use crate::config::{BrightnessConfig, Config};
use crate::display::NixieDisplay;
use crate::error::Error;
use crate::link::SerialLink;
use crate::traits::{Delay, OutputLine, PwmOutput};

/// Complete chain driver on ESP32 peripherals.
pub type Esp32Display<'d> = NixieDisplay<Esp32Line<'d>, Esp32Pwm<'d>, Esp32Delay>;

/// LEDC resolution for OUT_EN (1024 steps, well above the 256 levels used).
const PWM_RESOLUTION: Resolution = Resolution::Bits10;

/// Push-pull GPIO output.
pub struct Esp32Line<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl Esp32Line<'_> {
    /// Configures `pin` as an output.
    pub fn new(pin: AnyOutputPin) -> Result<Self, EspError> {
        Ok(Self {
            pin: PinDriver::output(pin)?,
        })
    }
}

impl OutputLine for Esp32Line<'_> {
    type Error = EspError;

    #[inline]
    fn set(&mut self, high: bool) -> Result<(), EspError> {
        self.pin.set_level(Level::from(high))
    }
}

/// LEDC channel driving OUT_EN.
pub struct Esp32Pwm<'d> {
    channel: LedcDriver<'d>,
}

impl PwmOutput for Esp32Pwm<'_> {
    type Error = EspError;

    fn set_duty_fraction(&mut self, fraction: f32) -> Result<(), EspError> {
        let max = self.channel.get_max_duty();
        let duty = (fraction.clamp(0.0, 1.0) * max as f32 + 0.5) as u32;
        self.channel.set_duty(duty.min(max))
    }
}

/// ROM busy-wait for bit timing, FreeRTOS sleep for frame pauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Delay;

impl Delay for Esp32Delay {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        Ets::delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}

/// Takes the three serial lines and drives them low.
pub fn serial_link<'d>(
    clock: AnyOutputPin,
    data: AnyOutputPin,
    latch: AnyOutputPin,
    config: &Config,
) -> Result<SerialLink<Esp32Line<'d>, Esp32Delay>, EspError> {
    SerialLink::new(
        Esp32Line::new(clock)?,
        Esp32Line::new(data)?,
        Esp32Line::new(latch)?,
        Esp32Delay,
        config.timing,
    )
}

/// Tries LEDC PWM on OUT_EN; falls back to a digital output held high.
///
/// Only a failure to drive the fallback output is returned as an error.
pub fn brightness<'d, T, C>(
    timer: impl Peripheral<P = T> + 'd,
    channel: impl Peripheral<P = C> + 'd,
    mut pin: AnyOutputPin,
    config: &BrightnessConfig,
) -> Result<BrightnessController<Esp32Pwm<'d>, Esp32Line<'d>>, EspError>
where
    T: LedcTimer + 'd,
    C: LedcChannel<SpeedMode = T::SpeedMode> + 'd,
{
    // SAFETY: the clone is only configured after the LEDC attempt has
    // failed or been dropped, so the pin is never driven by both.
    let fallback_pin = unsafe { pin.clone_unchecked() };

    let pwm = ledc_channel(timer, channel, pin, config.pwm_frequency_hz);
    BrightnessController::acquire(pwm, || Esp32Line::new(fallback_pin), config.initial_level)
}

fn ledc_channel<'d, T, C>(
    timer: impl Peripheral<P = T> + 'd,
    channel: impl Peripheral<P = C> + 'd,
    pin: AnyOutputPin,
    frequency_hz: u32,
) -> Result<Esp32Pwm<'d>, EspError>
where
    T: LedcTimer + 'd,
    C: LedcChannel<SpeedMode = T::SpeedMode> + 'd,
{
    let timer_config = TimerConfig::default()
        .frequency(frequency_hz.Hz())
        .resolution(PWM_RESOLUTION);
    let timer_driver = LedcTimerDriver::new(timer, &timer_config)?;
    let driver = LedcDriver::new(channel, timer_driver, pin)?;
    Ok(Esp32Pwm { channel: driver })
}

/// Builds the whole display from raw peripherals.
#[allow(clippy::too_many_arguments)]
pub fn display<'d, T, C>(
    clock: AnyOutputPin,
    data: AnyOutputPin,
    latch: AnyOutputPin,
    out_en: AnyOutputPin,
    timer: impl Peripheral<P = T> + 'd,
    channel: impl Peripheral<P = C> + 'd,
    config: &Config,
) -> Result<Esp32Display<'d>, Error<EspError>>
where
    T: LedcTimer + 'd,
    C: LedcChannel<SpeedMode = T::SpeedMode> + 'd,
{
    let link = serial_link(clock, data, latch, config).map_err(Error::Line)?;
    let brightness = brightness(timer, channel, out_en, &config.brightness).map_err(Error::Line)?;
    NixieDisplay::new(&config.chain, link, brightness)
}

/// Pin assignments for the SuperMini ESP32-C3.
///
/// OUT_EN must be LEDC-capable for dimming; any GPIO works otherwise.
pub mod pins {
    /// Output enable (OUT_EN), shared by the whole chain
    pub const OUT_EN: i32 = 2;

    /// Shift register clock (SHCP)
    pub const SHCP: i32 = 3;

    /// Storage register clock / latch (STCP)
    pub const STCP: i32 = 4;

    /// Serial data in (DSIN) of the first module
    pub const DSIN: i32 = 5;
}
