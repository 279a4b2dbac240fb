//! ESP32-C3 SuperMini EasyNixie counter.
//!
//! This is the main entry point for the physical hardware. It:
//! - Brings up the serial link and OUT_EN brightness control
//! - Runs the tube self-test once
//! - Counts 0 to 99 on a two-tube chain, finishing in red at low brightness
//! - Idles with the final frame latched
//!
//! # Wiring
//!
//! | Signal | GPIO |
//! |--------|------|
//! | OUT_EN | 2 |
//! | SHCP | 3 |
//! | STCP | 4 |
//! | DSIN | 5 |
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_main
//! ```

use easy_nixie::config::{ChainConfig, Config};
use easy_nixie::hal::esp32;
use easy_nixie::patterns::{self, CounterFrames};
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripherals::Peripherals;
use std::thread;
use std::time::Duration;

/// Modules in the chain
const NUM_TUBES: usize = 2;

/// Idle poll interval once the counter is done
const IDLE_INTERVAL_MS: u64 = 1_000;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  easy-nixie SuperMini Counter");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default().with_chain(ChainConfig::default().with_num_tubes(NUM_TUBES));

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Chain (SHCP/STCP/DSIN on GPIO3/4/5, OUT_EN on GPIO2)
    // =========================================================================
    let mut display = esp32::display(
        peripherals.pins.gpio3.downgrade_output(),
        peripherals.pins.gpio5.downgrade_output(),
        peripherals.pins.gpio4.downgrade_output(),
        peripherals.pins.gpio2.downgrade_output(),
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
        &config,
    )?;
    println!("[OK] Serial link initialized (GPIO3/4/5)");

    if display.brightness().is_dimmable() {
        println!("[OK] OUT_EN PWM at {} Hz (GPIO2)", config.brightness.pwm_frequency_hz);
    } else {
        println!("[WARN] OUT_EN without PWM, brightness fixed at full");
    }

    display.clear()?;
    println!("[OK] {} tube(s) cleared", display.num_tubes());

    // =========================================================================
    // Self-test
    // =========================================================================
    patterns::run_self_test(&mut display)?;
    println!("[OK] Self-test complete");

    // =========================================================================
    // Counter
    // =========================================================================
    println!();
    println!("Counting 0 to {}...", CounterFrames::LAST);

    for frame in CounterFrames::new() {
        if frame.value % 10 == 0 {
            log::info!("count: {}", frame.value);
        }
        frame.stage(&mut display)?;
        display.render()?;
        thread::sleep(Duration::from_millis(CounterFrames::FRAME_MS as u64));
    }

    println!("[OK] Counting complete");

    loop {
        thread::sleep(Duration::from_millis(IDLE_INTERVAL_MS));
    }
}
