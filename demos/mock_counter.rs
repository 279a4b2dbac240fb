//! Host demo: runs the counter on a recording bus and prints what the chain
//! would have received.
//!
//! # Usage
//!
//! ```sh
//! RUST_LOG=debug cargo run --example mock_counter
//! ```

use easy_nixie::config::{ChainConfig, Config};
use easy_nixie::hal::MockBus;
use easy_nixie::patterns::CounterFrames;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let bus = MockBus::new();
    let config = Config::default().with_chain(ChainConfig::default().with_num_tubes(2));
    let mut display = bus.display(&config)?;

    display.clear().map_err(|()| "clear failed")?;
    bus.clear();

    for frame in CounterFrames::new() {
        frame.stage(&mut display)?;
        display.render().map_err(|()| "render failed")?;

        if frame.value % 10 == 0 || frame.value == CounterFrames::LAST {
            let digits: String = display
                .tubes()
                .iter()
                .map(|tube| match tube.digit.value() {
                    Some(d) => char::from(b'0' + d),
                    None => ' ',
                })
                .collect();
            log::info!(
                "{:>2}: [{}] {} @ {}",
                frame.value,
                digits,
                frame.color.as_str(),
                display.effective_brightness()
            );
        }
    }

    let frames = bus.frames();
    println!(
        "{} frames, {} bytes shifted, last frame {:02x?}",
        frames.len(),
        bus.shifted_bytes().len(),
        frames.last().cloned().unwrap_or_default()
    );
    println!(
        "render time per frame: {} us",
        config.timing.render_time_us(display.num_tubes())
    );

    Ok(())
}
