//! Canned sequences for bring-up and demos.
//!
//! Both run on top of the public [`NixieDisplay`] API and pace frames with
//! the display's own delay source.

use core::fmt::Debug;

use crate::display::NixieDisplay;
use crate::encoding::{Color, Digit};
use crate::error::InputError;
use crate::traits::{Delay, OutputLine, PwmOutput};

/// Colors cycled by [`run_self_test`], in order.
pub const SELF_TEST_COLORS: [Color; 4] = [Color::White, Color::Red, Color::Green, Color::Blue];

/// Hold time of each digit frame in the self-test.
pub const DIGIT_FRAME_MS: u32 = 300;

/// Hold time of each counting frame in the self-test.
pub const COUNT_FRAME_MS: u32 = 50;

/// Brightness used while counting.
pub const COUNT_BRIGHTNESS: u8 = 128;

/// Exercises every digit in every primary color, then counts.
///
/// 1. For each of [`SELF_TEST_COLORS`], shows 0 through 9 on all tubes at
///    full brightness, [`DIGIT_FRAME_MS`] per frame.
/// 2. Counts from 0 up to `min(100, 10^num_tubes)` (exclusive) with leading
///    zeros, [`COUNT_FRAME_MS`] per frame.
/// 3. Clears the chain.
pub fn run_self_test<L, P, D>(display: &mut NixieDisplay<L, P, D>) -> Result<(), L::Error>
where
    L: OutputLine,
    P: PwmOutput,
    P::Error: Debug,
    D: Delay,
{
    log::info!("self-test: {} tube(s)", display.num_tubes());

    for color in SELF_TEST_COLORS {
        log::debug!("self-test: color {}", color.as_str());
        for value in 0..=9u8 {
            for index in 0..display.num_tubes() {
                // In range by construction
                let _ = display.set_tube(index, Digit::from(value), color, true, false, u8::MAX);
            }
            display.render()?;
            display.pause_ms(DIGIT_FRAME_MS);
        }
    }

    for count in 0..count_limit(display.num_tubes()) {
        // Fits by construction
        let _ = display.set_number(count as i64, Color::White, true, COUNT_BRIGHTNESS);
        display.render()?;
        display.pause_ms(COUNT_FRAME_MS);
    }

    display.clear()
}

/// Exclusive upper bound of the self-test count: `min(100, 10^num_tubes)`.
pub fn count_limit(num_tubes: usize) -> u32 {
    match num_tubes {
        0 => 1,
        1 => 10,
        _ => 100,
    }
}

/// One step of the counter demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterFrame {
    /// Number to show, with leading zeros
    pub value: u8,
    /// Digit color
    pub color: Color,
    /// Chain brightness
    pub brightness: u8,
}

impl CounterFrame {
    /// Stages this frame on `display`.
    pub fn stage<L, P, D>(&self, display: &mut NixieDisplay<L, P, D>) -> Result<(), InputError>
    where
        L: OutputLine,
        P: PwmOutput,
        P::Error: Debug,
        D: Delay,
    {
        display.set_number(self.value as i64, self.color, true, self.brightness)
    }
}

/// Frames of the 0 to 99 counter demo.
///
/// Every frame is white at brightness 128 except the last, which is red at
/// brightness 64.
///
/// ```rust
/// use easy_nixie::patterns::CounterFrames;
/// use easy_nixie::Color;
///
/// let frames: Vec<_> = CounterFrames::new().collect();
/// assert_eq!(frames.len(), 100);
/// assert_eq!(frames[99].color, Color::Red);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CounterFrames {
    next: u8,
}

impl CounterFrames {
    /// Hold time of each frame.
    pub const FRAME_MS: u32 = 80;

    /// Last value shown.
    pub const LAST: u8 = 99;

    /// Starts at 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for CounterFrames {
    type Item = CounterFrame;

    fn next(&mut self) -> Option<CounterFrame> {
        if self.next > Self::LAST {
            return None;
        }
        let value = self.next;
        self.next += 1;

        let (color, brightness) = if value == Self::LAST {
            (Color::Red, 64)
        } else {
            (Color::White, COUNT_BRIGHTNESS)
        };
        Some(CounterFrame {
            value,
            color,
            brightness,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (Self::LAST as usize + 1).saturating_sub(self.next as usize);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CounterFrames {}
