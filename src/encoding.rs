//! Per-tube state and its two-byte wire encoding.
//!
//! Each EasyNixie module carries two cascaded 8-bit shift registers. The
//! first byte shifted for a tube lands in the *control* register, the second
//! in the *digit* register:
//!
//! ```text
//! control:  bit 7   6      5     4    3     2     1        0
//!           -    comma  HV-en  red  green blue  digit 9  digit 8
//!
//! digit:    bit 7 .. 0  one-hot cathode select for digits 7 .. 0
//! ```
//!
//! The LED color lines are active-low: the control byte starts from
//! [`CONTROL_BASE`] (all three color bits set, LEDs off) and each [`Color`]
//! clears the bits of the LEDs it lights. Digits 8 and 9 have no bit in the
//! digit register and are selected through the control byte instead, so the
//! digit byte is `0` for 8, 9 and blank.

/// Control byte before color, digit flags, voltage and comma are applied.
pub const CONTROL_BASE: u8 = 0b0001_1100;
/// Control byte flag selecting cathode 8.
pub const DIGIT_8_FLAG: u8 = 0b0000_0001;
/// Control byte flag selecting cathode 9.
pub const DIGIT_9_FLAG: u8 = 0b0000_0010;
/// Control byte bit enabling the tube's high-voltage supply.
pub const VOLTAGE_FLAG: u8 = 0b0010_0000;
/// Control byte bit lighting the comma.
pub const COMMA_FLAG: u8 = 0b0100_0000;

/// A digit 0-9 or blank.
///
/// # Default
///
/// Defaults to [`BLANK`](Self::BLANK).
///
/// # Examples
///
/// ```
/// use easy_nixie::Digit;
///
/// assert_eq!(Digit::new(7).and_then(Digit::value), Some(7));
/// assert_eq!(Digit::new(10), None);
///
/// // Lenient conversion: anything above 9 is blank
/// assert_eq!(Digit::from(3).value(), Some(3));
/// assert!(Digit::from(10).is_blank());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Digit(Option<u8>);

impl Digit {
    /// No cathode lit.
    pub const BLANK: Digit = Digit(None);

    /// Returns the digit for `value` if it is in `0..=9`.
    #[inline]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 {
            Some(Digit(Some(value)))
        } else {
            None
        }
    }

    /// Returns the numeric value, or `None` when blank.
    #[inline]
    pub const fn value(self) -> Option<u8> {
        self.0
    }

    /// Returns true if no cathode is lit.
    #[inline]
    pub const fn is_blank(self) -> bool {
        self.0.is_none()
    }
}

impl From<u8> for Digit {
    fn from(value: u8) -> Self {
        Digit::new(value).unwrap_or(Digit::BLANK)
    }
}

/// Backlight LED color.
///
/// Exactly one variant is active per tube. The mixed variants light two of
/// the three LEDs; [`White`](Self::White) lights all three.
///
/// # Default
///
/// Defaults to [`White`](Self::White).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Color {
    /// Blue LED only.
    Blue,
    /// Green LED only.
    Green,
    /// Red LED only.
    Red,
    /// All three LEDs.
    #[default]
    White,
    /// Red and blue LEDs.
    RedBlue,
    /// Red and green LEDs.
    RedGreen,
    /// Blue and green LEDs.
    BlueGreen,
}

impl Color {
    /// Every color, in module code order.
    pub const ALL: [Color; 7] = [
        Color::Blue,
        Color::Green,
        Color::Red,
        Color::White,
        Color::RedBlue,
        Color::RedGreen,
        Color::BlueGreen,
    ];

    /// Mask ANDed into the control byte to light this color.
    ///
    /// Color lines are active-low, so a set bit here means "leave that LED off".
    #[inline]
    pub const fn clear_mask(self) -> u8 {
        match self {
            Color::Red => 0b1110_1111,
            Color::Green => 0b1111_0111,
            Color::Blue => 0b1111_1011,
            Color::White => 0b1110_0011,
            Color::RedBlue => 0b1110_1011,
            Color::RedGreen => 0b1110_0111,
            Color::BlueGreen => 0b1111_0011,
        }
    }

    /// Color code of the vendor library's `EASY_NIXIE_*` constants
    /// (`1` = blue .. `7` = blue+green).
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Color::Blue => 1,
            Color::Green => 2,
            Color::Red => 3,
            Color::White => 4,
            Color::RedBlue => 5,
            Color::RedGreen => 6,
            Color::BlueGreen => 7,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Color::Blue),
            2 => Some(Color::Green),
            3 => Some(Color::Red),
            4 => Some(Color::White),
            5 => Some(Color::RedBlue),
            6 => Some(Color::RedGreen),
            7 => Some(Color::BlueGreen),
            _ => None,
        }
    }

    /// Returns the color as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Red => "red",
            Color::White => "white",
            Color::RedBlue => "red+blue",
            Color::RedGreen => "red+green",
            Color::BlueGreen => "blue+green",
        }
    }
}

/// Logical state of one tube.
///
/// `brightness` is stored per tube for compatibility, but the module has a
/// single OUT_EN line shared by the whole chain. Whichever tube is shifted
/// last during [`render`] decides the brightness of every tube; see
/// [`NixieDisplay::effective_brightness`].
///
/// [`render`]: crate::NixieDisplay::render
/// [`NixieDisplay::effective_brightness`]: crate::NixieDisplay::effective_brightness
///
/// # Example
///
/// ```rust
/// use easy_nixie::{Color, Digit, TubeState};
///
/// let state = TubeState::new(Digit::from(5))
///     .with_color(Color::Red)
///     .with_comma(true)
///     .with_brightness(200);
///
/// let link = state.encode();
/// assert_eq!(link.digit, 0b0010_0000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TubeState {
    /// Digit to light, or blank.
    pub digit: Digit,
    /// Backlight color.
    pub color: Color,
    /// High-voltage supply enabled. When false the tube stays dark.
    pub voltage: bool,
    /// Comma / decimal point.
    pub comma: bool,
    /// Requested OUT_EN duty, 0 (off) to 255 (full).
    pub brightness: u8,
}

impl Default for TubeState {
    fn default() -> Self {
        Self {
            digit: Digit::BLANK,
            color: Color::White,
            voltage: true,
            comma: false,
            brightness: 0,
        }
    }
}

impl TubeState {
    /// Creates a state showing `digit` with default color, voltage and comma.
    pub fn new(digit: Digit) -> Self {
        Self {
            digit,
            ..Self::default()
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the high-voltage enable
    pub fn with_voltage(mut self, voltage: bool) -> Self {
        self.voltage = voltage;
        self
    }

    /// Set the comma
    pub fn with_comma(mut self, comma: bool) -> Self {
        self.comma = comma;
        self
    }

    /// Set the brightness
    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    /// Encodes this state into the two register bytes.
    pub fn encode(&self) -> ChainLink {
        let mut control = CONTROL_BASE;
        match self.digit.value() {
            Some(8) => control |= DIGIT_8_FLAG,
            Some(9) => control |= DIGIT_9_FLAG,
            _ => {}
        }
        control &= self.color.clear_mask();
        if self.voltage {
            control |= VOLTAGE_FLAG;
        }
        if self.comma {
            control |= COMMA_FLAG;
        }

        let digit = match self.digit.value() {
            Some(d) if d < 8 => 1 << d,
            _ => 0,
        };

        ChainLink { control, digit }
    }
}

/// The two bytes shifted out for one tube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChainLink {
    /// Color, digit 8/9 flags, voltage and comma.
    pub control: u8,
    /// One-hot digit 0-7, zero otherwise.
    pub digit: u8,
}

impl ChainLink {
    /// Bytes in transmission order: control first, then digit.
    #[inline]
    pub const fn bytes(&self) -> [u8; 2] {
        [self.control, self.digit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Digit Tests
    // =========================================================================

    #[test]
    fn digit_default_is_blank() {
        assert_eq!(Digit::default(), Digit::BLANK);
        assert!(Digit::default().is_blank());
    }

    #[test]
    fn digit_new_range() {
        for d in 0..=9 {
            assert_eq!(Digit::new(d).and_then(Digit::value), Some(d));
        }
        assert_eq!(Digit::new(10), None);
        assert_eq!(Digit::new(255), None);
    }

    #[test]
    fn digit_from_out_of_range_is_blank() {
        assert!(Digit::from(10).is_blank());
        assert!(Digit::from(42).is_blank());
        assert_eq!(Digit::from(9).value(), Some(9));
    }

    // =========================================================================
    // Color Tests
    // =========================================================================

    #[test]
    fn color_default_is_white() {
        assert_eq!(Color::default(), Color::White);
    }

    #[test]
    fn color_code_round_trip() {
        for color in Color::ALL {
            assert_eq!(Color::from_code(color.code()), Some(color));
        }
        assert_eq!(Color::from_code(0), None);
        assert_eq!(Color::from_code(8), None);
    }

    #[test]
    fn color_masks_only_touch_color_bits() {
        for color in Color::ALL {
            let untouched = !0b0001_1100u8;
            assert_eq!(color.clear_mask() & untouched, untouched, "{color:?}");
        }
    }

    // =========================================================================
    // Encoding Tests
    // =========================================================================

    #[test]
    fn default_state_encoding() {
        let link = TubeState::default().encode();
        // White clears all three color bits, voltage on
        assert_eq!(link.control, 0b0010_0000);
        assert_eq!(link.digit, 0);
    }

    #[test]
    fn digit_byte_is_one_hot_below_eight() {
        for d in 0..8u8 {
            let link = TubeState::new(Digit::from(d)).encode();
            assert_eq!(link.digit, 1 << d);
            assert_eq!(link.control & (DIGIT_8_FLAG | DIGIT_9_FLAG), 0);
        }
    }

    #[test]
    fn digits_eight_and_nine_use_control_flags() {
        let eight = TubeState::new(Digit::from(8)).encode();
        assert_eq!(eight.digit, 0);
        assert_eq!(eight.control & (DIGIT_8_FLAG | DIGIT_9_FLAG), DIGIT_8_FLAG);

        let nine = TubeState::new(Digit::from(9)).encode();
        assert_eq!(nine.digit, 0);
        assert_eq!(nine.control & (DIGIT_8_FLAG | DIGIT_9_FLAG), DIGIT_9_FLAG);
    }

    #[test]
    fn color_patterns() {
        let expected = [
            (Color::Blue, 0b0001_1000),
            (Color::Green, 0b0001_0100),
            (Color::Red, 0b0000_1100),
            (Color::White, 0b0000_0000),
            (Color::RedBlue, 0b0000_1000),
            (Color::RedGreen, 0b0000_0100),
            (Color::BlueGreen, 0b0001_0000),
        ];
        for (color, bits) in expected {
            let link = TubeState::default()
                .with_color(color)
                .with_voltage(false)
                .encode();
            assert_eq!(link.control, bits, "{color:?}");
        }
    }

    #[test]
    fn voltage_and_comma_bits() {
        let off = TubeState::default().with_voltage(false).encode();
        assert_eq!(off.control & VOLTAGE_FLAG, 0);

        let comma = TubeState::default().with_comma(true).encode();
        assert_eq!(comma.control & COMMA_FLAG, COMMA_FLAG);
        assert_eq!(comma.control & VOLTAGE_FLAG, VOLTAGE_FLAG);
    }

    #[test]
    fn full_control_byte() {
        let link = TubeState::new(Digit::from(9))
            .with_color(Color::Red)
            .with_comma(true)
            .encode();
        assert_eq!(link.control, 0b0110_1110);
        assert_eq!(link.bytes(), [0b0110_1110, 0]);
    }

    #[test]
    fn brightness_does_not_affect_encoding() {
        let dim = TubeState::new(Digit::from(3)).with_brightness(0).encode();
        let bright = TubeState::new(Digit::from(3)).with_brightness(255).encode();
        assert_eq!(dim, bright);
    }
}
