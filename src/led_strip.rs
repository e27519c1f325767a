//! NeoPixel-style (WS2812) LED strip frames, brightness correction, and the strip trait.
//!
//! A [`Frame1d`] holds one color per LED in wiring order. The display code writes frames
//! through the [`LedStrip`] trait; on the Pico the trait is implemented by
//! [`Ws2812Strip`](ws2812::Ws2812Strip), which scales every channel through a combined
//! gamma and brightness table before pushing the frame out over PIO.
//!
//! ```rust
//! use air_ticker::led_strip::{Frame1d, Gamma, Rgb, apply_correction, colors, generate_combo_table};
//!
//! const COMBO_TABLE: [u8; 256] = generate_combo_table(Gamma::Linear, 40);
//!
//! let mut frame = Frame1d::<4>::filled(colors::WHITE);
//! apply_correction(&mut frame, &COMBO_TABLE);
//! assert_eq!(frame[0], Rgb::new(40, 40, 40));
//! ```

/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;

use core::ops::{Deref, DerefMut};

use smart_leds::RGB8;

use crate::Result;

#[cfg(feature = "embedded")]
pub mod ws2812;

// ============================================================================
// Gamma Correction
// ============================================================================

/// Gamma correction mode for LED strips.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gamma {
    /// Linear gamma (no correction). Gamma = 1.0
    Linear,
    /// Standard gamma 2.2 correction for perceived brightness.
    #[default]
    Gamma2_2,
}

/// Gamma 2.2 lookup table for 8-bit values.
/// Pre-computed to avoid floating point math: corrected = (value/255)^2.2 * 255
const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

/// Generate a combined gamma correction and brightness scaling lookup table.
///
/// `combo_table[channel]` is the gamma-corrected channel scaled by `max_brightness`, so the
/// strip needs one lookup per channel per frame.
#[must_use]
pub const fn generate_combo_table(gamma: Gamma, max_brightness: u8) -> [u8; 256] {
    let mut combo_table = [0_u8; 256];
    let mut index = 0;
    while index < 256 {
        let corrected = match gamma {
            Gamma::Linear => index as u16,
            Gamma::Gamma2_2 => GAMMA_2_2_TABLE[index] as u16,
        };
        // (value * brightness) / 255 never exceeds 255
        combo_table[index] = (corrected * max_brightness as u16 / 255) as u8;
        index += 1;
    }
    combo_table
}

/// Map every channel of `frame` through `combo_table` in place.
pub fn apply_correction<const N: usize>(frame: &mut Frame1d<N>, combo_table: &[u8; 256]) {
    for color in frame.iter_mut() {
        *color = Rgb::new(
            combo_table[usize::from(color.r)],
            combo_table[usize::from(color.g)],
            combo_table[usize::from(color.b)],
        );
    }
}

// ============================================================================
// Frames
// ============================================================================

/// RGB color representation re-exported from the `smart_leds` crate.
pub type Rgb = RGB8;

/// [`Rgb`] pixel data for an LED strip, in wiring order.
///
/// Frames deref to `[Rgb; N]`, so pixels can be read and mutated directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame1d<const N: usize>(pub [Rgb; N]);

impl<const N: usize> Frame1d<N> {
    /// Number of LEDs in this frame.
    pub const LEN: usize = N;

    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([Rgb::new(0, 0, 0); N])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: Rgb) -> Self {
        Self([color; N])
    }

    /// Set every LED to black.
    pub fn clear(&mut self) {
        self.0.fill(Rgb::new(0, 0, 0));
    }

    /// Whether every LED is black.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|color| *color == Rgb::new(0, 0, 0))
    }
}

impl<const N: usize> Deref for Frame1d<N> {
    type Target = [Rgb; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for Frame1d<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[Rgb; N]> for Frame1d<N> {
    fn from(array: [Rgb; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> From<Frame1d<N>> for [Rgb; N] {
    fn from(frame: Frame1d<N>) -> Self {
        frame.0
    }
}

impl<const N: usize> Default for Frame1d<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Strip trait
// ============================================================================

/// Something that can push a whole frame to physical LEDs.
///
/// Implementations own any brightness or gamma handling; callers pass colors at full scale.
pub trait LedStrip<const N: usize> {
    /// Show `frame`, returning once it has been handed to the hardware.
    ///
    /// # Errors
    ///
    /// Returns an error if the strip cannot accept the frame.
    async fn write_frame(&mut self, frame: &Frame1d<N>) -> Result<()>;
}

impl<const N: usize, S: LedStrip<N>> LedStrip<N> for &mut S {
    async fn write_frame(&mut self, frame: &Frame1d<N>) -> Result<()> {
        (**self).write_frame(frame).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_combo_table_scales_by_brightness() {
        let table = generate_combo_table(Gamma::Linear, 40);
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 40);
        assert_eq!(table[128], 20);
    }

    #[test]
    fn full_brightness_gamma_table_is_monotonic() {
        let table = generate_combo_table(Gamma::Gamma2_2, 255);
        assert_eq!(table[255], 255);
        assert!(table.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn correction_applies_per_channel() {
        let table = generate_combo_table(Gamma::Linear, 40);
        let mut frame = Frame1d::<2>::from([Rgb::new(255, 20, 147), Rgb::new(0, 0, 0)]);
        apply_correction(&mut frame, &table);
        assert_eq!(frame[0], Rgb::new(40, 3, 23));
        assert_eq!(frame[1], Rgb::new(0, 0, 0));
    }
}
