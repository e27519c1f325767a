//! A rectangular NeoPixel-style (WS2812) LED panel that scrolls text.
//!
//! [`Led2d`] owns the strip, the panel's [`LedLayout`], and a [`Frame1d`] frame buffer.
//! Drawing happens in `(x, y)` space through a [`Canvas`], which maps each pixel to its LED
//! index and silently clips anything off-panel. Text uses the crate's 5×7 [`font`](crate::font).
//!
//! # Example: scroll a message
//!
//! ```rust
//! # use air_ticker::{Result, led_strip::{Frame1d, LedStrip}};
//! # struct NullStrip;
//! # impl LedStrip<256> for NullStrip {
//! #     async fn write_frame(&mut self, _frame: &Frame1d<256>) -> Result<()> { Ok(()) }
//! # }
//! # struct NoDelay;
//! # impl embedded_hal_async::delay::DelayNs for NoDelay {
//! #     async fn delay_ns(&mut self, _ns: u32) {}
//! # }
//! use air_ticker::led2d::{Led2d, layout::LedLayout};
//! use air_ticker::led_strip::colors;
//!
//! const LED_LAYOUT_32X8: LedLayout<256, 32, 8> = LedLayout::serpentine_column_major();
//!
//! # embassy_futures::block_on(async {
//! let mut led32x8 = Led2d::new(NullStrip, LED_LAYOUT_32X8);
//! let frames = led32x8.scroll_text("AB", colors::GREEN, &mut NoDelay).await?;
//! assert_eq!(frames, 32 + 11);
//! # Ok::<(), air_ticker::Error>(())
//! # }).unwrap();
//! ```

// Re-export geometric types from embedded-graphics for convenience
pub use embedded_graphics::geometry::{Point, Size};

pub mod layout;
pub mod scroll;

pub use layout::LedLayout;

use core::convert::Infallible;

use embassy_time::Duration;
use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

use crate::font::{self, GLYPH_ADVANCE};
use crate::led_strip::{Frame1d, LedStrip, Rgb};
use crate::{Error, Result, delay_ms};
use scroll::{ScrollOffsets, message_width};

/// Hold time of each scroll frame.
pub const FRAME_DELAY: Duration = Duration::from_millis(20);
/// How long the self-test keeps the panel lit, then dark, per blink.
pub const SELF_TEST_BLINK: Duration = Duration::from_millis(50);
/// Pause after the self-test's final blank frame.
pub const SELF_TEST_SETTLE: Duration = Duration::from_millis(100);

/// Convert RGB8 (smart-leds) to Rgb888 (embedded-graphics).
#[must_use]
pub const fn rgb8_to_rgb888(color: RGB8) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

/// Convert Rgb888 (embedded-graphics) to RGB8 (smart-leds).
#[must_use]
pub fn rgb888_to_rgb8(color: Rgb888) -> RGB8 {
    RGB8::new(color.r(), color.g(), color.b())
}

/// An [`embedded-graphics`](https://docs.rs/embedded-graphics) view of a [`Frame1d`]
/// through a panel layout.
///
/// Pixels outside `[0, W) × [0, H)` are dropped.
pub struct Canvas<'a, const N: usize, const W: usize, const H: usize> {
    frame: &'a mut Frame1d<N>,
    led_layout: &'a LedLayout<N, W, H>,
}

impl<'a, const N: usize, const W: usize, const H: usize> Canvas<'a, N, W, H> {
    /// Draw into `frame` using `led_layout` to place pixels.
    pub const fn new(frame: &'a mut Frame1d<N>, led_layout: &'a LedLayout<N, W, H>) -> Self {
        Self { frame, led_layout }
    }
}

impl<const N: usize, const W: usize, const H: usize> OriginDimensions for Canvas<'_, N, W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const N: usize, const W: usize, const H: usize> DrawTarget for Canvas<'_, N, W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(x_index), Ok(y_index)) = (usize::try_from(coord.x), usize::try_from(coord.y))
            else {
                continue;
            };
            if x_index < W && y_index < H {
                let led_index = self.led_layout.map(x_index, y_index);
                self.frame[led_index] = rgb888_to_rgb8(color);
            }
        }
        Ok(())
    }
}

/// Draw one character with its left column at `x_offset`.
///
/// Lit glyph pixels get `color`; unlit ones inside the 5×7 cell are set to black.
/// Characters without a glyph leave the frame untouched.
pub fn draw_char<const N: usize, const W: usize, const H: usize>(
    frame: &mut Frame1d<N>,
    led_layout: &LedLayout<N, W, H>,
    ch: char,
    x_offset: i32,
    color: Rgb,
) {
    let Some(glyph) = font::glyph(ch) else {
        return;
    };
    let lit = rgb8_to_rgb888(color);
    let pixels = glyph.cells().map(|(col, row, is_lit)| {
        // Glyph cells are at most 5×7, so the casts are lossless.
        let point = Point::new(x_offset.saturating_add(col as i32), row as i32);
        Pixel(point, if is_lit { lit } else { Rgb888::BLACK })
    });
    let mut canvas = Canvas::new(frame, led_layout);
    canvas.draw_iter(pixels).unwrap_or_else(|never| match never {});
}

/// A text-scrolling LED panel: a strip, its layout, and a frame buffer.
pub struct Led2d<S, const N: usize, const W: usize, const H: usize> {
    strip: S,
    led_layout: LedLayout<N, W, H>,
    frame: Frame1d<N>,
}

impl<S, const N: usize, const W: usize, const H: usize> Led2d<S, N, W, H>
where
    S: LedStrip<N>,
{
    const PANEL_WIDTH: i32 = {
        assert!(W <= i32::MAX as usize, "panel width must fit in i32");
        W as i32
    };

    /// Create a panel with a blank frame buffer.
    pub const fn new(strip: S, led_layout: LedLayout<N, W, H>) -> Self {
        Self {
            strip,
            led_layout,
            frame: Frame1d::new(),
        }
    }

    /// The frame buffer as last drawn.
    pub const fn frame(&self) -> &Frame1d<N> {
        &self.frame
    }

    /// The frame buffer, for drawing outside a scroll pass.
    pub const fn frame_mut(&mut self) -> &mut Frame1d<N> {
        &mut self.frame
    }

    /// The panel's layout.
    pub const fn led_layout(&self) -> &LedLayout<N, W, H> {
        &self.led_layout
    }

    /// The underlying strip.
    pub const fn strip(&self) -> &S {
        &self.strip
    }

    /// Drawing surface over the frame buffer. Call [`Self::flush`] to show the result.
    pub const fn canvas(&mut self) -> Canvas<'_, N, W, H> {
        Canvas::new(&mut self.frame, &self.led_layout)
    }

    /// Push the frame buffer to the strip.
    ///
    /// # Errors
    ///
    /// Returns the strip's error if the write fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.strip.write_frame(&self.frame).await
    }

    /// Scroll `message` right-to-left across the panel, one pixel per frame.
    ///
    /// Each frame clears the buffer, draws every glyph at `offset + index * 6`, flushes, and
    /// holds for [`FRAME_DELAY`]. Returns the number of frames drawn, which is
    /// `W + message_width(chars)`. An empty message is a single clear-and-flush and returns 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLong`] if the message is too wide to position in `i32`
    /// pixels, or the strip's error if a flush fails.
    pub async fn scroll_text(
        &mut self,
        message: &str,
        color: Rgb,
        delay: &mut impl DelayNs,
    ) -> Result<usize> {
        info!("scroll: {}", message);
        let char_count = message.chars().count();
        if char_count == 0 {
            self.frame.clear();
            self.flush().await?;
            return Ok(0);
        }

        let width = i32::try_from(message_width(char_count))
            .map_err(|_| Error::MessageTooLong(message.len()))?;

        let mut frame_count = 0;
        for offset in ScrollOffsets::new(Self::PANEL_WIDTH, width) {
            self.frame.clear();
            self.draw_text(message, offset, color);
            self.flush().await?;
            delay.delay_ms(delay_ms(FRAME_DELAY)).await;
            frame_count += 1;
        }
        debug!("scroll: {} frames", frame_count);
        Ok(frame_count)
    }

    /// Blink the whole panel `blinks` times in `color`, then leave it dark.
    ///
    /// # Errors
    ///
    /// Returns the strip's error if a flush fails.
    pub async fn self_test(
        &mut self,
        color: Rgb,
        blinks: usize,
        delay: &mut impl DelayNs,
    ) -> Result<()> {
        info!("display test: {} blinks", blinks);
        for _ in 0..blinks {
            self.frame = Frame1d::filled(color);
            self.flush().await?;
            delay.delay_ms(delay_ms(SELF_TEST_BLINK)).await;

            self.frame.clear();
            self.flush().await?;
            delay.delay_ms(delay_ms(SELF_TEST_BLINK)).await;
        }
        self.flush().await?;
        delay.delay_ms(delay_ms(SELF_TEST_SETTLE)).await;
        info!("display test complete");
        Ok(())
    }

    fn draw_text(&mut self, message: &str, offset: i32, color: Rgb) {
        let mut x_offset = offset;
        for ch in message.chars() {
            // Glyphs further right are off-panel too.
            if x_offset >= Self::PANEL_WIDTH {
                break;
            }
            draw_char(&mut self.frame, &self.led_layout, ch, x_offset, color);
            x_offset = x_offset.saturating_add(GLYPH_ADVANCE as i32);
        }
    }
}
