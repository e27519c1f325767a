//! Compile-time description of panel geometry and wiring.
//!
//! See [`LedLayout`] for the panel this crate drives: a serpentine column-major grid.

/// LED index of cell `(x, y)` on a column-major serpentine panel `height` rows tall.
///
/// Even columns run top-to-bottom starting at `x * height`; odd columns run bottom-to-top.
/// The caller keeps `y < height`.
#[must_use]
pub const fn serpentine_index(x: usize, y: usize, height: usize) -> usize {
    if x % 2 == 0 {
        x * height + y
    } else {
        x * height + (height - 1 - y)
    }
}

/// Compile-time description of panel geometry and wiring.
///
/// `LedLayout` maps a rectangular `(x, y)` panel onto the linear order of LEDs
/// on a NeoPixel-style (WS2812) strip.
///
/// Coordinates use a screen-style convention: `(0, 0)` is the top-left corner,
/// `x` increases to the right, and `y` increases downward.
///
/// ## Validation
///
/// Layouts are validated at **compile time** when built in a `const`:
/// - `W * H` must equal `N`
/// - coordinates must be in-bounds
/// - every `(x, y)` cell must appear exactly once
///
/// # Example
///
/// ```rust
/// use air_ticker::led2d::layout::LedLayout;
///
/// const SERPENTINE: LedLayout<6, 3, 2> = LedLayout::serpentine_column_major();
/// const EXPECTED: LedLayout<6, 3, 2> =
///     LedLayout::new([(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 1)]);
/// const _: () = assert!(SERPENTINE.equals(&EXPECTED)); // Compile-time assert
/// assert_eq!(SERPENTINE.map(1, 0), 3);
/// ```
///
/// ```text
/// Serpentine 3×2:
///   LED0  LED3  LED4
///   LED1  LED2  LED5
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedLayout<const N: usize, const W: usize, const H: usize> {
    map: [(u16, u16); N],
    by_xy: [u16; N],
}

impl<const N: usize, const W: usize, const H: usize> LedLayout<N, W, H> {
    /// Build a layout from an explicit wiring list: entry `i` is the `(x, y)` of LED `i`.
    ///
    /// Panics (at compile time, in a `const`) if the list is not a bijection onto the grid.
    #[must_use]
    pub const fn new(map: [(u16, u16); N]) -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");
        assert!(N <= u16::MAX as usize, "total LEDs must fit in u16");

        let mut seen = [false; N];
        let mut by_xy = [0_u16; N];

        let mut led_index = 0;
        while led_index < N {
            let (col, row) = map[led_index];
            let col = col as usize;
            let row = row as usize;

            assert!(col < W, "column out of bounds");
            assert!(row < H, "row out of bounds");

            let cell = row * W + col;
            assert!(!seen[cell], "duplicate (col,row) in mapping");
            seen[cell] = true;
            by_xy[cell] = led_index as u16;

            led_index += 1;
        }

        let mut cell = 0;
        while cell < N {
            assert!(seen[cell], "mapping does not cover every cell");
            cell += 1;
        }

        Self { map, by_xy }
    }

    /// Column-major serpentine wiring: the strip snakes down even columns and up odd ones.
    ///
    /// ```text
    /// Strip snakes down columns (3×2 example):
    ///   LED0  LED3  LED4
    ///   LED1  LED2  LED5
    /// ```
    #[must_use]
    pub const fn serpentine_column_major() -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");

        let mut mapping = [(0_u16, 0_u16); N];
        let mut y_index = 0;
        while y_index < H {
            let mut x_index = 0;
            while x_index < W {
                mapping[serpentine_index(x_index, y_index, H)] = (x_index as u16, y_index as u16);
                x_index += 1;
            }
            y_index += 1;
        }
        Self::new(mapping)
    }

    /// LED index for the in-bounds cell `(x, y)`.
    ///
    /// Callers validate bounds; an out-of-range cell panics.
    #[must_use]
    pub const fn map(&self, x: usize, y: usize) -> usize {
        assert!(x < W && y < H, "cell out of bounds");
        self.by_xy[y * W + x] as usize
    }

    /// Return the array mapping LED wiring order to `(x, y)` coordinates.
    #[must_use]
    pub const fn index_to_xy(&self) -> &[(u16, u16); N] {
        &self.map
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn width(&self) -> usize {
        W
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn height(&self) -> usize {
        H
    }

    /// Total number of LEDs in the layout.
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Always `false`; a layout has at least one LED.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Const equality helper for compile-time checks.
    #[must_use]
    pub const fn equals(&self, other: &Self) -> bool {
        let mut i = 0;
        while i < N {
            if self.map[i].0 != other.map[i].0 || self.map[i].1 != other.map[i].1 {
                return false;
            }
            i += 1;
        }
        true
    }
}
