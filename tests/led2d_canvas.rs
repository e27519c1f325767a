#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Drawing on the panel with embedded-graphics primitives.

use air_ticker::config::{PANEL_LAYOUT, PANEL_LEN};
use air_ticker::led_strip::colors;
use air_ticker::led2d::{Led2d, rgb8_to_rgb888, rgb888_to_rgb8};
use air_ticker::to_png::FrameRecorder;
use embassy_futures::block_on;
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
};

#[test]
fn border_lands_on_the_serpentine_indices() {
    let mut panel = Led2d::new(FrameRecorder::<PANEL_LEN>::new(), PANEL_LAYOUT);
    let mut canvas = panel.canvas();
    assert_eq!(canvas.size(), Size::new(32, 8));
    Rectangle::new(Point::zero(), canvas.size())
        .into_styled(PrimitiveStyle::with_stroke(Rgb888::RED, 1))
        .draw(&mut canvas)
        .unwrap();
    block_on(panel.flush()).unwrap();

    let frame = &panel.strip().frames()[0];
    assert_eq!(frame.iter().filter(|&&pixel| pixel == colors::RED).count(), 2 * 32 + 2 * 6);
    // Column 0 runs down from LED 0, column 1 runs back up from LED 15.
    assert_eq!(frame[0], colors::RED);
    assert_eq!(frame[7], colors::RED);
    assert_eq!(frame[15], colors::RED);
    assert_eq!(frame[14], colors::BLACK, "(1, 1) is inside the border");
    assert_eq!(frame[255], colors::RED);
}

#[test]
fn off_panel_pixels_are_dropped() {
    let mut panel = Led2d::new(FrameRecorder::<PANEL_LEN>::new(), PANEL_LAYOUT);
    Circle::new(Point::new(-3, -3), 6)
        .into_styled(PrimitiveStyle::with_fill(Rgb888::GREEN))
        .draw(&mut panel.canvas())
        .unwrap();

    let lit = panel.frame().iter().filter(|&&pixel| pixel == colors::LIME).count();
    assert!(lit > 0 && lit < 36);
    assert_eq!(panel.frame()[PANEL_LAYOUT.map(0, 0)], colors::LIME);
    assert_eq!(panel.frame()[PANEL_LAYOUT.map(3, 3)], colors::BLACK);
}

#[test]
fn color_conversions_agree() {
    let color = colors::DEEP_PINK;
    assert_eq!(rgb8_to_rgb888(color), Rgb888::new(color.r, color.g, color.b));
    assert_eq!(rgb888_to_rgb8(rgb8_to_rgb888(color)), color);
}
