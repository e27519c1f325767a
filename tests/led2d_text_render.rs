#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Glyph drawing and the scroll animation on the 32x8 panel.

mod support;

use air_ticker::config::{PANEL_HEIGHT, PANEL_LAYOUT, PANEL_LEN, PANEL_WIDTH};
use air_ticker::led_strip::{Frame1d, Rgb, colors};
use air_ticker::led2d::{self, FRAME_DELAY, Led2d};
use air_ticker::to_png::FrameRecorder;
use embassy_futures::block_on;
use support::RecordingDelay;

type Frame = Frame1d<PANEL_LEN>;

fn lit_columns(frame: &Frame) -> Vec<usize> {
    (0..PANEL_WIDTH)
        .filter(|&x| (0..PANEL_HEIGHT).any(|y| frame[PANEL_LAYOUT.map(x, y)] != Rgb::default()))
        .collect()
}

fn scroll(message: &str) -> (usize, Vec<Frame>, RecordingDelay) {
    let mut panel = Led2d::new(FrameRecorder::<PANEL_LEN>::new(), PANEL_LAYOUT);
    let mut delay = RecordingDelay::default();
    let frame_count = block_on(panel.scroll_text(message, colors::GREEN, &mut delay)).unwrap();
    let frames = panel.strip().frames().to_vec();
    (frame_count, frames, delay)
}

#[test]
fn draw_char_sets_lit_and_unlit_pixels() {
    let mut frame = Frame::filled(colors::BLUE);
    led2d::draw_char(&mut frame, &PANEL_LAYOUT, 'A', 3, colors::RED);

    // 'A' column 0 is 0x7E: row 0 unlit, rows 1..=6 lit. Row 7 is outside the glyph.
    assert_eq!(frame[PANEL_LAYOUT.map(3, 0)], colors::BLACK);
    assert_eq!(frame[PANEL_LAYOUT.map(3, 1)], colors::RED);
    assert_eq!(frame[PANEL_LAYOUT.map(3, 6)], colors::RED);
    assert_eq!(frame[PANEL_LAYOUT.map(3, 7)], colors::BLUE);
    // Columns beside the glyph cell are untouched.
    assert_eq!(frame[PANEL_LAYOUT.map(2, 3)], colors::BLUE);
    assert_eq!(frame[PANEL_LAYOUT.map(8, 3)], colors::BLUE);
}

#[test]
fn draw_char_outside_the_font_is_a_no_op() {
    let original = Frame::filled(colors::BLUE);
    for ch in ['{', '~', 'é', '\n'] {
        let mut frame = original;
        led2d::draw_char(&mut frame, &PANEL_LAYOUT, ch, 0, colors::RED);
        assert_eq!(frame, original, "{ch:?}");
    }
}

#[test]
fn draw_char_clips_at_both_edges() {
    let mut frame = Frame::new();
    led2d::draw_char(&mut frame, &PANEL_LAYOUT, 'B', -4, colors::RED);
    // Only column 4 of 'B' (0x36) lands on the panel, at x = 0.
    assert_eq!(lit_columns(&frame), [0]);
    assert_eq!(frame[PANEL_LAYOUT.map(0, 1)], colors::RED);
    assert_eq!(frame[PANEL_LAYOUT.map(0, 0)], colors::BLACK);

    let mut frame = Frame::new();
    led2d::draw_char(&mut frame, &PANEL_LAYOUT, 'B', 30, colors::RED);
    assert_eq!(lit_columns(&frame), [30, 31]);

    let mut frame = Frame::new();
    led2d::draw_char(&mut frame, &PANEL_LAYOUT, 'B', 40, colors::RED);
    led2d::draw_char(&mut frame, &PANEL_LAYOUT, 'B', -40, colors::RED);
    assert!(frame.is_blank());
}

#[test]
fn two_characters_scroll_in_43_frames() {
    let (frame_count, frames, delay) = scroll("AB");

    assert_eq!(frame_count, PANEL_WIDTH + 2 * 6 - 1);
    assert_eq!(frames.len(), 43);
    assert!(frames[0].is_blank(), "message starts just off the right edge");
    assert_eq!(lit_columns(&frames[1]), [31]);
    assert_eq!(lit_columns(&frames[42]), [0], "last column of 'B' leaves last");
    assert_eq!(delay.delays_ms.len(), 43);
    assert_eq!(delay.count_of(20), 43);
    assert_eq!(delay.total_ms(), 43 * FRAME_DELAY.as_millis());
}

#[test]
fn glyphs_are_six_columns_apart() {
    let (_, frames, _) = scroll("!!");
    // '!' is lit only in its middle column; frame k has the message at 32 - k.
    let frame = &frames[20];
    assert_eq!(lit_columns(frame), [14, 20]);
}

#[test]
fn empty_message_clears_once() {
    let mut panel = Led2d::new(FrameRecorder::<PANEL_LEN>::new(), PANEL_LAYOUT);
    let mut delay = RecordingDelay::default();
    led2d::draw_char(panel.frame_mut(), &PANEL_LAYOUT, 'A', 0, colors::RED);

    let frame_count = block_on(panel.scroll_text("", colors::GREEN, &mut delay)).unwrap();

    assert_eq!(frame_count, 0);
    assert_eq!(panel.strip().frames().len(), 1);
    assert!(panel.strip().frames()[0].is_blank());
    assert!(delay.delays_ms.is_empty());
}

#[test]
fn degree_sign_takes_one_cell() {
    let (frame_count, _, _) = scroll("27°C");
    assert_eq!(frame_count, PANEL_WIDTH + 4 * 6 - 1);
}

#[test]
fn self_test_blinks_then_goes_dark() {
    let mut panel = Led2d::new(FrameRecorder::<PANEL_LEN>::new(), PANEL_LAYOUT);
    let mut delay = RecordingDelay::default();

    block_on(panel.self_test(colors::YELLOW, 3, &mut delay)).unwrap();

    let frames = panel.strip().frames();
    assert_eq!(frames.len(), 7);
    for blink in frames[..6].chunks(2) {
        assert_eq!(blink[0], Frame::filled(colors::YELLOW));
        assert!(blink[1].is_blank());
    }
    assert!(frames[6].is_blank());
    assert_eq!(delay.delays_ms, [50, 50, 50, 50, 50, 50, 100]);
}
