#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for panel wiring.

use air_ticker::config::{PANEL_HEIGHT, PANEL_LAYOUT, PANEL_LEN, PANEL_WIDTH};
use air_ticker::led2d::layout::{LedLayout, serpentine_index};

#[test]
fn serpentine_3x2_matches_expected() {
    const SERPENTINE: LedLayout<6, 3, 2> = LedLayout::serpentine_column_major();
    assert_eq!(
        *SERPENTINE.index_to_xy(),
        [(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 1),]
    );
}

#[test]
fn panel_mapping_is_a_bijection() {
    let mut seen = [false; PANEL_LEN];
    for x in 0..PANEL_WIDTH {
        for y in 0..PANEL_HEIGHT {
            let index = PANEL_LAYOUT.map(x, y);
            assert!(index < PANEL_LEN, "({x}, {y}) maps past the strip");
            assert!(!seen[index], "({x}, {y}) collides at LED {index}");
            seen[index] = true;
        }
    }
    assert!(seen.iter().all(|&hit| hit));
}

#[test]
fn even_columns_run_down_and_odd_columns_run_up() {
    for x in 0..PANEL_WIDTH {
        let column: Vec<usize> = (0..PANEL_HEIGHT).map(|y| PANEL_LAYOUT.map(x, y)).collect();
        let rising = column.windows(2).all(|pair| pair[0] < pair[1]);
        let falling = column.windows(2).all(|pair| pair[0] > pair[1]);
        if x % 2 == 0 {
            assert!(rising, "column {x} should count top to bottom: {column:?}");
            assert_eq!(column[0], x * PANEL_HEIGHT);
        } else {
            assert!(falling, "column {x} should count bottom to top: {column:?}");
            assert_eq!(column[PANEL_HEIGHT - 1], x * PANEL_HEIGHT);
        }
    }
}

#[test]
fn table_agrees_with_formula() {
    for x in 0..PANEL_WIDTH {
        for y in 0..PANEL_HEIGHT {
            assert_eq!(PANEL_LAYOUT.map(x, y), serpentine_index(x, y, PANEL_HEIGHT));
        }
    }
    assert_eq!(PANEL_LAYOUT.map(0, 7), 7);
    assert_eq!(PANEL_LAYOUT.map(1, 7), 8);
    assert_eq!(PANEL_LAYOUT.map(31, 0), 255);
}

#[test]
fn index_to_xy_inverts_map() {
    for (index, &(x, y)) in PANEL_LAYOUT.index_to_xy().iter().enumerate() {
        assert_eq!(PANEL_LAYOUT.map(usize::from(x), usize::from(y)), index);
    }
}

#[test]
fn custom_wiring_is_accepted() {
    const ROW_MAJOR: LedLayout<6, 3, 2> =
        LedLayout::new([(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(ROW_MAJOR.map(2, 0), 2);
    assert_eq!(ROW_MAJOR.map(0, 1), 3);
    assert!(!ROW_MAJOR.equals(&LedLayout::serpentine_column_major()));
}

#[test]
#[should_panic(expected = "duplicate (col,row) in mapping")]
fn new_panics_on_duplicate_cell() {
    let _ = LedLayout::<3, 3, 1>::new([(0, 0), (1, 0), (1, 0)]);
}

#[test]
#[should_panic(expected = "column out of bounds")]
fn new_panics_on_out_of_bounds_column() {
    let _ = LedLayout::<3, 3, 1>::new([(0, 0), (1, 0), (3, 0)]);
}

#[test]
#[should_panic(expected = "W*H must equal N")]
fn new_panics_on_mismatched_dimensions() {
    let _ = LedLayout::<5, 3, 2>::new([(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)]);
}

#[test]
#[should_panic(expected = "cell out of bounds")]
fn map_panics_off_panel() {
    let _ = PANEL_LAYOUT.map(PANEL_WIDTH, 0);
}
