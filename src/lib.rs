//! A scrolling air-quality and weather ticker for a Raspberry Pi Pico W and a 32×8 WS2812 panel.
//!
//! The ticker polls two [sensor.community](https://sensor.community) sensors (PM2.5 and
//! temperature) and the Open-Meteo forecast API, then scrolls one status line across the
//! panel in a 5×7 font:
//!
//! ```text
//! Pa Rang Cafe (Alt: 310.0m) * 2025-02-16 10:11 * PM2.5: 12.3 ug/m, Temp: 27.1°C * Now: Cloudy, 27.4°C * ...
//! ```
//!
//! # Layout
//!
//! - [`font`]: the glyph table.
//! - [`led2d`]: panel geometry ([`led2d::layout::LedLayout`]), glyph drawing, and the scroll
//!   animation. [`led_strip`] holds frames and the [`led_strip::LedStrip`] output trait.
//! - [`sensor`], [`weather`]: fetching over the [`http::HttpClient`] trait, with retries.
//! - [`local_time`], [`status`]: turning readings into the status line.
//! - [`station`]: the scheduler tying it all together. [`config`] holds the deployment.
//!
//! Every hardware collaborator sits behind a trait, so everything above runs on the host
//! (the default `host` feature). The `embedded` and `wifi` features add the Pico W drivers.
#![cfg_attr(not(feature = "host"), no_std)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

#[cfg(all(feature = "host", feature = "embedded"))]
compile_error!("'host' and 'embedded' are mutually exclusive; build firmware with --no-default-features");

// Must come first so the logging macros are visible to every other module.
#[macro_use]
mod fmt;

pub mod config;
mod error;
pub mod font;
pub mod http;
pub mod json;
pub mod led2d;
pub mod led_strip;
pub mod local_time;
pub mod sensor;
pub mod station;
pub mod status;
#[cfg(feature = "host")]
pub mod to_png;
pub mod weather;
#[cfg(feature = "wifi")]
pub mod wifi;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

/// Milliseconds in `duration` for `DelayNs::delay_ms`, saturating at `u32::MAX`.
pub(crate) fn delay_ms(duration: embassy_time::Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
