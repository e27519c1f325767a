//! The scrolling status line and the values it is built from.

use core::fmt::{self, Write as _};

use heapless::String;

use crate::local_time::LocalTime;
use crate::sensor::VALUE_LEN;
use crate::weather::{self, WeatherSnapshot};
use crate::{Error, Result};

/// Capacity of a composed status line.
pub const STATUS_LEN: usize = 320;
/// Capacity of the formatted altitude.
pub const ALTITUDE_LEN: usize = 12;
/// Shown for any value that has never been fetched.
pub const PLACEHOLDER: &str = "--";

/// A composed status line.
pub type StatusMessage = String<STATUS_LEN>;

/// The latest known value of everything on the status line.
///
/// Each field starts as `None` and keeps its last good value when later fetches fail.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayState {
    /// Sensor altitude in meters, formatted to one decimal. Captured once.
    pub altitude: Option<String<ALTITUDE_LEN>>,
    /// Local time of the newest sensor reading.
    pub local_time: Option<LocalTime>,
    /// PM2.5 concentration as reported.
    pub pm25: Option<String<VALUE_LEN>>,
    /// Local temperature as reported.
    pub temperature: Option<String<VALUE_LEN>>,
    /// Current conditions and tomorrow's forecast.
    pub weather: Option<WeatherSnapshot>,
}

/// Build the status line for `state`, headed by `site_name`.
///
/// Fields never fetched show as `--`. The result depends only on the arguments.
///
/// ```rust
/// use air_ticker::status::{DisplayState, compose};
///
/// let message = compose(&DisplayState::default(), "Pa Rang Cafe")?;
/// assert_eq!(
///     message.as_str(),
///     "Pa Rang Cafe (Alt: --m) * -- * PM2.5: -- ug/m, Temp: --°C * Now: --, --°C * \
///      Tomorrow: --, Min: --°C, Max: --°C *"
/// );
/// # Ok::<(), air_ticker::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::MessageTooLong`] if the line does not fit in [`STATUS_LEN`] bytes.
pub fn compose(state: &DisplayState, site_name: &str) -> Result<StatusMessage> {
    let (now, now_temperature, tomorrow, tomorrow_min, tomorrow_max) = match &state.weather {
        Some(weather) => (
            weather::describe(weather.current_code),
            Tenths(Some(weather.current_temperature)),
            weather::describe(weather.tomorrow_code),
            Tenths(Some(weather.tomorrow_min)),
            Tenths(Some(weather.tomorrow_max)),
        ),
        None => (PLACEHOLDER, Tenths(None), PLACEHOLDER, Tenths(None), Tenths(None)),
    };

    let mut message = StatusMessage::new();
    write!(
        message,
        "{site_name} (Alt: {}m) * {} * PM2.5: {} ug/m, Temp: {}°C * Now: {}, {}°C * \
         Tomorrow: {}, Min: {}°C, Max: {}°C *",
        or_placeholder(state.altitude.as_deref()),
        or_placeholder(state.local_time.as_deref()),
        or_placeholder(state.pm25.as_deref()),
        or_placeholder(state.temperature.as_deref()),
        now,
        now_temperature,
        tomorrow,
        tomorrow_min,
        tomorrow_max,
    )
    .map_err(|_| Error::MessageTooLong(message.len()))?;
    Ok(message)
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(PLACEHOLDER)
}

/// A temperature to one decimal place, or the placeholder.
struct Tenths(Option<f32>);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.1}"),
            None => f.write_str(PLACEHOLDER),
        }
    }
}
