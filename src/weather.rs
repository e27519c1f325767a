//! Current conditions and tomorrow's forecast from Open-Meteo.

use core::fmt::Write as _;

use heapless::String;
use serde::Deserialize;

use crate::http::{HttpClient, describe_status};
use crate::json::{self, Leading};
use crate::sensor::{FetchError, ProtocolFailure};

const URL_LEN: usize = 320;

/// Label for a WMO weather interpretation code. Unlisted codes are `"Unknown"`.
#[must_use]
pub const fn describe(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1..=3 => "Cloudy",
        45 | 48 => "Foggy",
        51 | 53 | 55 => "Drizzle",
        61 | 63 | 65 | 80 | 81 | 82 => "Rain",
        _ => "Unknown",
    }
}

/// The weather values shown on the ticker.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherSnapshot {
    /// Current air temperature, °C.
    pub current_temperature: f32,
    /// Current sea-level pressure, hPa.
    pub current_pressure: f32,
    /// Current WMO weather code.
    pub current_code: i32,
    /// Tomorrow's WMO weather code.
    pub tomorrow_code: i32,
    /// Tomorrow's minimum temperature, °C.
    pub tomorrow_min: f32,
    /// Tomorrow's maximum temperature, °C.
    pub tomorrow_max: f32,
}

/// An Open-Meteo forecast request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeatherApi {
    /// Host name, no scheme.
    pub host: &'static str,
    /// Path and query string.
    pub path: &'static str,
}

impl WeatherApi {
    /// Chiang Mai, reported in Asia/Bangkok time, today and tomorrow.
    pub const CHIANG_MAI: Self = Self {
        host: "api.open-meteo.com",
        path: "/v1/forecast?latitude=18.7883&longitude=98.9853\
               &current=temperature_2m,weathercode,pressure_msl\
               &daily=weathercode,temperature_2m_max,temperature_2m_min\
               &timezone=Asia%2FBangkok&forecast_days=2",
    };

    /// Fetch the current conditions and tomorrow's forecast. Makes a single attempt.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if no HTTP status came back.
    /// - [`FetchError::Protocol`] if the body is malformed or has no second forecast day.
    pub async fn fetch(
        &self,
        http: &mut impl HttpClient,
        body: &mut [u8],
    ) -> Result<WeatherSnapshot, FetchError> {
        info!("fetching weather data");
        let mut url: String<URL_LEN> = String::new();
        write!(url, "http://{}{}", self.host, self.path)
            .map_err(|_| FetchError::Protocol(ProtocolFailure::ValueTooLong))?;

        let response = http.get(&url, body).await;
        if !response.is_answered() {
            warn!(
                "weather: {} ({})",
                describe_status(response.status),
                response.status
            );
            return Err(FetchError::Transport(response.status));
        }
        let received = body.get(..response.body_len).unwrap_or_default();
        let snapshot = parse_forecast(received)?;
        info!(
            "weather: now {} {}C, tomorrow {} {}..{}C",
            describe(snapshot.current_code),
            snapshot.current_temperature,
            describe(snapshot.tomorrow_code),
            snapshot.tomorrow_min,
            snapshot.tomorrow_max
        );
        Ok(snapshot)
    }
}

#[derive(Deserialize)]
struct Forecast {
    current: Current,
    daily: Daily,
}

#[derive(Deserialize)]
struct Current {
    temperature_2m: f32,
    pressure_msl: f32,
    weathercode: i32,
}

#[derive(Deserialize)]
struct Daily {
    weathercode: Leading<i32, 2>,
    temperature_2m_max: Leading<f32, 2>,
    temperature_2m_min: Leading<f32, 2>,
}

/// Extract a [`WeatherSnapshot`] from an Open-Meteo response body. Tomorrow is daily index 1.
///
/// # Errors
///
/// [`FetchError::Protocol`] with [`ProtocolFailure::Json`] for a malformed body, or
/// [`ProtocolFailure::MissingForecast`] if any daily series lacks a second entry.
pub fn parse_forecast(body: &[u8]) -> Result<WeatherSnapshot, FetchError> {
    let forecast: Forecast = json::from_slice(body).map_err(|_err| {
        warn!("weather: malformed JSON");
        FetchError::Protocol(ProtocolFailure::Json)
    })?;
    let missing = FetchError::Protocol(ProtocolFailure::MissingForecast);
    let daily = &forecast.daily;
    Ok(WeatherSnapshot {
        current_temperature: forecast.current.temperature_2m,
        current_pressure: forecast.current.pressure_msl,
        current_code: forecast.current.weathercode,
        tomorrow_code: *daily.weathercode.get(1).ok_or(missing)?,
        tomorrow_min: *daily.temperature_2m_min.get(1).ok_or(missing)?,
        tomorrow_max: *daily.temperature_2m_max.get(1).ok_or(missing)?,
    })
}
