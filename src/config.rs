//! Deployment settings: what to fetch, how often, and how the panel looks.
//!
//! [`StationConfig::DEFAULT`] describes the Pa Rang Cafe ticker in Chiang Mai. The Wi-Fi
//! credentials and sensor ids can be overridden at build time:
//!
//! ```text
//! WIFI_SSID=... WIFI_PASSWORD=... AIR_TICKER_PM_SENSOR=85707 AIR_TICKER_TEMP_SENSOR=85708 cargo build ...
//! ```

use embassy_time::Duration;

use crate::led_strip::Gamma;
use crate::led2d::layout::LedLayout;
use crate::local_time::UTC_PLUS_7;
use crate::sensor::{RetryPolicy, SENSOR_ID_LEN, SensorApi, SensorProbe};
use crate::weather::WeatherApi;
use crate::{Error, Result};

/// Panel columns.
pub const PANEL_WIDTH: usize = 32;
/// Panel rows.
pub const PANEL_HEIGHT: usize = 8;
/// LEDs on the panel.
pub const PANEL_LEN: usize = PANEL_WIDTH * PANEL_HEIGHT;
/// The panel's wiring: a strip snaking down and up successive columns.
pub const PANEL_LAYOUT: LedLayout<PANEL_LEN, PANEL_WIDTH, PANEL_HEIGHT> =
    LedLayout::serpentine_column_major();

/// Wi-Fi network to join.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WifiCredentials {
    /// Network name.
    pub ssid: &'static str,
    /// WPA2 passphrase; empty for an open network.
    pub password: &'static str,
}

/// Everything the station needs to know about its deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StationConfig {
    /// Name at the head of the status line.
    pub site_name: &'static str,
    /// Wi-Fi network to join.
    pub wifi: WifiCredentials,
    /// Sensor data endpoint and its retry policy.
    pub sensor_api: SensorApi,
    /// The PM2.5 sensor. Its first reading also supplies the altitude.
    pub pm_sensor: SensorProbe,
    /// The temperature sensor.
    pub temperature_sensor: SensorProbe,
    /// Forecast endpoint.
    pub weather_api: WeatherApi,
    /// Local time offset from UTC, in minutes.
    pub utc_offset_minutes: i16,
    /// Time between refreshes of all values.
    pub fetch_interval: Duration,
    /// Pause between the requests of one refresh.
    pub fetch_settle: Duration,
    /// Pause after each pass of the status line.
    pub loop_pause: Duration,
    /// Global brightness, 0 to 255.
    pub brightness: u8,
    /// Gamma curve applied before brightness.
    pub gamma: Gamma,
    /// Blinks in the power-on panel test.
    pub self_test_blinks: usize,
}

impl StationConfig {
    /// The Pa Rang Cafe deployment, with any build-time overrides applied.
    pub const DEFAULT: Self = Self {
        site_name: "Pa Rang Cafe",
        wifi: WifiCredentials {
            ssid: or_default(option_env!("WIFI_SSID"), ""),
            password: or_default(option_env!("WIFI_PASSWORD"), ""),
        },
        sensor_api: SensorApi::SENSOR_COMMUNITY,
        pm_sensor: SensorProbe {
            id: or_default(option_env!("AIR_TICKER_PM_SENSOR"), "85707"),
            metric: "P2",
        },
        temperature_sensor: SensorProbe {
            id: or_default(option_env!("AIR_TICKER_TEMP_SENSOR"), "85708"),
            metric: "temperature",
        },
        weather_api: WeatherApi::CHIANG_MAI,
        utc_offset_minutes: UTC_PLUS_7,
        fetch_interval: Duration::from_secs(60),
        fetch_settle: Duration::from_secs(1),
        loop_pause: Duration::from_millis(100),
        brightness: 40,
        gamma: Gamma::Linear,
        self_test_blinks: 3,
    };

    /// Check the settings the scheduler relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        for probe in [&self.pm_sensor, &self.temperature_sensor] {
            if probe.id.is_empty() || probe.id.len() > SENSOR_ID_LEN {
                return Err(Error::InvalidConfig("sensor id must be 1 to 16 characters"));
            }
            if probe.metric.is_empty() {
                return Err(Error::InvalidConfig("sensor metric must not be empty"));
            }
        }
        if self.fetch_interval == Duration::from_ticks(0) {
            return Err(Error::InvalidConfig("fetch interval must be positive"));
        }
        Ok(())
    }

    /// Same settings with a different retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.sensor_api.retry = retry;
        self
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn or_default(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(value) => value,
        None => default,
    }
}
