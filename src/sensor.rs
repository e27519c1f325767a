//! Fetching the newest value of one metric from a sensor.community sensor.
//!
//! [`SensorApi::fetch`] issues `GET http://{host}{path}{sensor_id}/`, retrying transport
//! failures under a [`RetryPolicy`]. Once any attempt gets an HTTP status back the loop
//! stops, and the body is parsed as a list of readings. The first (most recent) reading is
//! scanned for the first data value whose `value_type` equals the requested metric.
//!
//! ```rust
//! # use air_ticker::http::{HttpClient, HttpResponse, CONNECTION_FAILED};
//! # struct Offline;
//! # impl HttpClient for Offline {
//! #     async fn get(&mut self, _url: &str, _body: &mut [u8]) -> HttpResponse {
//! #         HttpResponse::failed(CONNECTION_FAILED)
//! #     }
//! # }
//! # struct NoDelay;
//! # impl embedded_hal_async::delay::DelayNs for NoDelay {
//! #     async fn delay_ns(&mut self, _ns: u32) {}
//! # }
//! use air_ticker::sensor::{FetchError, SensorApi};
//!
//! let api = SensorApi::SENSOR_COMMUNITY;
//! let mut body = [0_u8; 512];
//! let result = embassy_futures::block_on(api.fetch(
//!     &mut Offline,
//!     &mut NoDelay,
//!     &mut body,
//!     "85707",
//!     "P2",
//! ));
//! assert_eq!(result, Err(FetchError::Exhausted(CONNECTION_FAILED)));
//! ```

use core::fmt::{self, Write as _};
use core::marker::PhantomData;

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use heapless::String;
use serde::Deserialize;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

use crate::delay_ms;
use crate::http::{HttpClient, describe_status};
use crate::json;

/// Attempts per fetch, counting the first.
pub const MAX_RETRIES: u8 = 3;
/// Pause before each retry.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
/// Per-request limit enforced by the HTTP client.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of a reading's sensor id.
pub const SENSOR_ID_LEN: usize = 16;
/// Capacity of a reading's value text.
pub const VALUE_LEN: usize = 16;
/// Capacity of a reading's timestamp text.
pub const TIMESTAMP_LEN: usize = 24;

const URL_LEN: usize = 128;

/// Why a payload that did arrive could not be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolFailure {
    /// The body was not JSON of the expected shape.
    #[display("malformed JSON")]
    Json,
    /// A text field did not fit its buffer.
    #[display("value too long")]
    ValueTooLong,
    /// The forecast had no entry for tomorrow.
    #[display("forecast missing")]
    MissingForecast,
}

/// Why a fetch produced no reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// One attempt failed before any HTTP status came back (non-positive status code).
    #[display("transport failure ({_0})")]
    Transport(i32),
    /// The server answered but the payload was unusable. Not retried.
    #[display("protocol failure: {_0}")]
    Protocol(ProtocolFailure),
    /// The newest reading lacks the metric or a location. Not retried.
    #[display("no matching metric")]
    NoMatchingMetric,
    /// Every attempt failed; carries the last status.
    #[display("retries exhausted (last status {_0})")]
    Exhausted(i32),
}

impl core::error::Error for FetchError {}

/// How many times to try, and how long to wait between tries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per fetch, including the first. Zero behaves like one.
    pub max_attempts: u8,
    /// Pause before each retry.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Three attempts, one second apart.
    pub const DEFAULT: Self = Self {
        max_attempts: MAX_RETRIES,
        delay: RETRY_DELAY,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Sensor position as reported with a reading.
///
/// A coordinate the sensor sent as something other than a number is `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    /// Degrees north.
    pub latitude: Option<f32>,
    /// Degrees east.
    pub longitude: Option<f32>,
    /// Meters above sea level.
    pub altitude: Option<f32>,
}

/// One metric from a sensor's newest reading.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// The sensor that was asked.
    pub sensor_id: String<SENSOR_ID_LEN>,
    /// The metric's value exactly as reported, e.g. `"12.3"`.
    pub value: String<VALUE_LEN>,
    /// UTC time of the reading, `"YYYY-MM-DD HH:MM:SS"`.
    pub timestamp: String<TIMESTAMP_LEN>,
    /// Where the sensor is.
    pub location: Location,
}

/// One sensor and the metric to pull from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorProbe {
    /// Sensor id as used in the API path.
    pub id: &'static str,
    /// `value_type` to look for, e.g. `"P2"` or `"temperature"`.
    pub metric: &'static str,
}

/// A sensor data endpoint and the retry policy used against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorApi {
    /// Host name, no scheme.
    pub host: &'static str,
    /// Path prefix; the sensor id and a trailing `/` are appended.
    pub path: &'static str,
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
}

impl SensorApi {
    /// The public sensor.community data API.
    pub const SENSOR_COMMUNITY: Self = Self {
        host: "data.sensor.community",
        path: "/airrohr/v1/sensor/",
        retry: RetryPolicy::DEFAULT,
    };

    /// Fetch the newest value of `metric` from `sensor_id`.
    ///
    /// `body` receives the raw response and must be large enough for it.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Exhausted`] with the last status if no attempt got an HTTP status back.
    /// - [`FetchError::Protocol`] if the body is malformed or a field is too long.
    /// - [`FetchError::NoMatchingMetric`] if the newest reading has no location or no
    ///   `metric` value, or there is no reading at all.
    pub async fn fetch(
        &self,
        http: &mut impl HttpClient,
        delay: &mut impl DelayNs,
        body: &mut [u8],
        sensor_id: &str,
        metric: &str,
    ) -> Result<Reading, FetchError> {
        let mut url: String<URL_LEN> = String::new();
        write!(url, "http://{}{}{}/", self.host, self.path, sensor_id)
            .map_err(|_| FetchError::Protocol(ProtocolFailure::ValueTooLong))?;

        let mut retry = RetryContext::new(self.retry.max_attempts);
        loop {
            if retry.attempt > 0 {
                info!("retry {} of {}", retry.attempt, retry.max_attempts - 1);
                delay.delay_ms(delay_ms(self.retry.delay)).await;
            }
            info!("fetching {} from sensor {}", metric, sensor_id);

            let response = http.get(&url, body).await;
            if response.is_answered() {
                info!("sensor {}: HTTP {}", sensor_id, response.status);
                let received = body.get(..response.body_len).unwrap_or_default();
                return parse_reading(received, sensor_id, metric);
            }

            warn!(
                "sensor {}: {} ({})",
                sensor_id,
                describe_status(response.status),
                response.status
            );
            if let Err(err) = retry.record_failure(response.status) {
                error!("sensor {}: {}", sensor_id, err);
                return Err(err);
            }
        }
    }
}

/// Attempt counter for one fetch call.
struct RetryContext {
    attempt: u8,
    max_attempts: u8,
    last_status: i32,
}

impl RetryContext {
    const fn new(max_attempts: u8) -> Self {
        Self {
            attempt: 0,
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            last_status: 0,
        }
    }

    /// Count a failed attempt; errors once the budget is spent.
    fn record_failure(&mut self, status: i32) -> Result<(), FetchError> {
        self.last_status = status;
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            Err(FetchError::Exhausted(self.last_status))
        } else {
            Ok(())
        }
    }
}

/// The parts of the newest record that a [`Reading`] is built from.
struct NewestRecord<'a> {
    timestamp: &'a str,
    location: Option<Location>,
    value: Option<&'a str>,
}

/// Coordinates as one of the shapes a sensor may send them in.
trait Coordinates {
    fn location(&self) -> Location;
}

/// Numbers sent as JSON strings, the way `value` is.
#[derive(Deserialize)]
struct TextCoordinates<'a> {
    #[serde(borrow)]
    latitude: Option<&'a str>,
    #[serde(borrow)]
    longitude: Option<&'a str>,
    #[serde(borrow)]
    altitude: Option<&'a str>,
}

impl Coordinates for TextCoordinates<'_> {
    fn location(&self) -> Location {
        let number = |text: Option<&str>| text?.trim().parse::<f32>().ok();
        Location {
            latitude: number(self.latitude),
            longitude: number(self.longitude),
            altitude: number(self.altitude),
        }
    }
}

#[derive(Deserialize)]
struct NumericCoordinates {
    latitude: Option<f32>,
    longitude: Option<f32>,
    altitude: Option<f32>,
}

impl Coordinates for NumericCoordinates {
    fn location(&self) -> Location {
        let number = |value: Option<f32>| value.filter(|value| value.is_finite());
        Location {
            latitude: number(self.latitude),
            longitude: number(self.longitude),
            altitude: number(self.altitude),
        }
    }
}

// A location block is present but none of its coordinates could be read.
impl Coordinates for IgnoredAny {
    fn location(&self) -> Location {
        Location {
            latitude: None,
            longitude: None,
            altitude: None,
        }
    }
}

/// Reads the record list, keeping only the first record.
struct Records<'m, C> {
    metric: &'m str,
    coordinates: PhantomData<C>,
}

impl<'de, C> DeserializeSeed<'de> for Records<'_, C>
where
    C: Deserialize<'de> + Coordinates,
{
    type Value = Option<NewestRecord<'de>>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, C> Visitor<'de> for Records<'_, C>
where
    C: Deserialize<'de> + Coordinates,
{
    type Value = Option<NewestRecord<'de>>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "an array of sensor records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let newest = seq.next_element_seed(Record::<C> {
            metric: self.metric,
            coordinates: PhantomData,
        })?;
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(newest)
    }
}

/// Reads one record, looking up `metric` among all of its data values.
struct Record<'m, C> {
    metric: &'m str,
    coordinates: PhantomData<C>,
}

impl<'de, C> DeserializeSeed<'de> for Record<'_, C>
where
    C: Deserialize<'de> + Coordinates,
{
    type Value = NewestRecord<'de>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, C> Visitor<'de> for Record<'_, C>
where
    C: Deserialize<'de> + Coordinates,
{
    type Value = NewestRecord<'de>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "a sensor record")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut timestamp = None;
        let mut location = None;
        let mut value = None;
        while let Some(key) = map.next_key::<&'de str>()? {
            match key {
                "timestamp" => timestamp = Some(map.next_value::<&'de str>()?),
                "location" => {
                    location = map.next_value::<Option<C>>()?.as_ref().map(C::location);
                }
                "sensordatavalues" => {
                    value = map.next_value_seed(FirstMatch {
                        metric: self.metric,
                    })?;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        let timestamp =
            timestamp.ok_or_else(|| <A::Error as de::Error>::missing_field("timestamp"))?;
        Ok(NewestRecord {
            timestamp,
            location,
            value,
        })
    }
}

#[derive(Deserialize)]
struct DataValue<'a> {
    value_type: &'a str,
    value: &'a str,
}

/// Scans every data value and keeps the first whose `value_type` is `metric`.
struct FirstMatch<'m> {
    metric: &'m str,
}

impl<'de> DeserializeSeed<'de> for FirstMatch<'_> {
    type Value = Option<&'de str>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for FirstMatch<'_> {
    type Value = Option<&'de str>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "an array of data values")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        while let Some(data_value) = seq.next_element::<DataValue<'de>>()? {
            if found.is_none() && data_value.value_type == self.metric {
                found = Some(data_value.value);
            }
        }
        Ok(found)
    }
}

fn newest_record<'a, C>(
    body: &'a [u8],
    metric: &str,
) -> serde_json_core::de::Result<Option<NewestRecord<'a>>>
where
    C: Deserialize<'a> + Coordinates,
{
    json::from_slice_seed(
        body,
        Records::<C> {
            metric,
            coordinates: PhantomData,
        },
    )
}

/// Pick `metric` out of the newest reading in a sensor API response body.
///
/// # Errors
///
/// See [`SensorApi::fetch`]; this never returns `Transport` or `Exhausted`.
pub fn parse_reading(body: &[u8], sensor_id: &str, metric: &str) -> Result<Reading, FetchError> {
    // Coordinates arrive as strings or as numbers; a record whose location cannot be read
    // either way still yields its value.
    let newest = newest_record::<TextCoordinates<'_>>(body, metric)
        .or_else(|_| newest_record::<NumericCoordinates>(body, metric))
        .or_else(|_| newest_record::<IgnoredAny>(body, metric))
        .map_err(|_err| {
            warn!("sensor {}: malformed JSON", sensor_id);
            FetchError::Protocol(ProtocolFailure::Json)
        })?;
    let Some(newest) = newest else {
        warn!("sensor {}: no readings", sensor_id);
        return Err(FetchError::NoMatchingMetric);
    };
    let Some(location) = newest.location else {
        warn!("sensor {}: reading has no location", sensor_id);
        return Err(FetchError::NoMatchingMetric);
    };
    let Some(value) = newest.value else {
        warn!("sensor {}: no {} value", sensor_id, metric);
        return Err(FetchError::NoMatchingMetric);
    };

    let too_long = |_| FetchError::Protocol(ProtocolFailure::ValueTooLong);
    let reading = Reading {
        sensor_id: String::try_from(sensor_id).map_err(too_long)?,
        value: String::try_from(value).map_err(too_long)?,
        timestamp: String::try_from(newest.timestamp).map_err(too_long)?,
        location,
    };
    info!(
        "sensor {}: {} = {} at {}",
        sensor_id,
        metric,
        reading.value.as_str(),
        reading.timestamp.as_str()
    );
    Ok(reading)
}
