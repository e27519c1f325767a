//! The ticker's main loop: keep the network up, refresh values on schedule, scroll the status.
//!
//! [`Station`] owns the panel, the HTTP client, the network link, and the [`DisplayState`].
//! Everything runs on one task: a scroll pass blocks the loop until the message has left
//! the panel, and fetches only happen between passes.

use core::convert::Infallible;
use core::fmt::Write as _;
use core::net::Ipv4Addr;

use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use heapless::String;

use crate::config::{PANEL_HEIGHT, PANEL_LAYOUT, PANEL_LEN, PANEL_WIDTH, StationConfig};
use crate::http::HttpClient;
use crate::led_strip::{LedStrip, Rgb, colors};
use crate::led2d::Led2d;
use crate::local_time::to_local;
use crate::sensor::{Reading, SensorProbe};
use crate::status::{DisplayState, compose};
use crate::{Error, Result, delay_ms};

/// Size of the buffer each HTTP response is read into.
pub const BODY_LEN: usize = 4096;

const NOTICE_LEN: usize = 96;

/// Color of the scrolling status line.
pub const STATUS_COLOR: Rgb = colors::DEEP_PINK;

/// A network link the station can check and re-establish.
pub trait Connectivity {
    /// Whether the link is currently usable.
    fn is_connected(&self) -> bool;

    /// Bring the link up, waiting as long as it takes.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures retrying cannot fix.
    async fn connect(&mut self) -> Result<()>;

    /// Address assigned to this device, once connected.
    fn ipv4_address(&self) -> Option<Ipv4Addr>;

    /// Name of the network joined.
    fn network_name(&self) -> &str;
}

impl<C: Connectivity> Connectivity for &mut C {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    fn ipv4_address(&self) -> Option<Ipv4Addr> {
        (**self).ipv4_address()
    }

    fn network_name(&self) -> &str {
        (**self).network_name()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Probe {
    ParticulateMatter,
    Temperature,
}

/// The scheduler.
///
/// Call [`Station::boot`] once, then [`Station::tick`] forever (or just [`Station::run`]).
pub struct Station<S, H, C, D> {
    config: StationConfig,
    panel: Led2d<S, PANEL_LEN, PANEL_WIDTH, PANEL_HEIGHT>,
    http: H,
    net: C,
    delay: D,
    body: [u8; BODY_LEN],
    state: DisplayState,
    next_fetch: Instant,
}

impl<S, H, C, D> Station<S, H, C, D>
where
    S: LedStrip<PANEL_LEN>,
    H: HttpClient,
    C: Connectivity,
    D: DelayNs,
{
    /// Assemble a station from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(config: StationConfig, strip: S, http: H, net: C, delay: D) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            panel: Led2d::new(strip, PANEL_LAYOUT),
            http,
            net,
            delay,
            body: [0; BODY_LEN],
            state: DisplayState::default(),
            next_fetch: Instant::MAX,
        })
    }

    /// The values currently shown.
    pub const fn state(&self) -> &DisplayState {
        &self.state
    }

    /// The settings in use.
    pub const fn config(&self) -> &StationConfig {
        &self.config
    }

    /// When the next scheduled refresh is due.
    pub const fn next_fetch(&self) -> Instant {
        self.next_fetch
    }

    /// Power-on sequence: panel test, network connect, first refresh.
    ///
    /// `now` is the boot time; the first scheduled refresh falls one fetch interval later.
    ///
    /// # Errors
    ///
    /// Returns a display or network error.
    pub async fn boot(&mut self, now: Instant) -> Result<()> {
        info!("initializing display");
        self.panel
            .self_test(colors::YELLOW, self.config.self_test_blinks, &mut self.delay)
            .await?;

        info!("connecting to {}", self.net.network_name());
        self.show("..initializing wifi..", colors::BLUE).await?;
        self.net.connect().await?;

        let mut notice: String<NOTICE_LEN> = String::new();
        let connected = match self.net.ipv4_address() {
            Some(address) => write!(
                notice,
                "connected to {} - IP: {}",
                self.net.network_name(),
                address
            ),
            None => write!(notice, "connected to {}", self.net.network_name()),
        };
        connected.map_err(|_| Error::MessageTooLong(notice.len()))?;
        info!("{}", notice.as_str());
        self.show(&notice, colors::GREEN).await?;

        info!("initial data fetch");
        self.refresh().await;
        self.schedule_after(now);
        Ok(())
    }

    /// One pass of the main loop.
    ///
    /// Reconnects if the link dropped, refreshes if `now` has reached the schedule, scrolls
    /// the status line once, and pauses briefly.
    ///
    /// # Errors
    ///
    /// Returns a display or network error, or [`Error::MessageTooLong`] if the status line
    /// overflows. Fetch failures are logged and leave the previous values in place.
    pub async fn tick(&mut self, now: Instant) -> Result<()> {
        if !self.net.is_connected() {
            warn!("wifi connection lost");
            self.show("wifi disconnected", colors::RED).await?;
            info!("reconnecting to {}", self.net.network_name());
            self.net.connect().await?;
            info!("reconnected");
            self.show("wifi reconnected", colors::GREEN).await?;
        }

        if now >= self.next_fetch {
            info!("fetching new data");
            self.show("..fetching data..", colors::WHITE).await?;
            self.refresh().await;
            self.schedule_after(now);
        }

        let message = compose(&self.state, self.config.site_name)?;
        self.show(&message, STATUS_COLOR).await?;
        self.delay.delay_ms(delay_ms(self.config.loop_pause)).await;
        Ok(())
    }

    /// Boot, then tick forever.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Self::boot`] or [`Self::tick`].
    pub async fn run(&mut self) -> Result<Infallible> {
        self.boot(Instant::now()).await?;
        loop {
            self.tick(Instant::now()).await?;
        }
    }

    /// Fetch both sensors and the forecast, keeping old values for anything that fails.
    pub async fn refresh(&mut self) {
        let pm_sensor = self.config.pm_sensor;
        self.refresh_sensor(pm_sensor, Probe::ParticulateMatter).await;
        self.delay.delay_ms(delay_ms(self.config.fetch_settle)).await;

        let temperature_sensor = self.config.temperature_sensor;
        self.refresh_sensor(temperature_sensor, Probe::Temperature).await;
        self.delay.delay_ms(delay_ms(self.config.fetch_settle)).await;

        match self
            .config
            .weather_api
            .fetch(&mut self.http, &mut self.body)
            .await
        {
            Ok(snapshot) => self.state.weather = Some(snapshot),
            Err(err) => warn!("weather not updated: {}", err),
        }
        info!("next update in {} s", self.config.fetch_interval.as_secs());
    }

    async fn refresh_sensor(&mut self, probe: SensorProbe, kind: Probe) {
        let result = self
            .config
            .sensor_api
            .fetch(
                &mut self.http,
                &mut self.delay,
                &mut self.body,
                probe.id,
                probe.metric,
            )
            .await;
        match result {
            Ok(reading) => self.apply(&reading, kind),
            Err(err) => warn!("sensor {} not updated: {}", probe.id, err),
        }
    }

    fn apply(&mut self, reading: &Reading, kind: Probe) {
        match to_local(&reading.timestamp, self.config.utc_offset_minutes) {
            Some(local_time) => self.state.local_time = Some(local_time),
            None => warn!("unreadable timestamp {}", reading.timestamp.as_str()),
        }

        if kind == Probe::ParticulateMatter && self.state.altitude.is_none() {
            let location = reading.location;
            info!(
                "location: {} at {}, {} (alt {} m), UTC offset {} min",
                self.config.site_name,
                location.latitude,
                location.longitude,
                location.altitude,
                self.config.utc_offset_minutes
            );
            // An unreadable altitude is retried with the next reading.
            if let Some(meters) = location.altitude {
                let mut altitude = String::new();
                if write!(altitude, "{:.1}", meters).is_ok() {
                    self.state.altitude = Some(altitude);
                }
            }
        }

        let value = Some(reading.value.clone());
        match kind {
            Probe::ParticulateMatter => self.state.pm25 = value,
            Probe::Temperature => self.state.temperature = value,
        }
    }

    async fn show(&mut self, message: &str, color: Rgb) -> Result<()> {
        self.panel
            .scroll_text(message, color, &mut self.delay)
            .await
            .map(|_frames| ())
    }

    fn schedule_after(&mut self, now: Instant) {
        self.next_fetch = now
            .checked_add(self.config.fetch_interval)
            .unwrap_or(Instant::MAX);
    }
}
