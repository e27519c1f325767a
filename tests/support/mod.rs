//! Scripted stand-ins for the ticker's hardware and network collaborators.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::collections::VecDeque;
use std::net::Ipv4Addr;

use air_ticker::Result;
use air_ticker::http::{CONNECTION_FAILED, HttpClient, HttpResponse};
use air_ticker::station::Connectivity;
use embedded_hal_async::delay::DelayNs;

/// Records every delay instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.delays_ms.iter().map(|&ms| u64::from(ms)).sum()
    }

    pub fn count_of(&self, ms: u32) -> usize {
        self.delays_ms.iter().filter(|&&delay| delay == ms).count()
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

/// Answers GETs from a script, in order. Once the script runs out every request fails
/// with [`CONNECTION_FAILED`].
#[derive(Debug, Default)]
pub struct ScriptedHttp {
    script: VecDeque<(i32, Vec<u8>)>,
    pub requests: Vec<String>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with an HTTP status and body.
    pub fn reply(mut self, status: i32, body: &str) -> Self {
        self.script.push_back((status, body.as_bytes().to_vec()));
        self
    }

    /// Queue a transport failure.
    pub fn fail(mut self, status: i32) -> Self {
        self.script.push_back((status, Vec::new()));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl HttpClient for ScriptedHttp {
    async fn get(&mut self, url: &str, body: &mut [u8]) -> HttpResponse {
        self.requests.push(url.to_owned());
        let Some((status, payload)) = self.script.pop_front() else {
            return HttpResponse::failed(CONNECTION_FAILED);
        };
        if status <= 0 {
            return HttpResponse::failed(status);
        }
        body[..payload.len()].copy_from_slice(&payload);
        HttpResponse {
            status,
            body_len: payload.len(),
        }
    }
}

/// A network link whose state the test controls.
#[derive(Debug)]
pub struct FakeNet {
    pub connected: bool,
    pub connects: usize,
}

impl FakeNet {
    pub const ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 42);

    pub fn offline() -> Self {
        Self {
            connected: false,
            connects: 0,
        }
    }
}

impl Connectivity for FakeNet {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<()> {
        self.connects += 1;
        self.connected = true;
        Ok(())
    }

    fn ipv4_address(&self) -> Option<Ipv4Addr> {
        self.connected.then_some(Self::ADDRESS)
    }

    fn network_name(&self) -> &str {
        "cafe-guest"
    }
}

pub const PM_BODY: &str = r#"[{"id": 1, "timestamp": "2025-02-16 03:11:56",
    "location": {"id": 9, "latitude": "18.788", "longitude": "98.985", "altitude": "310.0", "country": "TH"},
    "sensordatavalues": [{"value": "20.5", "value_type": "P1"}, {"value": "12.3", "value_type": "P2"}]}]"#;

pub const TEMPERATURE_BODY: &str = r#"[{"id": 2, "timestamp": "2025-02-16 17:30:02",
    "location": {"latitude": "18.788", "longitude": "98.985", "altitude": "999.0"},
    "sensordatavalues": [{"value": "27.1", "value_type": "temperature"}, {"value": "61.0", "value_type": "humidity"}]}]"#;

pub const WEATHER_BODY: &str = r#"{"latitude": 18.75, "longitude": 99.0,
    "current": {"time": "2025-02-17T00:30", "temperature_2m": 27.4, "weathercode": 3, "pressure_msl": 1011.2},
    "daily": {"time": ["2025-02-17", "2025-02-18"], "weathercode": [3, 63],
              "temperature_2m_max": [33.1, 31.5], "temperature_2m_min": [18.2, 19.4]}}"#;
