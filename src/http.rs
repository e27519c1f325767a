//! Minimal HTTP GET plumbing for the sensor and weather APIs.
//!
//! [`HttpClient`] is the seam the fetch code talks to. A response carries an `i32` status:
//! positive values are HTTP status codes, zero or negative values are transport failures
//! (see the `CONNECTION_*` constants and [`describe_status`]).
//!
//! [`exchange`] speaks HTTP/1.0 over any `embedded-io-async` stream, so the server closes
//! the connection after the body and no chunked decoding is needed. On the Pico,
//! [`TcpHttpClient`](tcp::TcpHttpClient) runs it over an `embassy-net` TCP socket.

use core::fmt::Write as _;

use embassy_futures::select::{Either, select};
use embedded_io_async::{Read, Write};

#[cfg(feature = "wifi")]
pub mod tcp;

/// The connection could not be established.
pub const CONNECTION_FAILED: i32 = -1;
/// The host name did not resolve.
pub const SERVER_NOT_FOUND: i32 = -2;
/// Connecting took too long.
pub const CONNECTION_TIMED_OUT: i32 = -3;
/// The connection dropped mid-exchange.
pub const CONNECTION_LOST: i32 = -4;
/// Nothing, or nothing resembling an HTTP response, came back.
pub const NO_RESPONSE: i32 = -5;
/// The response did not fit the body buffer.
pub const INVALID_RESPONSE_LENGTH: i32 = -6;
/// The server refused the connection.
pub const CONNECTION_REFUSED: i32 = -7;
/// The request could not be built (bad URL, oversized path).
pub const INVALID_REQUEST: i32 = -8;
/// The whole exchange took too long.
pub const CLIENT_TIMEOUT: i32 = -9;
/// The status line was malformed.
pub const INVALID_RESPONSE: i32 = -10;
/// The server reset the connection.
pub const CONNECTION_RESET: i32 = -11;

/// Human-readable text for a transport status code.
#[must_use]
pub const fn describe_status(code: i32) -> &'static str {
    match code {
        CONNECTION_FAILED => "Connection failed",
        SERVER_NOT_FOUND => "Server not found",
        CONNECTION_TIMED_OUT => "Connection timed out",
        CONNECTION_LOST => "Connection lost",
        NO_RESPONSE => "No or invalid response",
        INVALID_RESPONSE_LENGTH => "Invalid response length",
        CONNECTION_REFUSED => "Connection refused",
        INVALID_REQUEST => "Invalid request",
        CLIENT_TIMEOUT => "Client timeout",
        INVALID_RESPONSE => "Invalid response",
        CONNECTION_RESET => "Connection reset",
        _ => "Unknown error",
    }
}

/// Outcome of one GET: a status and how many body bytes were written to the caller's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpResponse {
    /// HTTP status if positive, transport failure code otherwise.
    pub status: i32,
    /// Length of the body at the start of the buffer.
    pub body_len: usize,
}

impl HttpResponse {
    /// A transport failure with no body.
    #[must_use]
    pub const fn failed(status: i32) -> Self {
        Self {
            status,
            body_len: 0,
        }
    }

    /// Whether the server answered at all (status > 0).
    #[must_use]
    pub const fn is_answered(&self) -> bool {
        self.status > 0
    }
}

/// Issues HTTP GET requests.
pub trait HttpClient {
    /// Fetch `url`, writing the response body to the start of `body`.
    ///
    /// Never fails outright: transport problems come back as a non-positive status.
    async fn get(&mut self, url: &str, body: &mut [u8]) -> HttpResponse;
}

impl<C: HttpClient> HttpClient for &mut C {
    async fn get(&mut self, url: &str, body: &mut [u8]) -> HttpResponse {
        (**self).get(url, body).await
    }
}

/// Run `request` until it finishes or `expiry` does, whichever comes first.
///
/// If `expiry` wins, `request` is dropped mid-flight and the result is [`CLIENT_TIMEOUT`].
pub async fn bounded(
    request: impl Future<Output = HttpResponse>,
    expiry: impl Future<Output = ()>,
) -> HttpResponse {
    match select(request, expiry).await {
        Either::First(response) => response,
        Either::Second(()) => HttpResponse::failed(CLIENT_TIMEOUT),
    }
}

/// The parts of an `http://host[:port]/path` URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Url<'a> {
    /// Host name.
    pub host: &'a str,
    /// TCP port, 80 unless given.
    pub port: u16,
    /// Path and query, starting with `/`.
    pub path: &'a str,
}

impl<'a> Url<'a> {
    /// Split a plain `http://` URL. Returns `None` for other schemes or a malformed authority.
    #[must_use]
    pub fn parse(url: &'a str) -> Option<Self> {
        let rest = url.strip_prefix("http://")?;
        let (authority, path) = rest.find('/').map_or((rest, "/"), |slash| rest.split_at(slash));
        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (host, port.parse().ok()?),
            None => (authority, 80),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self { host, port, path })
    }
}

const REQUEST_CAPACITY: usize = 512;

/// Send an HTTP/1.0 GET for `path` on `host` over `stream` and read the reply into `body`.
///
/// Reads until the server closes the stream, then moves the payload after the header
/// block to the start of `body`. A reply that fills `body` before the stream ends is
/// reported as [`INVALID_RESPONSE_LENGTH`].
pub async fn exchange<T: Read + Write>(
    stream: &mut T,
    host: &str,
    path: &str,
    body: &mut [u8],
) -> HttpResponse {
    let mut request: heapless::String<REQUEST_CAPACITY> = heapless::String::new();
    if write!(
        request,
        "GET {path} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: air-ticker\r\nAccept: application/json\r\nConnection: close\r\n\r\n"
    )
    .is_err()
    {
        return HttpResponse::failed(INVALID_REQUEST);
    }
    if stream.write_all(request.as_bytes()).await.is_err() || stream.flush().await.is_err() {
        return HttpResponse::failed(CONNECTION_LOST);
    }

    let mut filled = 0;
    loop {
        let Some(free) = body.get_mut(filled..).filter(|free| !free.is_empty()) else {
            return HttpResponse::failed(INVALID_RESPONSE_LENGTH);
        };
        match stream.read(free).await {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(_) => return HttpResponse::failed(CONNECTION_LOST),
        }
    }

    let Some(received) = body.get_mut(..filled) else {
        return HttpResponse::failed(INVALID_RESPONSE_LENGTH);
    };
    split_response(received)
}

/// Parse the status line of a complete response in `received` and move its body to the front.
pub fn split_response(received: &mut [u8]) -> HttpResponse {
    if received.is_empty() {
        return HttpResponse::failed(NO_RESPONSE);
    }
    let Some(header_end) = received.windows(4).position(|window| window == b"\r\n\r\n") else {
        return HttpResponse::failed(NO_RESPONSE);
    };
    let Some(status) = parse_status_line(received.get(..header_end).unwrap_or_default()) else {
        return HttpResponse::failed(INVALID_RESPONSE);
    };
    let body_start = header_end + 4;
    let body_len = received.len() - body_start;
    received.copy_within(body_start.., 0);
    HttpResponse { status, body_len }
}

fn parse_status_line(header: &[u8]) -> Option<i32> {
    let line_end = header
        .windows(2)
        .position(|window| window == b"\r\n")
        .unwrap_or(header.len());
    let line = core::str::from_utf8(header.get(..line_end)?).ok()?;
    let mut parts = line.split_ascii_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    let status: u16 = parts.next()?.parse().ok()?;
    (100..=999).contains(&status).then_some(i32::from(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_defaults_port_and_path() {
        assert_eq!(
            Url::parse("http://data.sensor.community/airrohr/v1/sensor/85707/"),
            Some(Url {
                host: "data.sensor.community",
                port: 80,
                path: "/airrohr/v1/sensor/85707/"
            })
        );
        assert_eq!(
            Url::parse("http://localhost:8080"),
            Some(Url {
                host: "localhost",
                port: 8080,
                path: "/"
            })
        );
        assert_eq!(Url::parse("https://example.com/"), None);
        assert_eq!(Url::parse("http://:80/"), None);
        assert_eq!(Url::parse("http://host:port/"), None);
    }

    #[test]
    fn bounded_request_finishes_before_expiry() {
        let answered = HttpResponse {
            status: 200,
            body_len: 4,
        };
        let response = embassy_futures::block_on(bounded(
            core::future::ready(answered),
            core::future::pending(),
        ));
        assert_eq!(response, answered);
    }

    #[test]
    fn expiry_covers_every_stage_of_a_request() {
        let mut stages_done = 0;
        // Lookup succeeds, the connect never completes.
        let request = async {
            embassy_futures::yield_now().await;
            stages_done += 1;
            core::future::pending::<()>().await;
            HttpResponse::failed(CONNECTION_FAILED)
        };
        let expiry = async {
            for _ in 0..3 {
                embassy_futures::yield_now().await;
            }
        };
        let response = embassy_futures::block_on(bounded(request, expiry));
        assert_eq!(response, HttpResponse::failed(CLIENT_TIMEOUT));
        assert_eq!(stages_done, 1);
    }

    #[test]
    fn status_descriptions_cover_known_codes() {
        assert_eq!(describe_status(CONNECTION_FAILED), "Connection failed");
        assert_eq!(describe_status(CONNECTION_RESET), "Connection reset");
        assert_eq!(describe_status(-12), "Unknown error");
        assert_eq!(describe_status(0), "Unknown error");
    }

    #[test]
    fn split_moves_body_to_front() {
        let mut received = *b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n[1,2]";
        let response = split_response(&mut received);
        assert_eq!(response, HttpResponse { status: 200, body_len: 5 });
        assert_eq!(&received[..5], b"[1,2]");
    }

    /// Replays a canned reply in small reads and records what was written.
    struct Canned {
        reply: &'static [u8],
        sent: Vec<u8>,
    }

    impl embedded_io_async::ErrorType for Canned {
        type Error = core::convert::Infallible;
    }

    impl Read for Canned {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let len = buf.len().min(self.reply.len()).min(7);
            buf[..len].copy_from_slice(&self.reply[..len]);
            self.reply = &self.reply[len..];
            Ok(len)
        }
    }

    impl Write for Canned {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn exchange_sends_get_and_returns_body() {
        let mut stream = Canned {
            reply: b"HTTP/1.0 200 OK\r\nContent-Length: 4\r\n\r\n[42]",
            sent: Vec::new(),
        };
        let mut body = [0_u8; 128];

        let response = embassy_futures::block_on(exchange(&mut stream, "example.com", "/a?b=1", &mut body));

        assert_eq!(response, HttpResponse { status: 200, body_len: 4 });
        assert_eq!(&body[..4], b"[42]");
        let request = String::from_utf8(stream.sent).unwrap();
        assert!(request.starts_with("GET /a?b=1 HTTP/1.0\r\nHost: example.com\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn exchange_reports_oversized_reply() {
        let mut stream = Canned {
            reply: b"HTTP/1.0 200 OK\r\n\r\n0123456789",
            sent: Vec::new(),
        };
        let mut body = [0_u8; 16];

        let response = embassy_futures::block_on(exchange(&mut stream, "h", "/", &mut body));

        assert_eq!(response.status, INVALID_RESPONSE_LENGTH);
    }

    #[test]
    fn split_rejects_garbage() {
        fn status_of(bytes: &[u8]) -> i32 {
            split_response(&mut bytes.to_vec()).status
        }
        assert_eq!(status_of(b""), NO_RESPONSE);
        assert_eq!(status_of(b"HTTP/1.0 200 OK\r\n"), NO_RESPONSE);
        assert_eq!(status_of(b"SMTP ready\r\n\r\n"), INVALID_RESPONSE);
        assert_eq!(status_of(b"HTTP/1.0 abc\r\n\r\n"), INVALID_RESPONSE);
    }
}
