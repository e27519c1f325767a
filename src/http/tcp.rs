//! [`HttpClient`] over an `embassy-net` TCP socket.

use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{ConnectError, TcpSocket};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use super::{
    CONNECTION_FAILED, CONNECTION_RESET, CONNECTION_TIMED_OUT, HttpClient, HttpResponse,
    INVALID_REQUEST, SERVER_NOT_FOUND, Url, bounded, exchange,
};

const SOCKET_BUFFER_LEN: usize = 1024;

/// Plain-HTTP client bound to a network stack.
///
/// Each GET resolves the host and opens a fresh socket. The lookup, the connect and the
/// exchange together get `timeout` to finish; past it the result is `CLIENT_TIMEOUT`.
pub struct TcpHttpClient<'a> {
    stack: Stack<'a>,
    timeout: Duration,
    rx_buffer: [u8; SOCKET_BUFFER_LEN],
    tx_buffer: [u8; SOCKET_BUFFER_LEN],
}

impl<'a> TcpHttpClient<'a> {
    /// Create a client on `stack`.
    #[must_use]
    pub const fn new(stack: Stack<'a>, timeout: Duration) -> Self {
        Self {
            stack,
            timeout,
            rx_buffer: [0; SOCKET_BUFFER_LEN],
            tx_buffer: [0; SOCKET_BUFFER_LEN],
        }
    }
}

impl HttpClient for TcpHttpClient<'_> {
    async fn get(&mut self, url: &str, body: &mut [u8]) -> HttpResponse {
        let Some(url) = Url::parse(url) else {
            return HttpResponse::failed(INVALID_REQUEST);
        };
        // One budget for lookup, connect and exchange together.
        let expiry = Timer::after(self.timeout);
        bounded(self.request(url, body), expiry).await
    }
}

impl TcpHttpClient<'_> {
    async fn request(&mut self, url: Url<'_>, body: &mut [u8]) -> HttpResponse {
        let address = match self.stack.dns_query(url.host, DnsQueryType::A).await {
            Ok(addresses) => match addresses.first() {
                Some(address) => *address,
                None => return HttpResponse::failed(SERVER_NOT_FOUND),
            },
            Err(_) => return HttpResponse::failed(SERVER_NOT_FOUND),
        };

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(self.timeout));

        match socket.connect((address, url.port)).await {
            Ok(()) => {}
            Err(ConnectError::ConnectionReset) => {
                return HttpResponse::failed(CONNECTION_RESET);
            }
            Err(ConnectError::TimedOut) => return HttpResponse::failed(CONNECTION_TIMED_OUT),
            Err(_) => return HttpResponse::failed(CONNECTION_FAILED),
        }

        let response = exchange(&mut socket, url.host, url.path, body).await;
        socket.close();
        response
    }
}
