//! Pico W networking: the CYW43 radio on PIO1 and an `embassy-net` stack with DHCP.
//!
//! [`Wifi::new`] powers up the radio, loads its firmware, and spawns the two background
//! tasks every embassy Wi-Fi program needs (the CYW43 runner and the network runner).
//! [`Wifi`] then implements [`Connectivity`]: `connect` keeps trying to join until it
//! succeeds and DHCP has handed out an address.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::net::Ipv4Addr;

use cyw43::{JoinOptions, PowerManagementMode};
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH1, PIN_23, PIN_24, PIN_25, PIN_29, PIO1};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::{Peri, bind_interrupts};
use embassy_time::{Duration, Instant, Timer};
use static_cell::StaticCell;

use crate::config::WifiCredentials;
use crate::http::tcp::TcpHttpClient;
use crate::sensor::HTTP_TIMEOUT;
use crate::station::Connectivity;
use crate::{Error, Result};

bind_interrupts!(struct Irqs {
    PIO1_IRQ_0 => InterruptHandler<PIO1>;
});

const JOIN_RETRY_DELAY: Duration = Duration::from_millis(500);
// DHCP, DNS, and one HTTP socket at a time.
const SOCKET_COUNT: usize = 3;
const NET_SEED: u64 = 0x0a1f_7c3e_5d92_b468;

type RadioSpi = PioSpi<'static, PIO1, 0, DMA_CH1>;

#[embassy_executor::task]
async fn cyw43_task(runner: cyw43::Runner<'static, Output<'static>, RadioSpi>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// The Pico W's Wi-Fi link.
pub struct Wifi {
    control: cyw43::Control<'static>,
    stack: Stack<'static>,
    credentials: WifiCredentials,
}

impl Wifi {
    /// Start the radio and the network stack. Does not join a network yet.
    ///
    /// The firmware files are read from `CYW43_FIRMWARE_DIR` at build time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if no SSID was configured, or
    /// [`Error::TaskSpawn`] if a background task cannot start.
    #[allow(clippy::too_many_arguments, reason = "one argument per fixed Pico W resource")]
    pub async fn new(
        pin_23: Peri<'static, PIN_23>,
        pin_24: Peri<'static, PIN_24>,
        pin_25: Peri<'static, PIN_25>,
        pin_29: Peri<'static, PIN_29>,
        pio: Peri<'static, PIO1>,
        dma: Peri<'static, DMA_CH1>,
        credentials: WifiCredentials,
        spawner: Spawner,
    ) -> Result<Self> {
        if credentials.ssid.is_empty() {
            return Err(Error::InvalidConfig("WIFI_SSID was not set at build time"));
        }

        let firmware = include_bytes!(concat!(env!("CYW43_FIRMWARE_DIR"), "/43439A0.bin"));
        let clm = include_bytes!(concat!(env!("CYW43_FIRMWARE_DIR"), "/43439A0_clm.bin"));

        let power = Output::new(pin_23, Level::Low);
        let chip_select = Output::new(pin_25, Level::High);
        let mut pio = Pio::new(pio, Irqs);
        let spi = PioSpi::new(
            &mut pio.common,
            pio.sm0,
            DEFAULT_CLOCK_DIVIDER,
            pio.irq0,
            chip_select,
            pin_24,
            pin_29,
            dma,
        );

        static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
        let state = CYW43_STATE.init(cyw43::State::new());
        let (net_device, mut control, runner) = cyw43::new(state, power, spi, firmware).await;
        spawner.spawn(cyw43_task(runner)).map_err(Error::TaskSpawn)?;

        control.init(clm).await;
        control
            .set_power_management(PowerManagementMode::PowerSave)
            .await;

        static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();
        let seed = NET_SEED ^ Instant::now().as_ticks();
        let (stack, runner) = embassy_net::new(
            net_device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            seed,
        );
        spawner.spawn(net_task(runner)).map_err(Error::TaskSpawn)?;
        info!("wifi: radio up");

        Ok(Self {
            control,
            stack,
            credentials,
        })
    }

    /// An HTTP client on this link, using the per-request timeout the fetchers expect.
    #[must_use]
    pub const fn http_client(&self) -> TcpHttpClient<'static> {
        TcpHttpClient::new(self.stack, HTTP_TIMEOUT)
    }
}

impl Connectivity for Wifi {
    fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }

    async fn connect(&mut self) -> Result<()> {
        let WifiCredentials { ssid, password } = self.credentials;
        let mut attempt: u32 = 0;
        loop {
            let options = if password.is_empty() {
                JoinOptions::new_open()
            } else {
                JoinOptions::new(password.as_bytes())
            };
            match self.control.join(ssid, options).await {
                Ok(()) => break,
                Err(err) => {
                    attempt += 1;
                    warn!(
                        "wifi: join {} failed (status {}), attempt {}",
                        ssid,
                        err.status,
                        attempt
                    );
                    Timer::after(JOIN_RETRY_DELAY).await;
                }
            }
        }

        info!("wifi: joined {}, waiting for DHCP", ssid);
        self.stack.wait_link_up().await;
        self.stack.wait_config_up().await;
        if let Some(address) = self.ipv4_address() {
            info!("wifi: address {}", address.octets());
        }
        Ok(())
    }

    fn ipv4_address(&self) -> Option<Ipv4Addr> {
        self.stack
            .config_v4()
            .map(|config| config.address.address())
    }

    fn network_name(&self) -> &str {
        self.credentials.ssid
    }
}
