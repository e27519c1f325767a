#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use air_ticker::{
    Result,
    config::{PANEL_LEN, StationConfig},
    led_strip::ws2812::Ws2812Strip,
    station::Station,
    wifi::Wifi,
};
use embassy_executor::Spawner;
use embassy_rp::{
    bind_interrupts,
    peripherals::PIO0,
    pio::{InterruptHandler, Pio},
    pio_programs::ws2812::{PioWs2812, PioWs2812Program},
};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());
    let config = StationConfig::DEFAULT;

    // Panel data line on GP4.
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let driver =
        PioWs2812::<PIO0, 0, PANEL_LEN, _>::new(&mut common, sm0, p.DMA_CH0, p.PIN_4, &program);
    let strip = Ws2812Strip::new(driver, config.gamma, config.brightness);

    let wifi = Wifi::new(
        p.PIN_23,
        p.PIN_24,
        p.PIN_25,
        p.PIN_29,
        p.PIO1,
        p.DMA_CH1,
        config.wifi,
        spawner,
    )
    .await?;
    let http = wifi.http_client();

    let mut station = Station::new(config, strip, http, wifi, Delay)?;
    station.run().await
}
