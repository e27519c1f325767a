//! WS2812 output over an RP2040 PIO state machine.

use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::ws2812::{Grb, PioWs2812};

use super::{Frame1d, Gamma, LedStrip, apply_correction, generate_combo_table};
use crate::Result;

/// A WS2812 strip driven by one PIO state machine.
///
/// Every frame is scaled through a combined gamma and brightness table before it is sent,
/// so brightness is a single global setting rather than something callers bake into colors.
pub struct Ws2812Strip<'d, PIO: Instance, const SM: usize, const N: usize> {
    driver: PioWs2812<'d, PIO, SM, N, Grb>,
    combo_table: [u8; 256],
}

impl<'d, PIO: Instance, const SM: usize, const N: usize> Ws2812Strip<'d, PIO, SM, N> {
    /// Wrap a configured PIO driver.
    #[must_use]
    pub const fn new(driver: PioWs2812<'d, PIO, SM, N, Grb>, gamma: Gamma, brightness: u8) -> Self {
        Self {
            driver,
            combo_table: generate_combo_table(gamma, brightness),
        }
    }
}

impl<PIO: Instance, const SM: usize, const N: usize> LedStrip<N> for Ws2812Strip<'_, PIO, SM, N> {
    async fn write_frame(&mut self, frame: &Frame1d<N>) -> Result<()> {
        let mut corrected_frame = *frame;
        apply_correction(&mut corrected_frame, &self.combo_table);
        self.driver.write(&corrected_frame).await;
        Ok(())
    }
}
