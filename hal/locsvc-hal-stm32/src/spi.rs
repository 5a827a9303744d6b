//! Transmit-only SPI for the LCD
//!
//! The C12832 has no MISO line. Chip select is a plain GPIO asserted around
//! every write so each command byte and each page of data is its own
//! transaction.

use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::{self, Config, Error as SpiError, Spi};
use embassy_stm32::time::Hertz;
use locsvc_hal::spi::{BitOrder, Mode, SpiBus, SpiBusError, SpiConfig};

/// Convert the shared SPI configuration into embassy's
pub fn config(cfg: &SpiConfig) -> Config {
    let mut config = Config::default();
    config.frequency = Hertz(cfg.frequency);
    config.mode = match cfg.mode {
        Mode::Mode0 => spi::MODE_0,
        Mode::Mode1 => spi::MODE_1,
        Mode::Mode2 => spi::MODE_2,
        Mode::Mode3 => spi::MODE_3,
    };
    config.bit_order = match cfg.bit_order {
        BitOrder::MsbFirst => spi::BitOrder::MsbFirst,
        BitOrder::LsbFirst => spi::BitOrder::LsbFirst,
    };
    config
}

/// Map an embassy SPI error onto the shared error type
pub fn map_error(e: SpiError) -> SpiBusError {
    match e {
        SpiError::ModeFault => SpiBusError::ModeFault,
        SpiError::Overrun => SpiBusError::Overrun,
        _ => SpiBusError::Other,
    }
}

/// [`SpiBus`] over a blocking transmit-only SPI with software chip select
pub struct LcdSpi<'d> {
    spi: Spi<'d, Blocking>,
    cs: Output<'d>,
}

impl<'d> LcdSpi<'d> {
    /// Wrap a configured SPI peripheral and its (active-low) chip select
    pub fn new(spi: Spi<'d, Blocking>, mut cs: Output<'d>) -> Self {
        cs.set_high();
        Self { spi, cs }
    }
}

impl SpiBus for LcdSpi<'_> {
    type Error = SpiBusError;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.cs.set_low();
        let result = self.spi.blocking_write(data).map_err(map_error);
        self.cs.set_high();
        result
    }
}
