//! Blocking I2C master for the magnetometer
//!
//! The magnetometer is sampled from its own task at a fixed period and may
//! block on transfers, so the blocking embassy driver is used.

use embassy_stm32::i2c::{Config, Error as I2cError, I2c};
use embassy_stm32::mode::Blocking;
use embassy_stm32::time::Hertz;
use locsvc_hal::i2c::{I2cBus, I2cBusError, I2cConfig};

/// Convert the shared I2C configuration into embassy's
pub fn config(cfg: &I2cConfig) -> Config {
    let mut config = Config::default();
    config.frequency = Hertz(cfg.frequency);
    config
}

/// Map an embassy I2C error onto the shared error type
pub fn map_error(e: I2cError) -> I2cBusError {
    match e {
        I2cError::Bus => I2cBusError::Bus,
        I2cError::Arbitration => I2cBusError::ArbitrationLost,
        I2cError::Nack => I2cBusError::Nack,
        I2cError::Timeout => I2cBusError::Timeout,
        I2cError::Overrun => I2cBusError::Overrun,
        _ => I2cBusError::Other,
    }
}

/// [`I2cBus`] over a blocking embassy I2C peripheral
pub struct BlockingI2c<'d> {
    inner: I2c<'d, Blocking>,
}

impl<'d> BlockingI2c<'d> {
    /// Wrap a configured embassy I2C peripheral
    pub fn new(inner: I2c<'d, Blocking>) -> Self {
        Self { inner }
    }
}

impl I2cBus for BlockingI2c<'_> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.blocking_write(address, data).map_err(map_error)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.inner
            .blocking_write_read(address, write_data, read_buf)
            .map_err(map_error)
    }
}
