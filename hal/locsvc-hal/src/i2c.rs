//! I2C bus abstractions
//!
//! Provides traits for I2C master operations that can be implemented
//! by chip-specific HALs.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Write a single register: `[reg, value]` in one transaction
    fn write_byte(&mut self, address: u8, reg: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[reg, value])
    }

    /// Read a single register
    fn read_byte(&mut self, address: u8, reg: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.write_read(address, &[reg], &mut buf)?;
        Ok(buf[0])
    }
}

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Timeout
    Timeout,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every write and answers reads from a fixed register value
    struct MockBus {
        writes: Vec<(u8, Vec<u8>)>,
        reg_value: u8,
    }

    impl I2cBus for MockBus {
        type Error = I2cBusError;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
            self.writes.push((address, data.to_vec()));
            Ok(())
        }

        fn write_read(
            &mut self,
            address: u8,
            write_data: &[u8],
            read_buf: &mut [u8],
        ) -> Result<(), Self::Error> {
            if address != 0x69 || write_data.len() != 1 {
                return Err(I2cBusError::Nack);
            }
            read_buf.fill(self.reg_value);
            Ok(())
        }
    }

    #[test]
    fn test_write_byte_is_register_then_value() {
        let mut bus = MockBus {
            writes: Vec::new(),
            reg_value: 0,
        };
        bus.write_byte(0x69, 0x06, 0x80).unwrap();

        assert_eq!(bus.writes, vec![(0x69, vec![0x06, 0x80])]);
    }

    #[test]
    fn test_read_byte() {
        let mut bus = MockBus {
            writes: Vec::new(),
            reg_value: 0xEA,
        };
        assert_eq!(bus.read_byte(0x69, 0x00), Ok(0xEA));
        assert_eq!(bus.read_byte(0x0C, 0x01), Err(I2cBusError::Nack));
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(I2cConfig::default().frequency, 100_000);
        assert_eq!(I2cConfig::FAST.frequency, 400_000);
    }
}
