//! ICM-20948 / AK09916 magnetometer (I2C bypass mode)
//!
//! The ICM-20948 carries an AK09916 magnetometer on its auxiliary I2C bus.
//! With bypass enabled (INT_PIN_CFG.BYPASS_EN) the auxiliary bus is wired
//! straight through, so the AK09916 answers at its own address on the host
//! bus. The ICM's internal I2C master is never used; driving both paths at
//! once makes the magnetometer silently stop answering.
//!
//! # Register banks
//!
//! The ICM-20948 register space is split into 4 banks selected through
//! REG_BANK_SEL (0x7F, present in every bank). The driver caches the
//! selected bank and only writes REG_BANK_SEL when it changes. The cache
//! starts out unknown, so the first access always selects explicitly.
//!
//! # Sampling
//!
//! ```text
//! HXL HXH HYL HYH HZL HZH   (6 bytes, little-endian i16)
//! ST2                       (must be read to release the data registers)
//! ```

use embedded_hal::delay::DelayNs;
use locsvc_core::compass::RawSample;
use locsvc_core::{EventBus, Message};
use locsvc_hal::I2cBus;

/// ICM-20948 registers (user bank 0 unless noted)
pub mod reg {
    /// Device identity
    pub const WHO_AM_I: u8 = 0x00;
    /// Power management 1 (reset, sleep, clock)
    pub const PWR_MGMT_1: u8 = 0x06;
    /// Interrupt pin / bypass configuration
    pub const INT_PIN_CFG: u8 = 0x0F;
    /// Bank select, present in every bank
    pub const REG_BANK_SEL: u8 = 0x7F;
}

/// ICM-20948 register values
pub mod val {
    /// Expected WHO_AM_I
    pub const WHO_AM_I: u8 = 0xEA;
    /// WHO_AM_I as read when a previous boot already left bypass enabled
    pub const WHO_AM_I_BYPASSED: u8 = 0x00;
    /// PWR_MGMT_1: device reset
    pub const DEVICE_RESET: u8 = 0x80;
    /// PWR_MGMT_1: wake, auto-select best clock
    pub const CLKSEL_AUTO: u8 = 0x01;
    /// INT_PIN_CFG: auxiliary I2C bypass
    pub const BYPASS_EN: u8 = 0x02;
}

/// AK09916 registers and values
pub mod ak09916 {
    /// Default I2C address
    pub const ADDRESS: u8 = 0x0C;
    /// Device ID
    pub const WIA2: u8 = 0x01;
    /// Expected WIA2
    pub const WHO_AM_I: u8 = 0x09;
    /// X axis low byte, start of the 6-byte measurement block
    pub const HXL: u8 = 0x11;
    /// Status 2, read to end a measurement
    pub const ST2: u8 = 0x18;
    /// Operation mode
    pub const CNTL2: u8 = 0x31;
    /// ST2: magnetic sensor overflow
    pub const ST2_HOFL: u8 = 0x08;
}

/// ICM-20948 user bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    Bank0,
    Bank1,
    Bank2,
    Bank3,
}

impl Bank {
    /// REG_BANK_SEL value (bank number in bits 5:4)
    pub const fn register_value(self) -> u8 {
        (self as u8) << 4
    }
}

/// AK09916 CNTL2 operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementMode {
    PowerDown = 0x00,
    Single = 0x01,
    Continuous10Hz = 0x02,
    Continuous20Hz = 0x04,
    Continuous50Hz = 0x06,
    Continuous100Hz = 0x08,
}

/// Magnetometer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagnetometerError {
    /// I2C transfer failed
    Bus,
    /// ICM-20948 WHO_AM_I did not match (value read)
    ImuIdMismatch(u8),
    /// AK09916 WIA2 did not match (value read)
    MagIdMismatch(u8),
    /// INT_PIN_CFG read back without BYPASS_EN (value read)
    BypassNotEnabled(u8),
    /// Measurement saturated; sample discarded
    Overflow,
    /// `read` called before a successful `init`
    NotInitialized,
}

/// Magnetometer configuration
#[derive(Debug, Clone, Copy)]
pub struct MagnetometerConfig {
    /// ICM-20948 address (0x68 with AD0 low, 0x69 with AD0 high)
    pub imu_address: u8,
    /// AK09916 address on the bypassed bus
    pub mag_address: u8,
    /// Continuous measurement mode written at init
    pub mode: MeasurementMode,
    /// Wait after device reset
    pub reset_delay_ms: u32,
    /// Wait after switching the measurement mode
    pub mode_settle_ms: u32,
    /// Sampling period of the polling task
    pub sample_period_ms: u64,
}

impl Default for MagnetometerConfig {
    fn default() -> Self {
        Self {
            imu_address: 0x69,
            mag_address: ak09916::ADDRESS,
            mode: MeasurementMode::Continuous10Hz,
            reset_delay_ms: 5,
            mode_settle_ms: 50,
            sample_period_ms: 300,
        }
    }
}

/// ICM-20948 host with its AK09916 magnetometer
pub struct Icm20948<I2C> {
    i2c: I2C,
    config: MagnetometerConfig,
    /// Bank the device currently has selected, `None` until first selected
    bank: Option<Bank>,
    initialized: bool,
}

impl<I2C: I2cBus> Icm20948<I2C> {
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(i2c: I2C, config: MagnetometerConfig) -> Self {
        Self {
            i2c,
            config,
            bank: None,
            initialized: false,
        }
    }

    /// Driver configuration
    pub fn config(&self) -> &MagnetometerConfig {
        &self.config
    }

    /// Cached bank selection
    pub fn current_bank(&self) -> Option<Bank> {
        self.bank
    }

    /// True once `init` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Give back the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Select `bank`, writing REG_BANK_SEL only if the cache differs
    ///
    /// The cache is updated only after the write succeeds.
    pub fn select_bank(&mut self, bank: Bank) -> Result<(), MagnetometerError> {
        if self.bank == Some(bank) {
            return Ok(());
        }
        self.i2c
            .write_byte(self.config.imu_address, reg::REG_BANK_SEL, bank.register_value())
            .map_err(|_| MagnetometerError::Bus)?;
        self.bank = Some(bank);
        Ok(())
    }

    fn read_register(&mut self, bank: Bank, reg: u8) -> Result<u8, MagnetometerError> {
        self.select_bank(bank)?;
        self.i2c
            .read_byte(self.config.imu_address, reg)
            .map_err(|_| MagnetometerError::Bus)
    }

    fn write_register(&mut self, bank: Bank, reg: u8, value: u8) -> Result<(), MagnetometerError> {
        self.select_bank(bank)?;
        self.i2c
            .write_byte(self.config.imu_address, reg, value)
            .map_err(|_| MagnetometerError::Bus)
    }

    fn read_mag(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), MagnetometerError> {
        self.i2c
            .write_read(self.config.mag_address, &[reg], buf)
            .map_err(|_| MagnetometerError::Bus)
    }

    fn write_mag(&mut self, reg: u8, value: u8) -> Result<(), MagnetometerError> {
        self.i2c
            .write_byte(self.config.mag_address, reg, value)
            .map_err(|_| MagnetometerError::Bus)
    }

    /// Bring up both devices
    ///
    /// 1. Bank 0, check WHO_AM_I. A zero read means bypass is already on
    ///    from a previous boot and the reset is skipped.
    /// 2. Reset, wake with auto clock, enable bypass and verify it.
    /// 3. Check the AK09916 WIA2 over the bypassed bus.
    /// 4. Start continuous measurement.
    ///
    /// Any failure aborts; no step is retried.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MagnetometerError> {
        self.initialized = false;

        // Step 1: identity
        self.select_bank(Bank::Bank0)?;
        let whoami = self.read_register(Bank::Bank0, reg::WHO_AM_I)?;
        match whoami {
            val::WHO_AM_I => {
                log_info!("ICM-20948 detected (WHO_AM_I: {:#x})", whoami);
                self.enable_bypass(delay)?;
            }
            val::WHO_AM_I_BYPASSED => {
                log_info!("ICM-20948 already in bypass, skipping reset");
            }
            other => {
                log_error!(
                    "ICM-20948 WHO_AM_I mismatch: expected {:#x}, got {:#x}",
                    val::WHO_AM_I,
                    other
                );
                return Err(MagnetometerError::ImuIdMismatch(other));
            }
        }

        // Step 3: magnetometer identity through the bypassed bus
        let mut wia = [0u8; 1];
        self.read_mag(ak09916::WIA2, &mut wia)?;
        if wia[0] != ak09916::WHO_AM_I {
            log_error!(
                "AK09916 WHO_AM_I mismatch: expected {:#x}, got {:#x}",
                ak09916::WHO_AM_I,
                wia[0]
            );
            return Err(MagnetometerError::MagIdMismatch(wia[0]));
        }
        log_debug!("AK09916 detected (WIA2: {:#x})", wia[0]);

        // Step 4: continuous measurement
        self.write_mag(ak09916::CNTL2, self.config.mode as u8)?;
        delay.delay_ms(self.config.mode_settle_ms);

        self.initialized = true;
        log_info!("magnetometer initialized ({:?})", self.config.mode);
        Ok(())
    }

    /// Step 2 of [`init`](Self::init)
    fn enable_bypass<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MagnetometerError> {
        self.write_register(Bank::Bank0, reg::PWR_MGMT_1, val::DEVICE_RESET)?;
        delay.delay_ms(self.config.reset_delay_ms);
        // Reset puts the device back in bank 0
        self.bank = Some(Bank::Bank0);

        self.write_register(Bank::Bank0, reg::PWR_MGMT_1, val::CLKSEL_AUTO)?;
        delay.delay_ms(self.config.reset_delay_ms);

        self.write_register(Bank::Bank0, reg::INT_PIN_CFG, val::BYPASS_EN)?;
        delay.delay_ms(self.config.reset_delay_ms);

        let int_cfg = self.read_register(Bank::Bank0, reg::INT_PIN_CFG)?;
        if int_cfg & val::BYPASS_EN == 0 {
            log_error!("failed to enable I2C bypass (INT_PIN_CFG: {:#x})", int_cfg);
            return Err(MagnetometerError::BypassNotEnabled(int_cfg));
        }
        log_debug!("I2C bypass enabled (INT_PIN_CFG: {:#x})", int_cfg);
        Ok(())
    }

    /// Read one raw measurement and release the data registers
    pub fn read_raw(&mut self) -> Result<RawSample, MagnetometerError> {
        if !self.initialized {
            return Err(MagnetometerError::NotInitialized);
        }

        // Bypass is configured in bank 0
        self.select_bank(Bank::Bank0)?;

        let mut data = [0u8; 6];
        self.read_mag(ak09916::HXL, &mut data)?;

        let mut st2 = [0u8; 1];
        self.read_mag(ak09916::ST2, &mut st2)?;
        if st2[0] & ak09916::ST2_HOFL != 0 {
            return Err(MagnetometerError::Overflow);
        }

        Ok(RawSample::from_le_bytes(data))
    }

    /// Read one measurement and return the heading in whole degrees
    pub fn read(&mut self) -> Result<i16, MagnetometerError> {
        let raw = self.read_raw()?;
        Ok(raw.to_field().heading())
    }

    /// Sample once and queue the heading on `bus`
    ///
    /// A failed sample is logged and skipped. Returns whether a message was
    /// queued.
    pub fn publish(&mut self, bus: &EventBus) -> bool {
        match self.read() {
            Ok(heading) => {
                bus.put(Message::Heading(heading));
                true
            }
            Err(e) => {
                log_warn!("magnetometer sample skipped: {:?}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locsvc_hal::I2cBusError;
    // std critical-section implementation for the bus mutex
    use critical_section as _;

    const IMU: u8 = 0x69;

    /// Register-level model of the ICM-20948 + AK09916 pair
    struct MockBus {
        imu: [[u8; 128]; 4],
        bank: usize,
        mag: [u8; 0x40],
        /// (address, register, value) for every write
        writes: Vec<(u8, u8, u8)>,
        /// (address, start register, length) for every read
        reads: Vec<(u8, u8, usize)>,
        /// Ignore BYPASS_EN writes
        bypass_stuck_off: bool,
        fail: bool,
    }

    impl MockBus {
        fn new() -> Self {
            let mut bus = Self {
                imu: [[0; 128]; 4],
                bank: 0,
                mag: [0; 0x40],
                writes: Vec::new(),
                reads: Vec::new(),
                bypass_stuck_off: false,
                fail: false,
            };
            bus.imu[0][reg::WHO_AM_I as usize] = val::WHO_AM_I;
            bus.mag[ak09916::WIA2 as usize] = ak09916::WHO_AM_I;
            bus
        }

        fn bypass_enabled(&self) -> bool {
            self.imu[0][reg::INT_PIN_CFG as usize] & val::BYPASS_EN != 0
        }

        fn bank_writes(&self) -> usize {
            self.writes
                .iter()
                .filter(|(addr, reg, _)| *addr == IMU && *reg == reg::REG_BANK_SEL)
                .count()
        }

        fn set_sample(&mut self, x: i16, y: i16, z: i16) {
            let start = ak09916::HXL as usize;
            self.mag[start..start + 2].copy_from_slice(&x.to_le_bytes());
            self.mag[start + 2..start + 4].copy_from_slice(&y.to_le_bytes());
            self.mag[start + 4..start + 6].copy_from_slice(&z.to_le_bytes());
        }
    }

    impl I2cBus for MockBus {
        type Error = I2cBusError;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(I2cBusError::Bus);
            }
            let [reg, value] = *data else {
                return Err(I2cBusError::Other);
            };
            self.writes.push((address, reg, value));

            match address {
                IMU if reg == reg::REG_BANK_SEL => self.bank = ((value >> 4) & 0x3) as usize,
                IMU if reg == reg::PWR_MGMT_1 && value & val::DEVICE_RESET != 0 => {
                    self.bank = 0;
                    self.imu[0][reg::INT_PIN_CFG as usize] = 0;
                }
                IMU if reg == reg::INT_PIN_CFG && self.bypass_stuck_off => {}
                IMU => self.imu[self.bank][reg as usize] = value,
                ak09916::ADDRESS if self.bypass_enabled() => self.mag[reg as usize] = value,
                _ => return Err(I2cBusError::Nack),
            }
            Ok(())
        }

        fn write_read(
            &mut self,
            address: u8,
            write_data: &[u8],
            read_buf: &mut [u8],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(I2cBusError::Bus);
            }
            let start = write_data[0] as usize;
            self.reads.push((address, write_data[0], read_buf.len()));

            match address {
                IMU => read_buf.copy_from_slice(&self.imu[self.bank][start..start + read_buf.len()]),
                ak09916::ADDRESS if self.bypass_enabled() => {
                    read_buf.copy_from_slice(&self.mag[start..start + read_buf.len()])
                }
                _ => return Err(I2cBusError::Nack),
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
        calls: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
            self.calls.push(ns);
        }
    }

    fn driver(bus: MockBus) -> Icm20948<MockBus> {
        Icm20948::new(bus, MagnetometerConfig::default())
    }

    #[test]
    fn test_default_config() {
        let cfg = MagnetometerConfig::default();
        assert_eq!(cfg.imu_address, 0x69);
        assert_eq!(cfg.mag_address, 0x0C);
        assert_eq!(cfg.sample_period_ms, 300);
        assert!(cfg.reset_delay_ms >= 1);
        assert!(cfg.mode_settle_ms >= 50);
    }

    #[test]
    fn test_bank_register_values() {
        assert_eq!(Bank::Bank0.register_value(), 0x00);
        assert_eq!(Bank::Bank1.register_value(), 0x10);
        assert_eq!(Bank::Bank2.register_value(), 0x20);
        assert_eq!(Bank::Bank3.register_value(), 0x30);
    }

    #[test]
    fn test_select_bank_writes_only_on_change() {
        let mut dev = driver(MockBus::new());
        let sequence = [
            (Bank::Bank0, true),
            (Bank::Bank0, false),
            (Bank::Bank2, true),
            (Bank::Bank2, false),
            (Bank::Bank2, false),
            (Bank::Bank1, true),
            (Bank::Bank0, true),
            (Bank::Bank0, false),
        ];

        let mut expected = 0;
        for (bank, writes) in sequence {
            dev.select_bank(bank).unwrap();
            if writes {
                expected += 1;
            }
            assert_eq!(dev.current_bank(), Some(bank));
            assert_eq!(dev.i2c.bank_writes(), expected, "after selecting {:?}", bank);
        }
        assert_eq!(dev.i2c.bank, 0);
    }

    #[test]
    fn test_select_bank_failure_keeps_cache() {
        let mut dev = driver(MockBus::new());
        dev.select_bank(Bank::Bank0).unwrap();

        dev.i2c.fail = true;
        assert_eq!(dev.select_bank(Bank::Bank3), Err(MagnetometerError::Bus));
        assert_eq!(dev.current_bank(), Some(Bank::Bank0));

        // Retrying after the bus recovers still issues the write
        dev.i2c.fail = false;
        dev.select_bank(Bank::Bank3).unwrap();
        assert_eq!(dev.i2c.bank, 3);
    }

    #[test]
    fn test_init_full_sequence() {
        let mut dev = driver(MockBus::new());
        let mut delay = MockDelay::default();
        dev.init(&mut delay).unwrap();

        assert!(dev.is_initialized());
        assert_eq!(
            dev.i2c.writes,
            vec![
                (IMU, reg::REG_BANK_SEL, 0x00),
                (IMU, reg::PWR_MGMT_1, val::DEVICE_RESET),
                (IMU, reg::PWR_MGMT_1, val::CLKSEL_AUTO),
                (IMU, reg::INT_PIN_CFG, val::BYPASS_EN),
                (ak09916::ADDRESS, ak09916::CNTL2, MeasurementMode::Continuous10Hz as u8),
            ]
        );
        // Reset wait of at least 1 ms, then at least 50 ms for the mode switch
        assert!(delay.calls[0] >= 1_000_000);
        assert!(*delay.calls.last().unwrap() >= 50_000_000);
        assert_eq!(dev.current_bank(), Some(Bank::Bank0));
    }

    #[test]
    fn test_init_skips_reset_when_already_bypassed() {
        let mut bus = MockBus::new();
        bus.imu[0][reg::WHO_AM_I as usize] = val::WHO_AM_I_BYPASSED;
        bus.imu[0][reg::INT_PIN_CFG as usize] = val::BYPASS_EN;
        let mut dev = driver(bus);

        dev.init(&mut MockDelay::default()).unwrap();

        assert!(!dev
            .i2c
            .writes
            .iter()
            .any(|(_, reg, value)| *reg == reg::PWR_MGMT_1 && *value == val::DEVICE_RESET));
        assert_eq!(
            dev.i2c.writes.last(),
            Some(&(ak09916::ADDRESS, ak09916::CNTL2, MeasurementMode::Continuous10Hz as u8))
        );
    }

    #[test]
    fn test_init_rejects_unknown_imu() {
        let mut bus = MockBus::new();
        bus.imu[0][reg::WHO_AM_I as usize] = 0x71;
        let mut dev = driver(bus);

        assert_eq!(
            dev.init(&mut MockDelay::default()),
            Err(MagnetometerError::ImuIdMismatch(0x71))
        );
        assert!(!dev.is_initialized());
        // Only the bank select went out
        assert_eq!(dev.i2c.writes.len(), 1);
    }

    #[test]
    fn test_init_rejects_unknown_magnetometer() {
        let mut bus = MockBus::new();
        bus.mag[ak09916::WIA2 as usize] = 0x48;
        let mut dev = driver(bus);

        assert_eq!(
            dev.init(&mut MockDelay::default()),
            Err(MagnetometerError::MagIdMismatch(0x48))
        );
        assert!(!dev.is_initialized());
    }

    #[test]
    fn test_init_detects_bypass_failure() {
        let mut bus = MockBus::new();
        bus.bypass_stuck_off = true;
        let mut dev = driver(bus);

        assert_eq!(
            dev.init(&mut MockDelay::default()),
            Err(MagnetometerError::BypassNotEnabled(0x00))
        );
    }

    #[test]
    fn test_init_bus_error_is_fatal() {
        let mut bus = MockBus::new();
        bus.fail = true;
        let mut dev = driver(bus);

        assert_eq!(dev.init(&mut MockDelay::default()), Err(MagnetometerError::Bus));
        assert_eq!(dev.current_bank(), None);
    }

    #[test]
    fn test_read_before_init() {
        let mut dev = driver(MockBus::new());
        assert_eq!(dev.read(), Err(MagnetometerError::NotInitialized));
    }

    #[test]
    fn test_read_sample_and_status() {
        let mut dev = driver(MockBus::new());
        dev.init(&mut MockDelay::default()).unwrap();
        dev.i2c.reads.clear();

        dev.i2c.set_sample(0, 200, -40);
        assert_eq!(dev.read(), Ok(90));

        assert_eq!(
            dev.i2c.reads,
            vec![(ak09916::ADDRESS, ak09916::HXL, 6), (ak09916::ADDRESS, ak09916::ST2, 1)]
        );
    }

    #[test]
    fn test_read_headings() {
        let mut dev = driver(MockBus::new());
        dev.init(&mut MockDelay::default()).unwrap();

        dev.i2c.set_sample(100, 0, 0);
        assert_eq!(dev.read(), Ok(0));
        dev.i2c.set_sample(-100, 0, 0);
        assert_eq!(dev.read(), Ok(180));
        dev.i2c.set_sample(0, -100, 0);
        assert_eq!(dev.read(), Ok(270));
    }

    #[test]
    fn test_read_reselects_bank0() {
        let mut dev = driver(MockBus::new());
        dev.init(&mut MockDelay::default()).unwrap();
        dev.select_bank(Bank::Bank2).unwrap();

        dev.read().unwrap();
        assert_eq!(dev.current_bank(), Some(Bank::Bank0));
        assert_eq!(dev.i2c.bank, 0);
    }

    #[test]
    fn test_overflow_discards_sample() {
        let mut dev = driver(MockBus::new());
        dev.init(&mut MockDelay::default()).unwrap();
        dev.i2c.mag[ak09916::ST2 as usize] = ak09916::ST2_HOFL;

        assert_eq!(dev.read(), Err(MagnetometerError::Overflow));
    }

    #[test]
    fn test_publish_queues_heading() {
        let bus = EventBus::new();
        let mut dev = driver(MockBus::new());
        dev.init(&mut MockDelay::default()).unwrap();
        dev.i2c.set_sample(-100, 0, 0);

        assert!(dev.publish(&bus));
        assert_eq!(bus.try_get(), Some(Message::Heading(180)));
    }

    #[test]
    fn test_publish_skips_failed_sample() {
        let bus = EventBus::new();
        let mut dev = driver(MockBus::new());
        dev.init(&mut MockDelay::default()).unwrap();

        dev.i2c.fail = true;
        assert!(!dev.publish(&bus));
        assert!(bus.is_empty());

        // Loop keeps going once the bus recovers
        dev.i2c.fail = false;
        assert!(dev.publish(&bus));
        assert_eq!(bus.len(), 1);
    }
}
