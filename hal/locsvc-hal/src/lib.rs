//! Locator Hardware Abstraction Layer
//!
//! This crate defines the transport traits the locator drivers are written
//! against. Chip-specific crates (see `locsvc-hal-stm32`) implement them on
//! top of the vendor HAL, and the driver tests implement them with mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  locsvc-drivers (magnetometer, LCD)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  locsvc-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  locsvc-hal-stm32 (embassy-stm32)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (reset, register select)
//! - [`i2c::I2cBus`] - I2C master operations
//! - [`spi::SpiBus`] - Single-direction SPI writes
//!
//! [`uart::UartConfig`] carries the serial settings for the GPS receiver;
//! reception itself is driven by the firmware through the receive buffers
//! in `locsvc-protocol`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::{I2cBus, I2cBusError};
pub use spi::{SpiBus, SpiBusError};
pub use uart::UartConfig;
