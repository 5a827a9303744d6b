//! STM32-specific HAL for the locator firmware
//!
//! This crate wraps embassy-stm32 peripherals so they implement the
//! `locsvc-hal` transport traits, and converts the shared configuration
//! types into embassy's. Supported chips:
//!
//! - STM32F429ZI (Nucleo-144 reference board)
//!
//! # Features
//!
//! - `stm32f429zi` - Enable support for STM32F429ZI
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod uart;

pub use gpio::Pin;
pub use i2c::BlockingI2c;
pub use spi::LcdSpi;
