//! Hardware driver implementations
//!
//! This crate provides the concrete drivers behind the locator pipeline,
//! written against the `locsvc-hal` transport traits:
//!
//! - Magnetometer (ICM-20948 with AK09916 in I2C bypass)
//! - LCD (C12832A1Z, ST7565R-class controller over write-only SPI)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
extern crate locsvc_core;

pub mod display;
pub mod magnetometer;
