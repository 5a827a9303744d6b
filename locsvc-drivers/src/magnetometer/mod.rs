//! Magnetometer drivers

pub mod icm20948;

pub use icm20948::{Bank, Icm20948, MagnetometerConfig, MagnetometerError, MeasurementMode};
