//! Board-agnostic event pipeline for the handheld locator
//!
//! Two producers run independently of each other:
//!
//! - the GPS receive task, emitting one [`Message::Gps`] per NMEA line
//! - the magnetometer task, emitting one [`Message::Heading`] per sample
//!
//! Both feed a single [`EventBus`], drained in order by the render loop.
//!
//! This crate contains the pieces shared by every context:
//!
//! - [`message`] - the tagged event type
//! - [`bus`] - unbounded MPSC queue with a blocking `get`
//! - [`compass`] - raw magnetometer counts to heading in degrees

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod bus;
pub mod compass;
pub mod message;

pub use bus::EventBus;
pub use message::{Message, MessageKind};
