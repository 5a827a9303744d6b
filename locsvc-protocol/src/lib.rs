//! GPS receive pipeline: buffers, line framing and NMEA decoding
//!
//! The GPS receiver streams NMEA 0183 sentences over a UART. Bytes arrive
//! in arbitrary chunks, one chunk per completed receive, and are turned into
//! structured fixes in three stages:
//!
//! ```text
//!   UART ──► RxBuffers (double buffer) ──► LineFramer ──► nmea::decode
//!            transport ⇄ framer hand-off    CR/LF lines     $GNGGA fix
//! ```
//!
//! A sentence on the wire looks like:
//! ```text
//! $GNGGA,114529.000,4656.2592,N,00725.8373,E,2,09,1.23*hh\r\n
//! ```
//!
//! Nothing here allocates. Lines are bounded [`heapless::Vec`]s and overlong
//! input is dropped rather than reported.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod framer;
pub mod nmea;
pub mod rxbuf;

pub use framer::{FramerError, Line, LineFramer, LINE_CAPACITY};
pub use nmea::{decode, Decoded, GgaFix, SentenceId, GNGGA};
pub use rxbuf::{RxBuffers, RxGrant, RxReady, SlotOwner, RX_BUFFER_LEN};
