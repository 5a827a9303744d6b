//! Display side of the locator
//!
//! This crate provides:
//! - [`DisplayDevice`], the capability interface a panel driver implements
//! - [`Framebuffer`], a 1bpp page-tiled buffer that `embedded-graphics`
//!   draws text into
//! - [`Screen`], the three text fields currently shown
//! - [`RenderLoop`], the bus consumer that keeps the panel up to date
//!
//! # Data flow
//!
//! ```text
//! EventBus ─► RenderLoop ─► Screen (changed?) ─► Framebuffer ─► DisplayDevice
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate locsvc_core;

pub mod backend;
pub mod framebuffer;
pub mod render;
pub mod screen;

// Re-export key types
pub use backend::{BufferDescriptor, Capabilities, DisplayDevice, DisplayError, PixelFormat};
pub use framebuffer::Framebuffer;
pub use render::RenderLoop;
pub use screen::Screen;
