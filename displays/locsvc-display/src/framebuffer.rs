//! 1bpp framebuffer in the controller's page layout
//!
//! The panel is 128×32 pixels, split into 4 pages of 8 rows. Each byte is one
//! column of one page, bit 7 on top:
//!
//! ```text
//! byte[page * 128 + x] bit (7 - y % 8)  <=>  pixel (x, y), page = y / 8
//! ```
//!
//! The buffer implements `embedded-graphics`' [`DrawTarget`], so text is
//! rasterized by its mono fonts and the result is written to a
//! [`DisplayDevice`] in one [`Framebuffer::finalize`].

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::backend::{BufferDescriptor, DisplayDevice, DisplayError};

/// Panel width in pixels
pub const WIDTH: usize = 128;

/// Panel height in pixels
pub const HEIGHT: usize = 32;

/// Number of 8-row pages
pub const PAGES: usize = HEIGHT / 8;

/// Framebuffer size in bytes
pub const BUFFER_LEN: usize = WIDTH * PAGES;

/// Height of one text line in pixels
pub const LINE_HEIGHT: i32 = 10;

/// Page-tiled monochrome framebuffer
#[derive(Clone)]
pub struct Framebuffer {
    buf: [u8; BUFFER_LEN],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Create a blank framebuffer
    pub const fn new() -> Self {
        Self {
            buf: [0; BUFFER_LEN],
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Set one pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let idx = (y / 8) * WIDTH + x;
        let mask = 0x80 >> (y % 8);
        if on {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
    }

    /// Read one pixel; out of range reads as off
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.buf[(y / 8) * WIDTH + x] & (0x80 >> (y % 8)) != 0
    }

    /// Draw `text` with its top-left corner at (`x`, `y`)
    ///
    /// Glyphs that fall off the panel are clipped.
    pub fn print(&mut self, text: &str, x: i32, y: i32) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(self)
            .ok();
    }

    /// Raw page-major bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Shape of the whole buffer
    pub fn descriptor(&self) -> BufferDescriptor {
        BufferDescriptor {
            buf_size: BUFFER_LEN,
            width: WIDTH as u16,
            height: HEIGHT as u16,
            pitch: WIDTH as u16,
        }
    }

    /// Send the whole buffer to `display`
    pub fn finalize<D: DisplayDevice>(&self, display: &mut D) -> Result<(), DisplayError> {
        display.write(0, 0, &self.descriptor(), &self.buf)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}
