//! Display capability interface
//!
//! Drivers implement [`DisplayDevice`]. Only `capabilities` and `write` are
//! mandatory; everything else has a default that reports
//! [`DisplayError::NotSupported`] (or succeeds as a no-op for blanking), so
//! a panel that cannot do something says so instead of emulating it.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Operation not implemented by this controller
    NotSupported,
    /// Bitmap shorter than the region it describes
    BufferTooSmall,
    /// Display not initialized
    NotInitialized,
}

/// Pixel formats, as bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 1bpp, 0 = black
    Mono01 = 1 << 0,
    /// 1bpp, 1 = black
    Mono10 = 1 << 1,
}

/// Screen layout flags
pub mod screen_info {
    /// One byte covers 8 vertically stacked pixels
    pub const MONO_VTILED: u8 = 1 << 0;
    /// Bit 7 is the topmost pixel of a byte
    pub const MONO_MSB_FIRST: u8 = 1 << 1;
}

/// What a display can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    pub x_resolution: u16,
    pub y_resolution: u16,
    /// Bitmask of supported [`PixelFormat`]s
    pub supported_pixel_formats: u8,
    pub current_pixel_format: PixelFormat,
    /// Bitmask of [`screen_info`] flags
    pub screen_info: u8,
}

impl Capabilities {
    /// True if `format` is in the supported set
    pub fn supports(&self, format: PixelFormat) -> bool {
        self.supported_pixel_formats & format as u8 != 0
    }
}

/// Shape of a bitmap passed to [`DisplayDevice::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferDescriptor {
    /// Bitmap size in bytes
    pub buf_size: usize,
    pub width: u16,
    pub height: u16,
    /// Row stride in pixels
    pub pitch: u16,
}

/// Capability interface of a panel driver
pub trait DisplayDevice {
    /// Resolution, pixel formats and layout
    fn capabilities(&self) -> Capabilities;

    /// Render a bitmap region at (`x`, `y`)
    fn write(
        &mut self,
        x: u16,
        y: u16,
        desc: &BufferDescriptor,
        buf: &[u8],
    ) -> Result<(), DisplayError>;

    /// Read a region back from display RAM
    fn read(
        &mut self,
        _x: u16,
        _y: u16,
        _desc: &BufferDescriptor,
        _buf: &mut [u8],
    ) -> Result<(), DisplayError> {
        Err(DisplayError::NotSupported)
    }

    /// Direct access to the controller's framebuffer, if memory mapped
    fn framebuffer(&mut self) -> Option<&mut [u8]> {
        None
    }

    /// Blank the panel
    fn blanking_on(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Unblank the panel
    fn blanking_off(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Set backlight brightness
    fn set_brightness(&mut self, _brightness: u8) -> Result<(), DisplayError> {
        Err(DisplayError::NotSupported)
    }

    /// Set contrast
    fn set_contrast(&mut self, _contrast: u8) -> Result<(), DisplayError> {
        Err(DisplayError::NotSupported)
    }

    /// Switch pixel format
    fn set_pixel_format(&mut self, _format: PixelFormat) -> Result<(), DisplayError> {
        Err(DisplayError::NotSupported)
    }
}
