//! C12832A1Z LCD driver
//!
//! 128x32 monochrome panel on an ST7565R-class controller, driven over
//! write-only SPI. Two GPIO lines complete the interface:
//!
//! - A0 selects instruction (low) or display data (high)
//! - RST is the active-low hardware reset
//!
//! # Display RAM
//!
//! The controller RAM is split into 4 pages of 8 pixel rows. Each byte
//! written in data mode fills one column of the current page, bit 7 on top,
//! and the column address advances by itself. A full frame is therefore
//! 4 x 128 bytes, sent one page at a time.
//!
//! Panel revisions differ in how pages map to physical rows, so page order
//! and byte reversal are [`C12832Config`] calibration values.

use embedded_hal::delay::DelayNs;
use locsvc_display::backend::screen_info;
use locsvc_display::{BufferDescriptor, Capabilities, DisplayDevice, DisplayError, PixelFormat};
use locsvc_hal::{OutputPin, SpiBus};

/// Columns per page
pub const PAGE_WIDTH: usize = 128;
/// Pages on the panel
pub const PAGE_COUNT: usize = 4;
/// Bytes in a full frame
pub const FRAME_LEN: usize = PAGE_WIDTH * PAGE_COUNT;

/// Controller instructions
pub mod cmd {
    /// Segment driver direction: normal
    pub const ADC_NORMAL: u8 = 0xA0;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    /// Common output scan direction: reversed
    pub const COMMON_OUTPUT_MODE_REVERSE: u8 = 0xC8;
    /// LCD bias 1/9
    pub const BIAS_ONE_NINTH: u8 = 0xA2;
    /// Booster, regulator and follower all on
    pub const POWER_CONTROL_SET_7: u8 = 0x2F;
    /// V0 internal resistor ratio 1
    pub const INTERNAL_RESISTOR_RATIO_1: u8 = 0x21;
    /// Page address set, page number in the low nibble
    pub const PAGE_BASE: u8 = 0xB0;
    /// Column address set, upper nibble (column 0)
    pub const COLUMN_BASE: u8 = 0x10;
}

/// Initialization sequence sent after the reset pulse
const INIT_SEQUENCE: [u8; 7] = [
    cmd::ADC_NORMAL,
    cmd::DISPLAY_OFF,
    cmd::COMMON_OUTPUT_MODE_REVERSE,
    cmd::BIAS_ONE_NINTH,
    cmd::POWER_CONTROL_SET_7,
    cmd::INTERNAL_RESISTOR_RATIO_1,
    cmd::DISPLAY_ON,
];

/// Order in which framebuffer pages are sent to controller pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageOrder {
    /// Framebuffer page `i` goes to controller page `i`
    Forward,
    /// Framebuffer page `i` goes to controller page `3 - i`
    Reverse,
}

/// Panel calibration
#[derive(Debug, Clone, Copy)]
pub struct C12832Config {
    /// Page mapping
    pub page_order: PageOrder,
    /// Send the frame back to front (rotates the image by 180 degrees
    /// together with `COMMON_OUTPUT_MODE_REVERSE`)
    pub reverse_bytes: bool,
    /// RST low time in milliseconds
    pub reset_pulse_ms: u32,
}

impl Default for C12832Config {
    fn default() -> Self {
        Self {
            page_order: PageOrder::Forward,
            reverse_bytes: false,
            reset_pulse_ms: 1,
        }
    }
}

/// C12832A1Z panel
pub struct C12832<SPI, A0, RST> {
    spi: SPI,
    a0: A0,
    rst: RST,
    config: C12832Config,
    initialized: bool,
}

impl<SPI, A0, RST> C12832<SPI, A0, RST>
where
    SPI: SpiBus,
    A0: OutputPin,
    RST: OutputPin,
{
    /// Create a driver; the panel is untouched until [`init`](Self::init)
    pub fn new(spi: SPI, a0: A0, rst: RST, config: C12832Config) -> Self {
        Self {
            spi,
            a0,
            rst,
            config,
            initialized: false,
        }
    }

    /// Panel calibration
    pub fn config(&self) -> &C12832Config {
        &self.config
    }

    /// True once `init` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Give back the bus and pins
    pub fn release(self) -> (SPI, A0, RST) {
        (self.spi, self.a0, self.rst)
    }

    /// Reset the controller and run the power-up sequence
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError> {
        self.rst.set_low();
        delay.delay_ms(self.config.reset_pulse_ms);
        self.rst.set_high();

        self.instruction_mode();
        for &c in INIT_SEQUENCE.iter() {
            self.command(c)?;
        }

        self.initialized = true;
        log_info!("c12832: initialized");
        Ok(())
    }

    fn instruction_mode(&mut self) {
        self.a0.set_low();
    }

    fn data_mode(&mut self) {
        self.a0.set_high();
    }

    /// Send one instruction; A0 must already be low
    fn command(&mut self, c: u8) -> Result<(), DisplayError> {
        self.spi.write(&[c]).map_err(|_| {
            log_error!("c12832: instruction {:#x} failed", c);
            DisplayError::Communication
        })
    }

    /// Address one page and send its columns; always returns with A0 low
    fn write_page(&mut self, page: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.instruction_mode();
        self.command(cmd::PAGE_BASE + page)?;
        self.command(cmd::COLUMN_BASE)?;

        self.data_mode();
        let sent = self.spi.write(data);
        self.instruction_mode();
        sent.map_err(|_| {
            log_error!("c12832: page {} data write failed", page);
            DisplayError::Communication
        })
    }

    fn controller_page(&self, index: usize) -> u8 {
        let page = match self.config.page_order {
            PageOrder::Forward => index,
            PageOrder::Reverse => PAGE_COUNT - 1 - index,
        };
        page as u8
    }
}

impl<SPI, A0, RST> DisplayDevice for C12832<SPI, A0, RST>
where
    SPI: SpiBus,
    A0: OutputPin,
    RST: OutputPin,
{
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            x_resolution: 128,
            y_resolution: 64,
            supported_pixel_formats: PixelFormat::Mono01 as u8 | PixelFormat::Mono10 as u8,
            current_pixel_format: PixelFormat::Mono10,
            screen_info: screen_info::MONO_VTILED | screen_info::MONO_MSB_FIRST,
        }
    }

    /// Send a full frame; the panel is always rewritten whole, so `x`, `y`
    /// and the descriptor geometry are not used for addressing
    fn write(
        &mut self,
        x: u16,
        y: u16,
        desc: &BufferDescriptor,
        buf: &[u8],
    ) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        if buf.len() < FRAME_LEN {
            log_warn!("c12832: bitmap of {} bytes, need {}", buf.len(), FRAME_LEN);
            return Err(DisplayError::BufferTooSmall);
        }
        log_trace!(
            "c12832: write {}x{} at ({}, {})",
            desc.width,
            desc.height,
            x,
            y
        );

        let mut reversed = [0u8; PAGE_WIDTH];
        for index in 0..PAGE_COUNT {
            let page = self.controller_page(index);
            let start = index * PAGE_WIDTH;

            let data: &[u8] = if self.config.reverse_bytes {
                for (j, b) in reversed.iter_mut().enumerate() {
                    *b = buf[FRAME_LEN - 1 - (start + j)];
                }
                &reversed
            } else {
                &buf[start..start + PAGE_WIDTH]
            };

            self.write_page(page, data)?;
        }
        Ok(())
    }
}
