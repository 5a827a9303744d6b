//! GPIO output wrapper

use embassy_stm32::gpio::Output;
use locsvc_hal::OutputPin;

/// Push-pull output implementing [`OutputPin`]
pub struct Pin<'d> {
    inner: Output<'d>,
}

impl<'d> Pin<'d> {
    /// Wrap a configured embassy output
    pub fn new(inner: Output<'d>) -> Self {
        Self { inner }
    }
}

impl OutputPin for Pin<'_> {
    fn set_high(&mut self) {
        self.inner.set_high();
    }

    fn set_low(&mut self) {
        self.inner.set_low();
    }

    fn toggle(&mut self) {
        self.inner.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.inner.is_set_high()
    }
}
