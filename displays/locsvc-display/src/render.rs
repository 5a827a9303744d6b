//! Render loop: the single consumer of the event bus
//!
//! Every message goes to the updater for its tag. When an updater reports
//! a change, the whole frame is redrawn and flushed; otherwise the panel is
//! left alone. Display errors are logged and that frame is dropped; the
//! next change redraws everything anyway.

use locsvc_core::{EventBus, Message};

use crate::backend::{DisplayDevice, DisplayError};
use crate::framebuffer::Framebuffer;
use crate::screen::Screen;

/// Bus consumer driving one display
pub struct RenderLoop<D: DisplayDevice> {
    display: D,
    screen: Screen,
    fb: Framebuffer,
    redraws: u32,
}

impl<D: DisplayDevice> RenderLoop<D> {
    /// Create a render loop with placeholder fields
    pub fn new(display: D) -> Self {
        Self::with_screen(display, Screen::new())
    }

    /// Create a render loop starting from `screen`
    pub fn with_screen(display: D, screen: Screen) -> Self {
        Self {
            display,
            screen,
            fb: Framebuffer::new(),
            redraws: 0,
        }
    }

    /// Current frame state
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Underlying display
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Number of frames flushed so far
    pub fn redraws(&self) -> u32 {
        self.redraws
    }

    /// Apply one message, redrawing if anything changed
    ///
    /// Returns whether a redraw was attempted.
    pub fn handle(&mut self, msg: Message) -> bool {
        let changed = match msg {
            Message::Gps(line) => self.screen.update_gps(&line),
            Message::Heading(degrees) => self.screen.update_heading(degrees),
            other => {
                log_warn!("render: dropping unknown message {:?}", other);
                false
            }
        };

        if changed {
            if let Err(e) = self.redraw() {
                log_error!("render: display write failed: {:?}", e);
            }
        }
        changed
    }

    /// Clear, print every field, and flush to the display
    pub fn redraw(&mut self) -> Result<(), DisplayError> {
        self.screen.draw(&mut self.fb);
        self.fb.finalize(&mut self.display)?;
        self.redraws += 1;
        Ok(())
    }

    /// Consume `bus` forever
    ///
    /// Draws the placeholder frame first so the panel never shows stale RAM.
    pub async fn run(&mut self, bus: &EventBus) {
        if let Err(e) = self.redraw() {
            log_error!("render: initial draw failed: {:?}", e);
        }
        loop {
            let msg = bus.get().await;
            self.handle(msg);
        }
    }
}
