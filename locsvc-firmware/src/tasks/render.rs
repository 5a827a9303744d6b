//! LCD render task

use defmt::*;

use locsvc_display::RenderLoop;
use locsvc_drivers::display::C12832;
use locsvc_hal_stm32::{LcdSpi, Pin};

use crate::channels::BUS;

/// The board's LCD
pub type Lcd = C12832<LcdSpi<'static>, Pin<'static>, Pin<'static>>;

/// Render task - sole consumer of the bus
#[embassy_executor::task]
pub async fn render_task(mut render: RenderLoop<Lcd>) {
    info!("Render task started");
    render.run(&BUS).await;
}
