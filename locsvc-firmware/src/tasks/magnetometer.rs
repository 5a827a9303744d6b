//! Magnetometer polling task

use defmt::*;
use embassy_time::{Duration, Ticker};

use locsvc_drivers::magnetometer::Icm20948;
use locsvc_hal_stm32::BlockingI2c;

use crate::channels::BUS;

/// Magnetometer task - publishes a heading every sample period
///
/// Failed or saturated samples are skipped; the next tick tries again.
#[embassy_executor::task]
pub async fn magnetometer_task(mut mag: Icm20948<BlockingI2c<'static>>) {
    let period = mag.config().sample_period_ms;
    info!("Magnetometer task started ({} ms period)", period);

    let mut ticker = Ticker::every(Duration::from_millis(period));

    loop {
        mag.publish(&BUS);
        ticker.next().await;
    }
}
