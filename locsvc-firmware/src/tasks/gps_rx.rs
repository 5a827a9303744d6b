//! GPS receive task
//!
//! DMA-receives into one of the two ping-pong buffers until the line goes
//! idle, then hands the filled buffer to the framer. Every complete line is
//! published on the bus.

use defmt::*;
use embassy_stm32::mode::Async;
use embassy_stm32::usart::UartRx;

use locsvc_core::Message;
use locsvc_hal_stm32::uart::UartBusError;
use locsvc_protocol::{LineFramer, RxBuffers};

use crate::channels::BUS;

/// GPS RX task - frames NMEA sentences from USART3
#[embassy_executor::task]
pub async fn gps_rx_task(mut rx: UartRx<'static, Async>) {
    info!("GPS RX task started");

    let mut buffers: RxBuffers = RxBuffers::new();
    let mut framer: LineFramer = LineFramer::new();

    let Some(mut grant) = buffers.request_next_buffer() else {
        defmt::panic!("GPS RX: no receive buffer at startup");
    };

    loop {
        let received = match rx.read_until_idle(buffers.transport_buf(&grant)).await {
            Ok(n) => n,
            Err(e) => {
                warn!("GPS RX: UART error {:?}", UartBusError::from(e));
                0
            }
        };
        trace!("GPS RX: {} bytes", received);

        let ready = buffers.complete(grant, received);
        grant = match framer.feed(&mut buffers, ready, 0, received, |line| {
            BUS.put(Message::Gps(line));
        }) {
            Ok(next) => next,
            Err(e) => defmt::panic!("GPS RX: receive stalled: {:?}", e),
        };
    }
}
