//! Handheld locator firmware
//!
//! Nucleo-F429ZI with a GPS receiver on USART3, an ICM-20948 breakout on
//! I2C1 and the C12832A1Z LCD on the Arduino SPI header. Three tasks share
//! one event bus:
//!
//! ```text
//! gps_rx ───────┐
//!               ├─► BUS ─► render ─► LCD
//! magnetometer ─┘
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::peripherals::USART3;
use embassy_stm32::spi::Spi;
use embassy_stm32::usart::{self, UartRx};
use embassy_time::Delay;
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use locsvc_display::RenderLoop;
use locsvc_drivers::display::{C12832Config, C12832};
use locsvc_drivers::magnetometer::{Icm20948, MagnetometerConfig};
use locsvc_hal::i2c::I2cConfig;
use locsvc_hal::spi::SpiConfig;
use locsvc_hal::UartConfig;
use locsvc_hal_stm32::{BlockingI2c, LcdSpi, Pin};

mod channels;
mod tasks;

// Heap for the event queue
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 8KB
const HEAP_SIZE: usize = 8 * 1024;

bind_interrupts!(struct Irqs {
    USART3 => usart::InterruptHandler<USART3>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Locator firmware starting...");

    init_heap();

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    // GPS receiver: USART3 RX on PD9, DMA1 stream 1
    let uart_config = locsvc_hal_stm32::uart::config(&UartConfig::NMEA);
    let gps_rx = match UartRx::new(p.USART3, Irqs, p.PD9, p.DMA1_CH1, uart_config) {
        Ok(rx) => rx,
        Err(e) => defmt::panic!("GPS UART config rejected: {:?}", e),
    };
    info!("GPS UART initialized");

    // LCD on the Arduino header: SCK=PA5, MOSI=PA7, CS=PD14, A0=PA8, RST=PA6
    let spi = Spi::new_blocking_txonly(
        p.SPI1,
        p.PA5,
        p.PA7,
        locsvc_hal_stm32::spi::config(&SpiConfig::LCD),
    );
    let cs = Output::new(p.PD14, Level::High, Speed::VeryHigh);
    let a0 = Pin::new(Output::new(p.PA8, Level::Low, Speed::VeryHigh));
    let rst = Pin::new(Output::new(p.PA6, Level::High, Speed::Low));

    let mut lcd = C12832::new(LcdSpi::new(spi, cs), a0, rst, C12832Config::default());
    match lcd.init(&mut Delay) {
        Ok(()) => info!("LCD initialized"),
        Err(e) => error!("LCD init failed: {:?}", e),
    }

    // Magnetometer: I2C1 SCL=PB8, SDA=PB9
    let i2c = I2c::new_blocking(
        p.I2C1,
        p.PB8,
        p.PB9,
        locsvc_hal_stm32::i2c::config(&I2cConfig::FAST),
    );
    let mut mag = Icm20948::new(BlockingI2c::new(i2c), MagnetometerConfig::default());
    let compass = match mag.init(&mut Delay) {
        Ok(()) => {
            info!("Magnetometer initialized");
            true
        }
        Err(e) => {
            error!("Magnetometer init failed: {:?}, running without compass", e);
            false
        }
    };

    info!("Spawning tasks...");

    spawner.spawn(unwrap!(tasks::render_task(RenderLoop::new(lcd))));
    spawner.spawn(unwrap!(tasks::gps_rx_task(gps_rx)));
    if compass {
        spawner.spawn(unwrap!(tasks::magnetometer_task(mag)));
    }

    info!("All tasks spawned");
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
