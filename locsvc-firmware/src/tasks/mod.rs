//! Embassy async tasks
//!
//! Each task runs independently and communicates via the event bus.

pub mod gps_rx;
pub mod magnetometer;
pub mod render;

pub use gps_rx::gps_rx_task;
pub use magnetometer::magnetometer_task;
pub use render::render_task;
