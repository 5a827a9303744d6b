//! Display drivers

pub mod c12832;

pub use c12832::{C12832Config, PageOrder, C12832};
