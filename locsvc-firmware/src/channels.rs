//! Inter-task communication
//!
//! A single bus carries every event; the render task is its only consumer.

use locsvc_core::EventBus;

/// GPS sentences and compass headings, in arrival order
pub static BUS: EventBus = EventBus::new();
