//! Incremental synchronization
//!
//! This module turns an extracted tree into deliveries:
//! - `compute_delta` selects the days newer than the watermark
//! - `deliver_all` hands them to a `DeliverySink` one by one and persists the
//!   watermark after every confirmed delivery
//! - `HomeAssistantSink` is the REST sink used by the binary

mod deliver;
mod delta;
mod sink;

pub use crate::config::{DeliveryOrder, WatermarkPolicy};
pub use deliver::{deliver_all, DeliveryReport};
pub use delta::{compute_delta, DeliveryRecord};
pub use sink::{DeliveryError, DeliverySink, HomeAssistantSink};
