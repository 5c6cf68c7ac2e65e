//! Public API for the bounded collector

pub use crate::collector::batch::BatchCollector;
pub use crate::collector::core::CollectorHandle;
pub use crate::collector::error::{CollectorError, CollectorResult};
pub use crate::collector::item::QueueItem;
pub use crate::collector::performer::{BatchPerformer, PerformError, Performer};
pub use crate::collector::single::SingleCollector;
