//! Public API for deadlock detection

pub use crate::deadlock::error::{MonitorError, MonitorResult};
pub use crate::deadlock::introspect::{
    Detection, ParkingLotIntrospector, SystemThreadId, ThreadDirectory, ThreadDump,
    ThreadIntrospector,
};
pub use crate::deadlock::monitor::{DeadlockListener, DeadlockMonitor, MonitorHandle};
pub use crate::deadlock::snapshot::{DeadlockSnapshot, ThreadDescriptor};
