//! Public API for events, observers and registries

pub use crate::observers::error::{RegistryError, RegistryResult};
pub use crate::observers::event::{Event, EventType};
pub use crate::observers::multi::{
    LoggingUnregistrationListener, MultiRegistry, ObserverHandle, Registration,
    UnregistrationListener, UnregistrationReason,
};
pub use crate::observers::observer::{Capability, Observer, ObserverError, ResultSink};
pub use crate::observers::registry::{DispatchHooks, NoHooks, ObserverRegistry, SharedObserver};
pub use crate::observers::single::SingleSlotRegistry;
