//! Dispatcher abstraction shared by the synchronous and asynchronous flavors

use crate::dispatch::error::DispatchResult;
use crate::dispatch::reply::Dispatched;
use crate::observers::event::Event;
use crate::observers::registry::SharedObserver;
use std::sync::Arc;

/// Whether the triggering caller gets values back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    #[default]
    FireAndForget,
    RoundTrip,
}

pub trait EventDispatcher<P, R>: Send + Sync {
    /// Deliver `event` to each observer in `observers`, in order
    ///
    /// Observer failures never surface as `Err` here: they go to the failure
    /// handler and, for round-trip delivery, into the matching reply.
    fn dispatch(
        &self,
        event: Arc<Event<P>>,
        observers: Vec<SharedObserver<P, R>>,
        delivery: Delivery,
    ) -> DispatchResult<Dispatched<R>>;
}
