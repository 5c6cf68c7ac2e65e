//! SyncDispatcher - observers run inline on the triggering thread

use crate::dispatch::dispatcher::{Delivery, EventDispatcher};
use crate::dispatch::error::DispatchResult;
use crate::dispatch::failure::{report_failure, FailureHandler, LoggingFailureHandler};
use crate::dispatch::invoke::{invoke, Outcome};
use crate::dispatch::reply::{Dispatched, Reply};
use crate::observers::event::Event;
use crate::observers::registry::SharedObserver;
use std::sync::Arc;

pub struct SyncDispatcher {
    failure_handler: Arc<dyn FailureHandler>,
}

impl SyncDispatcher {
    pub fn new(failure_handler: Arc<dyn FailureHandler>) -> Self {
        Self { failure_handler }
    }
}

impl Default for SyncDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(LoggingFailureHandler))
    }
}

impl<P, R> EventDispatcher<P, R> for SyncDispatcher {
    fn dispatch(
        &self,
        event: Arc<Event<P>>,
        observers: Vec<SharedObserver<P, R>>,
        delivery: Delivery,
    ) -> DispatchResult<Dispatched<R>> {
        let mut replies = Vec::new();
        for observer in observers {
            let outcome = invoke(observer.as_ref(), &event);
            if let Outcome::Failed(failure) = &outcome {
                report_failure(self.failure_handler.as_ref(), event.event_type(), failure);
            }
            if delivery == Delivery::RoundTrip {
                replies.push(Reply::ready(outcome.into_reply()));
            }
        }
        Ok(Dispatched::new(replies))
    }
}
