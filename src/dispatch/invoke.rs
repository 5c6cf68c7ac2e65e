//! One guarded observer call

use crate::core::error_handling::panic_message;
use crate::dispatch::failure::ObserverFailure;
use crate::observers::event::Event;
use crate::observers::observer::{Capability, Observer, ResultSink};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub(crate) enum Outcome<R> {
    /// `can_handle_event` said `CannotHandle`
    Skipped,
    /// Value present only for `HandleWithReturn`
    Handled(Option<R>),
    Failed(ObserverFailure),
}

impl<R> Outcome<R> {
    pub(crate) fn into_reply(self) -> Result<Option<R>, ObserverFailure> {
        match self {
            Outcome::Skipped => Ok(None),
            Outcome::Handled(value) => Ok(value),
            Outcome::Failed(failure) => Err(failure),
        }
    }
}

/// Ask the observer, then deliver; errors and panics become `Outcome::Failed`
pub(crate) fn invoke<P, R>(observer: &dyn Observer<P, R>, event: &Event<P>) -> Outcome<R> {
    let capability = match catch_unwind(AssertUnwindSafe(|| observer.can_handle_event(event))) {
        Ok(capability) => capability,
        Err(payload) => {
            return Outcome::Failed(ObserverFailure::Panicked {
                observer: observer.name().to_string(),
                message: panic_message(payload.as_ref()),
            })
        }
    };
    if capability == Capability::CannotHandle {
        log::trace!(
            "Observer '{}' skipped '{}'",
            observer.name(),
            event.event_type()
        );
        return Outcome::Skipped;
    }

    let mut sink = ResultSink::new();
    match catch_unwind(AssertUnwindSafe(|| observer.on_event(event, &mut sink))) {
        Ok(Ok(())) if capability.returns_value() => Outcome::Handled(sink.take()),
        Ok(Ok(())) => Outcome::Handled(None),
        Ok(Err(e)) => Outcome::Failed(ObserverFailure::Failed {
            observer: observer.name().to_string(),
            message: e.to_string(),
        }),
        Err(payload) => Outcome::Failed(ObserverFailure::Panicked {
            observer: observer.name().to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}
