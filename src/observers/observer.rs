//! Observer contract and result sink

use crate::observers::event::Event;

/// Failure returned from [`Observer::on_event`]
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// What an observer can do with a given event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CannotHandle,
    HandleNoReturn,
    HandleWithReturn,
}

impl Capability {
    pub fn can_handle(self) -> bool {
        !matches!(self, Capability::CannotHandle)
    }

    pub fn returns_value(self) -> bool {
        matches!(self, Capability::HandleWithReturn)
    }
}

/// Slot an observer writes its reply into during `on_event`
///
/// Only read back when the observer reported
/// [`Capability::HandleWithReturn`]; writing twice keeps the last value.
#[derive(Debug)]
pub struct ResultSink<R> {
    value: Option<R>,
}

impl<R> ResultSink<R> {
    pub(crate) fn new() -> Self {
        Self { value: None }
    }

    pub fn put(&mut self, value: R) {
        self.value = Some(value);
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn take(&mut self) -> Option<R> {
        self.value.take()
    }
}

/// Handler reacting to events of type `Event<P>`, optionally replying with `R`
///
/// Observers are shared across threads: the async dispatcher calls them from
/// its worker thread. `on_event` may fail by returning `Err` or by panicking;
/// both are caught by the dispatcher and reported, never propagated.
pub trait Observer<P, R>: Send + Sync {
    fn can_handle_event(&self, event: &Event<P>) -> Capability;

    fn on_event(&self, event: &Event<P>, sink: &mut ResultSink<R>) -> Result<(), ObserverError>;

    /// Label used when reporting failures
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
