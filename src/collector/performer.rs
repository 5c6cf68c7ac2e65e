//! Performer callbacks invoked by the collector consumer loop

/// Failure reported by a performer; logged by the consumer loop
pub type PerformError = Box<dyn std::error::Error + Send + Sync>;

/// Receives items one at a time, in submission order
///
/// Any `FnMut(T) -> Result<(), PerformError>` closure is a performer.
pub trait Performer<T>: Send {
    fn perform(&mut self, item: T) -> Result<(), PerformError>;
}

impl<T, F> Performer<T> for F
where
    F: FnMut(T) -> Result<(), PerformError> + Send,
{
    fn perform(&mut self, item: T) -> Result<(), PerformError> {
        self(item)
    }
}

/// Receives every item that was immediately available, as one batch
///
/// Batches are never empty and never exceed the collector's batch limit.
pub trait BatchPerformer<T>: Send {
    fn perform_batch(&mut self, items: Vec<T>) -> Result<(), PerformError>;
}

impl<T, F> BatchPerformer<T> for F
where
    F: FnMut(Vec<T>) -> Result<(), PerformError> + Send,
{
    fn perform_batch(&mut self, items: Vec<T>) -> Result<(), PerformError> {
        self(items)
    }
}
