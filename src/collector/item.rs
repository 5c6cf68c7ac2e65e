//! Queue entries for the collector buffer

/// One entry in a collector's buffer
///
/// `Stop` is enqueued exactly once, by `request_stop`, and is always the last
/// entry the consumer will ever see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem<T> {
    Payload(T),
    Stop,
}

impl<T> QueueItem<T> {
    pub fn is_stop(&self) -> bool {
        matches!(self, QueueItem::Stop)
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            QueueItem::Payload(item) => Some(item),
            QueueItem::Stop => None,
        }
    }
}
