//! Round-trip replies

use crate::dispatch::failure::ObserverFailure;
use tokio::sync::oneshot;

/// What one observer produced for one event
pub type ReplyResult<R> = Result<Option<R>, ObserverFailure>;

enum ReplyState<R> {
    Ready(ReplyResult<R>),
    Pending(oneshot::Receiver<ReplyResult<R>>),
}

/// Reply from one observer in a round-trip dispatch
///
/// Synchronous dispatch produces ready replies; asynchronous dispatch
/// produces pending ones completed by the worker thread.
pub struct Reply<R> {
    state: ReplyState<R>,
}

impl<R> Reply<R> {
    pub(crate) fn ready(result: ReplyResult<R>) -> Self {
        Self {
            state: ReplyState::Ready(result),
        }
    }

    pub(crate) fn pending(receiver: oneshot::Receiver<ReplyResult<R>>) -> Self {
        Self {
            state: ReplyState::Pending(receiver),
        }
    }

    /// True when the reply was produced inline by a synchronous dispatch
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ReplyState::Ready(_))
    }

    /// Block until the observer has run
    ///
    /// A worker that exits without replying yields
    /// [`ObserverFailure::Abandoned`] rather than blocking forever.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous runtime context.
    pub fn wait(self) -> ReplyResult<R> {
        match self.state {
            ReplyState::Ready(result) => result,
            ReplyState::Pending(receiver) => receiver
                .blocking_recv()
                .unwrap_or(Err(ObserverFailure::Abandoned)),
        }
    }

    /// Non-blocking check; hands the reply back while the worker has not
    /// replied yet
    pub fn try_take(self) -> Result<ReplyResult<R>, Self> {
        match self.state {
            ReplyState::Ready(result) => Ok(result),
            ReplyState::Pending(mut receiver) => match receiver.try_recv() {
                Ok(result) => Ok(result),
                Err(oneshot::error::TryRecvError::Empty) => Err(Self::pending(receiver)),
                Err(oneshot::error::TryRecvError::Closed) => Ok(Err(ObserverFailure::Abandoned)),
            },
        }
    }
}

impl<R> std::fmt::Debug for Reply<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Replies collected by one `trigger()`, in observer snapshot order
///
/// Empty for fire-and-forget delivery and for triggers that found no observer.
pub struct Dispatched<R> {
    replies: Vec<Reply<R>>,
}

impl<R> Dispatched<R> {
    pub(crate) fn new(replies: Vec<Reply<R>>) -> Self {
        Self { replies }
    }

    pub(crate) fn none() -> Self {
        Self {
            replies: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    pub fn into_replies(self) -> Vec<Reply<R>> {
        self.replies
    }

    pub fn wait_all(self) -> Vec<ReplyResult<R>> {
        self.replies.into_iter().map(Reply::wait).collect()
    }

    /// Wait for the first reply; the usual call for single-observer managers
    pub fn wait_one(self) -> Option<ReplyResult<R>> {
        self.replies.into_iter().next().map(Reply::wait)
    }
}

impl<R> std::fmt::Debug for Dispatched<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatched")
            .field("replies", &self.replies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_reply_returns_value() {
        let reply = Reply::ready(Ok(Some(5)));
        assert!(reply.is_ready());
        assert_eq!(reply.wait(), Ok(Some(5)));
    }

    #[test]
    fn test_pending_reply_completed_by_sender() {
        let (sender, receiver) = oneshot::channel();
        let reply = Reply::<u8>::pending(receiver);
        assert!(!reply.is_ready());
        let Err(reply) = reply.try_take() else {
            panic!("reply completed before the sender sent");
        };

        sender.send(Ok(Some(9))).unwrap();
        assert_eq!(reply.wait(), Ok(Some(9)));
    }

    #[test]
    fn test_dropped_sender_is_abandoned_not_a_hang() {
        let (sender, receiver) = oneshot::channel::<ReplyResult<u8>>();
        drop(sender);
        assert_eq!(
            Reply::pending(receiver).wait(),
            Err(ObserverFailure::Abandoned)
        );
    }

    #[test]
    fn test_wait_one_on_empty_dispatch() {
        assert!(Dispatched::<u8>::none().wait_one().is_none());
    }
}
