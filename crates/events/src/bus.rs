//! Event publishing/subscription abstraction (mechanics only).
//!
//! A lightweight pub/sub seam for distributing events to consumers (audit
//! sinks, notification dispatchers, read models). Intentionally minimal:
//!
//! - **Transport-agnostic**: in-memory channels, a broker, a task queue.
//! - **At-least-once**: events may be delivered more than once; consumers
//!   must be idempotent.
//! - **No persistence**: the bus distributes, it does not store. Operations
//!   that publish must already have committed their own state.
//!
//! Publication failure is surfaced to the caller, but core operations treat
//! the bus as best-effort: warehouse correctness never depends on the
//! audit/notification path being up.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published to the bus
/// (broadcast semantics). Designed for single-threaded consumption; hand the
/// subscription to one worker thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// Implementations must be safe to share across threads; multiple threads
/// may publish concurrently. Ordering between concurrent publishers is not
/// guaranteed unless the implementation provides it.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
