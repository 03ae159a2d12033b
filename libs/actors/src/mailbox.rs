//! Actor Mailbox
//!
//! Unbounded multi-producer, single-consumer queue. Every neighbor edge holds a
//! [`Mailbox`] clone and the owning actor holds the only [`MailboxReceiver`].
//! The owner also keeps a [`Mailbox`] to itself so a message it cannot handle
//! yet goes to the back of the same queue, behind everything already waiting.
//!
//! Ordering: FIFO per sender handle (tokio's unbounded channel preserves
//! send order); no ordering between different senders.

use ghs_types::{GhsError, Result, VertexId};
use std::fmt;
use tokio::sync::mpsc;

/// Sending half of a vertex mailbox
pub struct Mailbox<M> {
    sender: mpsc::UnboundedSender<M>,
    owner: VertexId,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            owner: self.owner,
        }
    }
}

impl<M> fmt::Debug for Mailbox<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("owner", &self.owner)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// Receiving half, owned by the actor task
pub struct MailboxReceiver<M> {
    receiver: mpsc::UnboundedReceiver<M>,
    owner: VertexId,
}

impl<M> Mailbox<M> {
    pub fn new(owner: VertexId) -> (Self, MailboxReceiver<M>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self { sender, owner },
            MailboxReceiver { receiver, owner },
        )
    }

    /// Enqueue without blocking; fails only once the owner closed its queue
    pub fn send(&self, msg: M) -> Result<()> {
        self.sender
            .send(msg)
            .map_err(|_| GhsError::mailbox_closed(self.owner.to_string()))
    }

    pub fn owner(&self) -> VertexId {
        self.owner
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<M> MailboxReceiver<M> {
    /// Wait for the next message; `None` once closed and drained
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<M> {
        self.receiver.try_recv().ok()
    }

    /// Refuse further sends. Messages already queued stay readable.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    pub fn owner(&self) -> VertexId {
        self.owner
    }
}
