//! Edge proxies and sender resolution
//!
//! An [`Edge`] is one endpoint's private view of an undirected edge: its id,
//! fixed weight, the locally tracked status, and the peer vertex's mailbox.
//! Both endpoints carry the same [`EdgeId`], so an incoming envelope can be
//! mapped back to the local proxy through an [`EdgeTable`].

use crate::mailbox::Mailbox;
use ghs_types::{EdgeId, EdgeStatus, Envelope, GhsError, GhsMessage, Result, Weight};
use std::collections::HashMap;

/// Local endpoint of a graph edge
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    weight: Weight,
    status: EdgeStatus,
    peer: Mailbox<Envelope>,
}

impl Edge {
    pub fn new(id: EdgeId, weight: Weight, peer: Mailbox<Envelope>) -> Self {
        Self {
            id,
            weight,
            status: EdgeStatus::Basic,
            peer,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn status(&self) -> EdgeStatus {
        self.status
    }

    pub fn is_basic(&self) -> bool {
        self.status == EdgeStatus::Basic
    }

    pub fn is_branch(&self) -> bool {
        self.status == EdgeStatus::Branch
    }

    /// Move to `status`. Basic may become anything; a terminal status only
    /// accepts being marked again with itself.
    pub fn mark(&mut self, status: EdgeStatus) -> Result<()> {
        match (self.status, status) {
            (EdgeStatus::Basic, _) => {
                self.status = status;
                Ok(())
            }
            (current, next) if current == next => Ok(()),
            (current, next) => Err(GhsError::IllegalTransition {
                edge: self.id,
                from: current,
                to: next,
            }),
        }
    }

    /// Deliver `message` to the peer, stamped with this edge's id
    pub fn send(&self, message: GhsMessage) -> Result<()> {
        self.peer.send(Envelope::new(self.id, message))
    }

    pub fn peer(&self) -> &Mailbox<Envelope> {
        &self.peer
    }
}

/// Maps global edge ids to positions in a vertex's local edge list
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    index: HashMap<EdgeId, usize>,
}

impl EdgeTable {
    pub fn new(edges: &[Edge]) -> Self {
        Self {
            index: edges
                .iter()
                .enumerate()
                .map(|(i, edge)| (edge.id(), i))
                .collect(),
        }
    }

    pub fn resolve(&self, id: EdgeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
