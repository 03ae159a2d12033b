//! Protocol message types for the GHS actor network
//!
//! Every message travels inside an [`Envelope`] stamped with the [`EdgeId`] it
//! was sent along. The receiver resolves that id to its own local edge proxy;
//! the id is the only sender identity the protocol needs.
//!
//! | Kind | Payload | Purpose |
//! |------|---------|---------|
//! | `Connect` | level | ask to merge / be absorbed across an edge |
//! | `Initiate` | level, name, state | broadcast a new fragment identity |
//! | `Test` | level, name | probe whether an edge leaves the fragment |
//! | `Accept` / `Reject` | - | answer to `Test` |
//! | `Report` | weight | best outgoing weight of a subtree |
//! | `ChangeRoot` | - | move the root toward the chosen outgoing edge |
//! | `Halt` | - | tree complete, shut down |

use crate::common::identifiers::{EdgeId, FragmentName, Level, Weight};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one endpoint's view of an edge
///
/// Monotonic: `Basic` may become `Branch` or `Reject`, never the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    /// Not yet classified
    Basic,
    /// Part of the spanning tree
    Branch,
    /// Internal to a fragment, excluded from the tree
    Reject,
}

impl EdgeStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EdgeStatus::Basic)
    }
}

impl fmt::Display for EdgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeStatus::Basic => "basic",
            EdgeStatus::Branch => "branch",
            EdgeStatus::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Search state of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Sleeping,
    Find,
    Found,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeState::Sleeping => "sleeping",
            NodeState::Find => "find",
            NodeState::Found => "found",
        };
        f.write_str(name)
    }
}

/// GHS protocol message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GhsMessage {
    Connect {
        level: Level,
    },
    Initiate {
        level: Level,
        name: FragmentName,
        state: NodeState,
    },
    Test {
        level: Level,
        name: FragmentName,
    },
    Accept,
    Reject,
    Report {
        weight: Weight,
    },
    ChangeRoot,
    Halt,
}

impl GhsMessage {
    /// Payload-free discriminant, used for metrics and log fields
    pub fn kind(&self) -> MessageKind {
        match self {
            GhsMessage::Connect { .. } => MessageKind::Connect,
            GhsMessage::Initiate { .. } => MessageKind::Initiate,
            GhsMessage::Test { .. } => MessageKind::Test,
            GhsMessage::Accept => MessageKind::Accept,
            GhsMessage::Reject => MessageKind::Reject,
            GhsMessage::Report { .. } => MessageKind::Report,
            GhsMessage::ChangeRoot => MessageKind::ChangeRoot,
            GhsMessage::Halt => MessageKind::Halt,
        }
    }
}

/// Discriminant of [`GhsMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Connect,
    Initiate,
    Test,
    Accept,
    Reject,
    Report,
    ChangeRoot,
    Halt,
}

impl MessageKind {
    pub const ALL: [MessageKind; 8] = [
        MessageKind::Connect,
        MessageKind::Initiate,
        MessageKind::Test,
        MessageKind::Accept,
        MessageKind::Reject,
        MessageKind::Report,
        MessageKind::ChangeRoot,
        MessageKind::Halt,
    ];

    /// Dense index into per-kind counter arrays
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Connect => "connect",
            MessageKind::Initiate => "initiate",
            MessageKind::Test => "test",
            MessageKind::Accept => "accept",
            MessageKind::Reject => "reject",
            MessageKind::Report => "report",
            MessageKind::ChangeRoot => "changeroot",
            MessageKind::Halt => "halt",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of communication between vertices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Edge the message travelled along (shared id of both endpoint proxies)
    pub edge: EdgeId,
    pub message: GhsMessage,
}

impl Envelope {
    pub fn new(edge: EdgeId, message: GhsMessage) -> Self {
        Self { edge, message }
    }

    pub fn kind(&self) -> MessageKind {
        self.message.kind()
    }
}
