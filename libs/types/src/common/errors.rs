//! Error types for topology validation and protocol execution
//!
//! Input errors are raised before any actor starts. Protocol errors are fatal
//! to the actor that raises them and, through the join in the system layer,
//! to the whole run.

use crate::common::identifiers::{EdgeId, VertexId, Weight};
use crate::messages::EdgeStatus;
use thiserror::Error;

/// Main error type for the GHS workspace
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GhsError {
    /// Unparsable input line
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// Edge endpoint outside `0..vertex_count`
    #[error("Vertex {vertex} at line {line} is out of range (graph has {vertex_count} vertices)")]
    VertexOutOfRange {
        line: usize,
        vertex: usize,
        vertex_count: usize,
    },

    /// Edge from a vertex to itself
    #[error("Self loop on vertex {vertex} at line {line}")]
    SelfLoop { line: usize, vertex: usize },

    /// NaN or infinite weight
    #[error("Weight '{weight}' at line {line} is not a finite number")]
    InvalidWeight { line: usize, weight: String },

    /// Two edges share a weight, breaking the tie-break precondition
    #[error("Weight {weight} at line {line} duplicates the edge at line {first_line}")]
    DuplicateWeight {
        weight: Weight,
        first_line: usize,
        line: usize,
    },

    /// Graph has no vertices
    #[error("Graph must contain at least one vertex")]
    EmptyGraph,

    /// Graph is not connected, so no spanning tree exists
    #[error("Graph is disconnected ({components} components)")]
    Disconnected { components: usize },

    /// Invalid run parameters
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Envelope stamped with an edge the receiving vertex does not own
    #[error("{vertex} received a message from unknown {edge}")]
    UnknownSenderEdge { vertex: VertexId, edge: EdgeId },

    /// Send into a mailbox whose consumer has gone away
    #[error("Mailbox closed: {target}")]
    MailboxClosed { target: String },

    /// Edge status moved backwards or across terminal states
    #[error("Illegal status transition on {edge}: {from} -> {to}")]
    IllegalTransition {
        edge: EdgeId,
        from: EdgeStatus,
        to: EdgeStatus,
    },

    /// Actor mailbox drained before the actor completed
    #[error("{vertex} terminated before completing")]
    PrematureTermination { vertex: VertexId },

    /// State the protocol can never legally reach
    #[error("Protocol violation: {message}")]
    ProtocolViolation { message: String },

    /// Actor task panicked or was cancelled
    #[error("Actor task for {vertex} failed: {message}")]
    ActorFailed { vertex: VertexId, message: String },
}

/// Result type alias for GHS operations
pub type Result<T> = std::result::Result<T, GhsError>;

impl GhsError {
    /// Create a malformed input error
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Create a mailbox closed error
    pub fn mailbox_closed(target: impl Into<String>) -> Self {
        Self::MailboxClosed {
            target: target.into(),
        }
    }

    /// Create a protocol violation error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Coarse category for structured logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. }
            | Self::VertexOutOfRange { .. }
            | Self::SelfLoop { .. }
            | Self::InvalidWeight { .. }
            | Self::DuplicateWeight { .. }
            | Self::EmptyGraph
            | Self::Disconnected { .. } => "input",
            Self::Configuration { .. } => "configuration",
            Self::MailboxClosed { .. } => "mailbox",
            Self::UnknownSenderEdge { .. }
            | Self::IllegalTransition { .. }
            | Self::ProtocolViolation { .. } => "protocol",
            Self::PrematureTermination { .. } | Self::ActorFailed { .. } => "lifecycle",
        }
    }

    /// True for errors detected while validating the input graph
    pub fn is_input_error(&self) -> bool {
        self.category() == "input"
    }
}
