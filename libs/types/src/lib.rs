//! # GHS Types Library
//!
//! Shared vocabulary for the distributed minimum spanning tree protocol.
//!
//! ## Contents
//!
//! - **Messages**: [`GhsMessage`] sum type (one variant per protocol kind) and
//!   the [`Envelope`] that carries it across an edge
//! - **Status**: [`EdgeStatus`] and [`NodeState`] lifecycles
//! - **Identifiers**: [`EdgeId`], [`VertexId`], weights and fragment names
//! - **Topology**: parsed and validated input graph ([`Topology`])
//! - **Errors**: the [`GhsError`] taxonomy used by every crate in the workspace
//!
//! ## Quick Start
//!
//! ```rust
//! use ghs_types::{Topology, GhsMessage, MessageKind};
//!
//! let topology: Topology = "2\n(0, 1, 7)\n".parse().unwrap();
//! assert_eq!(topology.vertex_count(), 2);
//!
//! let msg = GhsMessage::Connect { level: 0 };
//! assert_eq!(msg.kind(), MessageKind::Connect);
//! ```

pub mod common;
pub mod messages;
pub mod topology;

pub use common::errors::{GhsError, Result};
pub use common::identifiers::{EdgeId, FragmentName, Level, VertexId, Weight, INFINITE_WEIGHT};
pub use messages::{EdgeStatus, Envelope, GhsMessage, MessageKind, NodeState};
pub use topology::{DisjointSet, Topology, WeightedEdge};
