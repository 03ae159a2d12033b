//! Actor-Based GHS Minimum Spanning Tree
//!
//! One actor per vertex, one unbounded mailbox per actor, one edge proxy per
//! edge endpoint. Actors share no memory: every decision is taken locally from
//! the messages that arrive through the mailbox.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │  NodeActor (u)       │        │  NodeActor (v)       │
//! │                      │        │                      │
//! │  Edge{id, w} ────────┼──────► │  Mailbox (v)         │
//! │                      │        │                      │
//! │  Mailbox (u) ◄───────┼────────┼─ Edge{id, w}         │
//! └──────────────────────┘        └──────────────────────┘
//!            ▲  defer (self-requeue)
//!            └── own Mailbox handle
//! ```
//!
//! # Examples
//!
//! ```rust
//! use ghs_actors::GhsSystem;
//! use ghs_types::Topology;
//!
//! # #[tokio::main]
//! # async fn main() -> ghs_types::Result<()> {
//! let topology: Topology = "3\n(0, 1, 2)\n(1, 2, 3)\n(0, 2, 9)\n".parse()?;
//! let report = GhsSystem::new(topology, 3)?.run().await?;
//! assert_eq!(report.tree_edges()?.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod edge;
pub mod mailbox;
pub mod messages;
pub mod node;
pub mod system;

pub use edge::{Edge, EdgeTable};
pub use mailbox::{Mailbox, MailboxReceiver};
pub use messages::{MetricsSnapshot, ProtocolMetrics};
pub use node::{FragmentSeed, NodeActor, NodeReport};
pub use system::{ActorBehavior, ActorTask, GhsSystem, RunReport, WakeupBudget};
