//! GHS vertex actor
//!
//! A [`NodeActor`] owns one vertex's protocol state and its incident
//! [`Edge`]s. It is mutated only by its own task, one envelope at a time, so
//! none of the state below needs a lock.
//!
//! ## State machine
//!
//! ```text
//! Sleeping --wakeup--> Found --initiate(Find)--> Find --report barrier--> Found
//!                        ^                                                 |
//!                        +----------------- next merge round -------------+
//! ```
//!
//! `Found` with a mutual infinite report across the core edge is the only
//! terminal condition; it triggers [`NodeActor::complete`] and halt
//! propagation down the tree.
//!
//! ## Deferral
//!
//! `connect`, `test` and `report` may arrive before this vertex is able to
//! answer them. They are put back at the tail of the vertex's own mailbox,
//! unprocessed, and retried after everything already queued.

use crate::edge::{Edge, EdgeTable};
use crate::mailbox::Mailbox;
use crate::messages::ProtocolMetrics;
use crate::system::{ActorBehavior, WakeupBudget};
use async_trait::async_trait;
use ghs_types::{
    EdgeId, EdgeStatus, Envelope, FragmentName, GhsError, GhsMessage, Level, MessageKind,
    NodeState, Result, VertexId, Weight, INFINITE_WEIGHT,
};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Initial fragment identity of a vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentSeed {
    pub name: FragmentName,
    pub level: Level,
}

impl Default for FragmentSeed {
    /// Fresh run: every vertex starts as its own level 0 fragment
    fn default() -> Self {
        Self {
            name: 0.0,
            level: 0,
        }
    }
}

/// Final view of one vertex, collected by the orchestrator after the join
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    pub vertex: VertexId,
    pub completed: bool,
    /// Edge toward the fragment core; `None` unless completed
    pub father: Option<EdgeId>,
    pub level: Level,
    pub name: FragmentName,
    pub edge_statuses: Vec<(EdgeId, EdgeStatus)>,
}

impl NodeReport {
    pub fn branch_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_statuses
            .iter()
            .filter(|(_, status)| *status == EdgeStatus::Branch)
            .map(|(id, _)| *id)
    }
}

/// Per-vertex GHS state machine
#[derive(Debug)]
pub struct NodeActor {
    vertex: VertexId,
    edges: Vec<Edge>,
    table: EdgeTable,
    /// Handle to this vertex's own mailbox, used for deferral
    inbox: Mailbox<Envelope>,
    budget: Option<Arc<WakeupBudget>>,
    metrics: Arc<ProtocolMetrics>,

    state: NodeState,
    name: FragmentName,
    level: Level,
    father: Option<usize>,
    completed: bool,

    // reset at the start of every search round
    test_edge: Option<usize>,
    best_edge: Option<usize>,
    best_weight: Weight,
    rec: usize,
}

impl NodeActor {
    pub fn new(vertex: VertexId, edges: Vec<Edge>, inbox: Mailbox<Envelope>, seed: FragmentSeed) -> Self {
        let table = EdgeTable::new(&edges);
        Self {
            vertex,
            edges,
            table,
            inbox,
            budget: None,
            metrics: Arc::new(ProtocolMetrics::new()),
            state: NodeState::Sleeping,
            name: seed.name,
            level: seed.level,
            father: None,
            completed: false,
            test_edge: None,
            best_edge: None,
            best_weight: INFINITE_WEIGHT,
            rec: 0,
        }
    }

    /// Wake spontaneously on start if a slot in `budget` is still free
    pub fn with_wakeup_budget(mut self, budget: Arc<WakeupBudget>) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ProtocolMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn name(&self) -> FragmentName {
        self.name
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge toward the core, exposed only once the tree is complete
    pub fn father(&self) -> Option<EdgeId> {
        if !self.completed {
            return None;
        }
        self.father.map(|i| self.edges[i].id())
    }

    pub fn edge_statuses(&self) -> Vec<(EdgeId, EdgeStatus)> {
        self.edges.iter().map(|e| (e.id(), e.status())).collect()
    }

    pub fn report(&self) -> NodeReport {
        NodeReport {
            vertex: self.vertex,
            completed: self.completed,
            father: self.father(),
            level: self.level,
            name: self.name,
            edge_statuses: self.edge_statuses(),
        }
    }

    /// Handle one envelope: lazy wakeup, sender resolution, dispatch
    pub fn dispatch(&mut self, envelope: Envelope) -> Result<()> {
        if self.state == NodeState::Sleeping {
            self.wakeup()?;
        }

        let j = self
            .table
            .resolve(envelope.edge)
            .ok_or(GhsError::UnknownSenderEdge {
                vertex: self.vertex,
                edge: envelope.edge,
            })?;

        debug!(
            vertex = %self.vertex,
            edge = %envelope.edge,
            kind = %envelope.kind(),
            state = %self.state,
            level = self.level,
            "Handling message"
        );

        match envelope.message {
            GhsMessage::Connect { level } => self.on_connect(j, level, envelope),
            GhsMessage::Initiate { level, name, state } => self.on_initiate(j, level, name, state),
            GhsMessage::Test { level, name } => self.on_test(j, level, name, envelope),
            GhsMessage::Accept => self.on_accept(j),
            GhsMessage::Reject => self.on_reject(j),
            GhsMessage::Report { weight } => self.on_report(j, weight, envelope),
            GhsMessage::ChangeRoot => self.change_root(),
            GhsMessage::Halt => self.complete(),
        }
    }

    /// Leave `Sleeping`: join the minimum weight edge and ask to connect
    pub fn wakeup(&mut self) -> Result<()> {
        if self.state != NodeState::Sleeping {
            return Ok(());
        }

        let min = self
            .edges
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.weight().total_cmp(&b.weight()))
            .map(|(i, _)| i)
            .ok_or_else(|| GhsError::protocol(format!("{} has no edge to wake up on", self.vertex)))?;

        self.level = 0;
        self.state = NodeState::Found;
        self.rec = 0;
        self.edges[min].mark(EdgeStatus::Branch)?;

        debug!(vertex = %self.vertex, edge = %self.edges[min].id(), "Woke up");
        self.send_on(min, GhsMessage::Connect { level: self.level })
    }

    /// Tree is complete: halt every branch and stop
    pub fn complete(&mut self) -> Result<()> {
        if self.completed {
            return Ok(());
        }

        for i in 0..self.edges.len() {
            if !self.edges[i].is_branch() {
                continue;
            }
            match self.edges[i].send(GhsMessage::Halt) {
                Ok(()) => self.metrics.record_sent(MessageKind::Halt),
                // neighbor finished first and closed its mailbox
                Err(GhsError::MailboxClosed { .. }) => {
                    trace!(vertex = %self.vertex, edge = %self.edges[i].id(), "Halt not delivered, peer done");
                    self.metrics.record_undeliverable_halt();
                }
                Err(e) => return Err(e),
            }
        }

        self.completed = true;
        info!(
            vertex = %self.vertex,
            level = self.level,
            fragment = self.name,
            branches = self.edges.iter().filter(|e| e.is_branch()).count(),
            "Vertex completed"
        );
        Ok(())
    }

    fn on_connect(&mut self, j: usize, level: Level, envelope: Envelope) -> Result<()> {
        if level < self.level {
            // lower fragment asks to be absorbed
            self.edges[j].mark(EdgeStatus::Branch)?;
            let reply = GhsMessage::Initiate {
                level: self.level,
                name: self.name,
                state: self.state,
            };
            self.send_on(j, reply)
        } else if self.edges[j].is_basic() {
            self.defer(envelope)
        } else {
            // both sides chose this edge: it becomes the new core
            let reply = GhsMessage::Initiate {
                level: self.level + 1,
                name: self.edges[j].weight(),
                state: NodeState::Find,
            };
            self.send_on(j, reply)
        }
    }

    fn on_initiate(&mut self, j: usize, level: Level, name: FragmentName, state: NodeState) -> Result<()> {
        self.name = name;
        self.state = state;
        self.level = level;
        self.father = Some(j);
        self.best_edge = None;
        self.best_weight = INFINITE_WEIGHT;

        for i in 0..self.edges.len() {
            if i != j && self.edges[i].is_branch() {
                self.send_on(i, GhsMessage::Initiate { level, name, state })?;
            }
        }

        if state == NodeState::Find {
            self.rec = 0;
            self.test()?;
        }
        Ok(())
    }

    fn on_test(&mut self, j: usize, level: Level, name: FragmentName, envelope: Envelope) -> Result<()> {
        if level > self.level {
            return self.defer(envelope);
        }

        if name == self.name {
            // internal edge
            if self.edges[j].is_basic() {
                self.edges[j].mark(EdgeStatus::Reject)?;
            }
            if self.test_edge != Some(j) {
                self.send_on(j, GhsMessage::Reject)
            } else {
                self.test()
            }
        } else {
            self.send_on(j, GhsMessage::Accept)
        }
    }

    fn on_accept(&mut self, j: usize) -> Result<()> {
        self.test_edge = None;
        let weight = self.edges[j].weight();
        if weight < self.best_weight {
            self.best_edge = Some(j);
            self.best_weight = weight;
        }
        self.report_if_ready()
    }

    fn on_reject(&mut self, j: usize) -> Result<()> {
        if self.edges[j].is_basic() {
            self.edges[j].mark(EdgeStatus::Reject)?;
        }
        self.test()
    }

    fn on_report(&mut self, j: usize, weight: Weight, envelope: Envelope) -> Result<()> {
        if Some(j) != self.father {
            if weight < self.best_weight {
                self.best_weight = weight;
                self.best_edge = Some(j);
            }
            self.rec += 1;
            return self.report_if_ready();
        }

        // report from the other core vertex
        if self.state == NodeState::Find {
            self.defer(envelope)
        } else if weight > self.best_weight {
            self.change_root()
        } else if weight == INFINITE_WEIGHT && self.best_weight == INFINITE_WEIGHT {
            self.complete()
        } else {
            Ok(())
        }
    }

    /// Probe the lightest edge still `Basic`, or report if none is left
    fn test(&mut self) -> Result<()> {
        let candidate = self
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_basic())
            .min_by(|(_, a), (_, b)| a.weight().total_cmp(&b.weight()))
            .map(|(i, _)| i);

        match candidate {
            Some(i) => {
                self.test_edge = Some(i);
                self.send_on(
                    i,
                    GhsMessage::Test {
                        level: self.level,
                        name: self.name,
                    },
                )
            }
            None => {
                self.test_edge = None;
                self.report_if_ready()
            }
        }
    }

    /// Send the subtree's best weight to the father once every child has
    /// reported and no probe of our own is outstanding
    fn report_if_ready(&mut self) -> Result<()> {
        let children = self
            .edges
            .iter()
            .enumerate()
            .filter(|(i, e)| e.is_branch() && Some(*i) != self.father)
            .count();

        if self.rec != children || self.test_edge.is_some() {
            return Ok(());
        }

        self.state = NodeState::Found;
        let father = self.father.ok_or_else(|| {
            GhsError::protocol(format!("{} finished a search without a father edge", self.vertex))
        })?;
        self.send_on(
            father,
            GhsMessage::Report {
                weight: self.best_weight,
            },
        )
    }

    fn change_root(&mut self) -> Result<()> {
        let best = self.best_edge.ok_or_else(|| {
            GhsError::protocol(format!("{} asked to change root without a best edge", self.vertex))
        })?;

        if self.edges[best].is_branch() {
            self.send_on(best, GhsMessage::ChangeRoot)
        } else {
            // frontier: commit locally before the other side answers
            self.send_on(best, GhsMessage::Connect { level: self.level })?;
            self.edges[best].mark(EdgeStatus::Branch)
        }
    }

    fn send_on(&self, i: usize, message: GhsMessage) -> Result<()> {
        trace!(
            vertex = %self.vertex,
            edge = %self.edges[i].id(),
            kind = %message.kind(),
            "Sending"
        );
        self.edges[i].send(message)?;
        self.metrics.record_sent(message.kind());
        Ok(())
    }

    fn defer(&self, envelope: Envelope) -> Result<()> {
        debug!(
            vertex = %self.vertex,
            edge = %envelope.edge,
            kind = %envelope.kind(),
            level = self.level,
            state = %self.state,
            "Deferring message"
        );
        self.metrics.record_deferred(envelope.kind());
        self.inbox.send(envelope)
    }
}

#[async_trait]
impl ActorBehavior for NodeActor {
    type Message = Envelope;

    fn id(&self) -> VertexId {
        self.vertex
    }

    async fn on_start(&mut self) -> Result<()> {
        if self.edges.is_empty() {
            // isolated vertex: the spanning tree is just this vertex
            return self.complete();
        }
        if let Some(budget) = &self.budget {
            if budget.try_claim() {
                debug!(vertex = %self.vertex, "Spontaneous wakeup");
                self.wakeup()?;
            }
        }
        Ok(())
    }

    async fn handle(&mut self, msg: Envelope) -> Result<()> {
        self.dispatch(msg)
    }

    fn is_finished(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::MailboxReceiver;

    struct Harness {
        node: NodeActor,
        own: MailboxReceiver<Envelope>,
        peers: Vec<MailboxReceiver<Envelope>>,
        metrics: Arc<ProtocolMetrics>,
    }

    /// Vertex 0 with one edge per weight; edge `i` leads to vertex `i + 1`
    fn harness(weights: &[Weight]) -> Harness {
        let (inbox, own) = Mailbox::new(VertexId(0));
        let mut edges = Vec::new();
        let mut peers = Vec::new();
        for (i, w) in weights.iter().enumerate() {
            let (peer, rx) = Mailbox::new(VertexId(i + 1));
            edges.push(Edge::new(EdgeId(i), *w, peer));
            peers.push(rx);
        }
        let metrics = Arc::new(ProtocolMetrics::new());
        let node = NodeActor::new(VertexId(0), edges, inbox, FragmentSeed::default())
            .with_metrics(Arc::clone(&metrics));
        Harness {
            node,
            own,
            peers,
            metrics,
        }
    }

    impl Harness {
        fn deliver(&mut self, edge: usize, message: GhsMessage) -> Result<()> {
            self.node.dispatch(Envelope::new(EdgeId(edge), message))
        }

        fn sent_to(&mut self, peer: usize) -> Vec<GhsMessage> {
            let mut out = Vec::new();
            while let Some(env) = self.peers[peer].try_recv() {
                assert_eq!(env.edge, EdgeId(peer));
                out.push(env.message);
            }
            out
        }

        fn deferred(&mut self) -> Vec<Envelope> {
            let mut out = Vec::new();
            while let Some(env) = self.own.try_recv() {
                out.push(env);
            }
            out
        }

        /// Wake via the lightest edge and adopt a fragment in `Found`
        fn join_fragment(&mut self, via: usize, level: Level, name: FragmentName) {
            self.deliver(
                via,
                GhsMessage::Initiate {
                    level,
                    name,
                    state: NodeState::Found,
                },
            )
            .unwrap();
            for p in 0..self.peers.len() {
                self.sent_to(p);
            }
        }
    }

    #[test]
    fn test_wakeup_connects_on_lightest_edge() {
        let mut h = harness(&[9.0, 2.0, 5.0]);
        h.node.wakeup().unwrap();

        assert_eq!(h.node.state(), NodeState::Found);
        assert_eq!(h.node.level(), 0);
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Branch);
        assert_eq!(h.node.edges()[0].status(), EdgeStatus::Basic);
        assert_eq!(h.sent_to(1), vec![GhsMessage::Connect { level: 0 }]);
        assert!(h.sent_to(0).is_empty());

        // second wakeup is a no-op
        h.node.wakeup().unwrap();
        assert!(h.sent_to(1).is_empty());
    }

    #[test]
    fn test_first_message_wakes_sleeping_vertex() {
        let mut h = harness(&[3.0, 1.0]);
        h.deliver(0, GhsMessage::Connect { level: 0 }).unwrap();

        // woke on edge 1, then deferred the connect on still-basic edge 0
        assert_eq!(h.sent_to(1), vec![GhsMessage::Connect { level: 0 }]);
        let deferred = h.deferred();
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].edge, EdgeId(0));
        assert_eq!(h.metrics.snapshot().total_deferred(), 1);
    }

    #[test]
    fn test_connect_on_branch_edge_creates_core() {
        let mut h = harness(&[4.0]);
        h.deliver(0, GhsMessage::Connect { level: 0 }).unwrap();

        assert_eq!(
            h.sent_to(0),
            vec![
                GhsMessage::Connect { level: 0 },
                GhsMessage::Initiate {
                    level: 1,
                    name: 4.0,
                    state: NodeState::Find
                },
            ]
        );
        assert!(h.deferred().is_empty());
    }

    #[test]
    fn test_connect_from_lower_level_is_absorbed() {
        let mut h = harness(&[1.0, 6.0]);
        h.join_fragment(0, 2, 1.0);

        h.deliver(1, GhsMessage::Connect { level: 0 }).unwrap();
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Branch);
        assert_eq!(
            h.sent_to(1),
            vec![GhsMessage::Initiate {
                level: 2,
                name: 1.0,
                state: NodeState::Found
            }]
        );
    }

    #[test]
    fn test_initiate_find_percolates_and_tests() {
        let mut h = harness(&[1.0, 6.0, 3.0]);
        h.join_fragment(0, 1, 1.0);
        // absorb a child on edge 2
        h.deliver(2, GhsMessage::Connect { level: 0 }).unwrap();
        h.sent_to(2);

        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 2,
                name: 8.0,
                state: NodeState::Find,
            },
        )
        .unwrap();

        assert_eq!(h.node.state(), NodeState::Find);
        assert_eq!(h.node.level(), 2);
        assert_eq!(
            h.sent_to(2),
            vec![GhsMessage::Initiate {
                level: 2,
                name: 8.0,
                state: NodeState::Find
            }]
        );
        assert_eq!(h.sent_to(1), vec![GhsMessage::Test { level: 2, name: 8.0 }]);
        assert!(h.sent_to(0).is_empty());
    }

    #[test]
    fn test_higher_level_test_is_deferred() {
        let mut h = harness(&[1.0, 2.0]);
        h.deliver(1, GhsMessage::Test { level: 3, name: 7.0 }).unwrap();

        assert!(h.sent_to(1).is_empty());
        let deferred = h.deferred();
        assert_eq!(deferred, vec![Envelope::new(EdgeId(1), GhsMessage::Test { level: 3, name: 7.0 })]);
    }

    #[test]
    fn test_same_fragment_test_is_rejected() {
        let mut h = harness(&[1.0, 2.0]);
        h.join_fragment(0, 1, 5.0);

        h.deliver(1, GhsMessage::Test { level: 1, name: 5.0 }).unwrap();
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Reject);
        assert_eq!(h.sent_to(1), vec![GhsMessage::Reject]);
    }

    #[test]
    fn test_foreign_fragment_test_is_accepted() {
        let mut h = harness(&[1.0, 2.0]);
        h.join_fragment(0, 1, 5.0);

        h.deliver(1, GhsMessage::Test { level: 0, name: 3.0 }).unwrap();
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Basic);
        assert_eq!(h.sent_to(1), vec![GhsMessage::Accept]);
    }

    #[test]
    fn test_crossing_tests_do_not_reply() {
        // both endpoints probe the same internal edge at once
        let mut h = harness(&[1.0, 2.0]);
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 1,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();
        assert_eq!(h.sent_to(0), vec![GhsMessage::Connect { level: 0 }]);
        assert_eq!(h.sent_to(1), vec![GhsMessage::Test { level: 1, name: 1.0 }]);

        h.deliver(1, GhsMessage::Test { level: 1, name: 1.0 }).unwrap();
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Reject);
        assert!(h.sent_to(1).is_empty());
        // nothing left to probe: leaf reports infinity to its father
        assert_eq!(h.node.state(), NodeState::Found);
        assert_eq!(h.sent_to(0), vec![GhsMessage::Report { weight: INFINITE_WEIGHT }]);
    }

    #[test]
    fn test_accept_records_best_and_reports() {
        let mut h = harness(&[1.0, 2.0]);
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 1,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();
        h.sent_to(0);
        h.sent_to(1);

        h.deliver(1, GhsMessage::Accept).unwrap();
        assert_eq!(h.node.state(), NodeState::Found);
        assert_eq!(h.sent_to(0), vec![GhsMessage::Report { weight: 2.0 }]);
    }

    #[test]
    fn test_reject_moves_to_next_candidate() {
        let mut h = harness(&[1.0, 2.0, 3.0]);
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 1,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();
        assert_eq!(h.sent_to(1), vec![GhsMessage::Test { level: 1, name: 1.0 }]);

        h.deliver(1, GhsMessage::Reject).unwrap();
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Reject);
        assert_eq!(h.sent_to(2), vec![GhsMessage::Test { level: 1, name: 1.0 }]);
        assert_eq!(h.node.state(), NodeState::Find);
    }

    #[test]
    fn test_report_waits_for_children() {
        let mut h = harness(&[1.0, 6.0, 3.0]);
        h.join_fragment(0, 1, 1.0);
        h.deliver(2, GhsMessage::Connect { level: 0 }).unwrap();
        h.sent_to(2);
        h.deliver(1, GhsMessage::Connect { level: 0 }).unwrap();
        h.sent_to(1);

        // both 1 and 2 are children now, nothing left to test
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 2,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();
        h.sent_to(1);
        h.sent_to(2);

        h.deliver(2, GhsMessage::Report { weight: 11.0 }).unwrap();
        assert!(h.sent_to(0).is_empty());
        assert_eq!(h.node.state(), NodeState::Find);

        h.deliver(1, GhsMessage::Report { weight: 8.0 }).unwrap();
        assert_eq!(h.sent_to(0), vec![GhsMessage::Report { weight: 8.0 }]);
        assert_eq!(h.node.state(), NodeState::Found);
    }

    #[test]
    fn test_father_report_deferred_while_searching() {
        let mut h = harness(&[1.0, 2.0]);
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 1,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();

        h.deliver(0, GhsMessage::Report { weight: 4.0 }).unwrap();
        assert_eq!(h.deferred().len(), 1);
        assert!(!h.node.is_completed());
    }

    #[test]
    fn test_heavier_core_report_changes_root() {
        let mut h = harness(&[1.0, 2.0]);
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 1,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();
        h.sent_to(1);
        h.deliver(1, GhsMessage::Accept).unwrap();
        h.sent_to(0);

        // other core vertex found nothing better than 2.0
        h.deliver(0, GhsMessage::Report { weight: 9.0 }).unwrap();
        assert_eq!(h.sent_to(1), vec![GhsMessage::Connect { level: 1 }]);
        assert_eq!(h.node.edges()[1].status(), EdgeStatus::Branch);
    }

    #[test]
    fn test_mutual_infinite_report_completes() {
        let mut h = harness(&[1.0]);
        h.deliver(
            0,
            GhsMessage::Initiate {
                level: 1,
                name: 1.0,
                state: NodeState::Find,
            },
        )
        .unwrap();
        assert_eq!(h.node.father(), None);

        h.deliver(0, GhsMessage::Report { weight: INFINITE_WEIGHT }).unwrap();
        assert!(h.node.is_completed());
        assert_eq!(h.node.father(), Some(EdgeId(0)));

        let sent = h.sent_to(0);
        assert_eq!(sent.last(), Some(&GhsMessage::Halt));
        assert_eq!(h.metrics.snapshot().sent_of(MessageKind::Halt), 1);
    }

    #[test]
    fn test_halt_to_finished_peer_is_tolerated() {
        let mut h = harness(&[1.0]);
        h.node.wakeup().unwrap();
        let closed = h.peers.remove(0);
        drop(closed);

        h.node.complete().unwrap();
        assert!(h.node.is_completed());
        assert_eq!(h.metrics.snapshot().undeliverable_halts, 1);
    }

    #[test]
    fn test_unknown_sender_edge_is_fatal() {
        let mut h = harness(&[1.0]);
        let err = h.deliver(5, GhsMessage::Accept).unwrap_err();
        assert_eq!(
            err,
            GhsError::UnknownSenderEdge {
                vertex: VertexId(0),
                edge: EdgeId(5)
            }
        );
    }

    #[test]
    fn test_report_snapshot() {
        let mut h = harness(&[1.0, 2.0]);
        h.node.wakeup().unwrap();
        let report = h.node.report();
        assert_eq!(report.vertex, VertexId(0));
        assert!(!report.completed);
        assert_eq!(report.branch_edges().collect::<Vec<_>>(), vec![EdgeId(0)]);
    }
}
