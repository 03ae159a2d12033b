//! Actor System Core
//!
//! Lifecycle driver for vertex actors and the orchestrator of one GHS run.
//!
//! ## Lifecycle
//!
//! Every actor runs as one tokio task through [`ActorTask::run`]:
//!
//! 1. `on_start` (spontaneous wakeup if the [`WakeupBudget`] allows it)
//! 2. message loop, one message at a time, until `is_finished`
//! 3. mailbox closed, `on_stop`, behavior handed back to the joiner
//!
//! A mailbox that runs dry before the actor finished is a
//! [`GhsError::PrematureTermination`].
//!
//! ## Run
//!
//! [`GhsSystem::run`] builds all mailboxes and edge proxies up front, spawns
//! every actor into one [`JoinSet`], and joins **all** of them before any
//! edge status is read. The first actor error aborts the remaining tasks and
//! is returned to the caller.

use crate::edge::Edge;
use crate::mailbox::{Mailbox, MailboxReceiver};
use crate::messages::{MetricsSnapshot, ProtocolMetrics};
use crate::node::{FragmentSeed, NodeActor, NodeReport};
use async_trait::async_trait;
use ghs_types::{EdgeId, EdgeStatus, Envelope, GhsError, Result, Topology, VertexId, WeightedEdge};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Behavior driven by an [`ActorTask`]
#[async_trait]
pub trait ActorBehavior: Send + 'static {
    type Message: Send + 'static;

    fn id(&self) -> VertexId;

    /// Called once before the first message
    async fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Handle one message to completion
    async fn handle(&mut self, msg: Self::Message) -> Result<()>;

    /// Stop reading the mailbox once this returns true
    fn is_finished(&self) -> bool;

    /// Called once after the mailbox is closed
    async fn on_stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Task wrapper owning one behavior and its mailbox receiver
pub struct ActorTask<A: ActorBehavior> {
    behavior: A,
    receiver: MailboxReceiver<A::Message>,
    metrics: Arc<ProtocolMetrics>,
}

impl<A: ActorBehavior> ActorTask<A> {
    pub fn new(behavior: A, receiver: MailboxReceiver<A::Message>, metrics: Arc<ProtocolMetrics>) -> Self {
        Self {
            behavior,
            receiver,
            metrics,
        }
    }

    /// Drive the behavior to completion and hand it back
    pub async fn run(mut self) -> Result<A> {
        let task_start = Instant::now();
        let id = self.behavior.id();
        debug!(actor_id = %id, "Starting actor task");

        if let Err(e) = self.behavior.on_start().await {
            error!(
                actor_id = %id,
                error = %e,
                error_category = e.category(),
                "Actor failed during start"
            );
            return Err(e);
        }

        while !self.behavior.is_finished() {
            let Some(msg) = self.receiver.recv().await else {
                error!(actor_id = %id, "Mailbox drained before actor finished");
                return Err(GhsError::PrematureTermination { vertex: id });
            };

            let start = Instant::now();
            match self.behavior.handle(msg).await {
                Ok(()) => self.metrics.record_message_handled(start.elapsed()),
                Err(e) => {
                    error!(
                        actor_id = %id,
                        error = %e,
                        error_category = e.category(),
                        processing_duration_ns = start.elapsed().as_nanos() as u64,
                        "Actor message processing failed"
                    );
                    return Err(e);
                }
            }
        }

        // late halts from neighbors are refused from here on
        self.receiver.close();

        if let Err(e) = self.behavior.on_stop().await {
            warn!(actor_id = %id, error = %e, "Actor failed to stop cleanly");
        }

        debug!(
            actor_id = %id,
            total_runtime_ms = task_start.elapsed().as_millis() as u64,
            "Actor task finished"
        );
        Ok(self.behavior)
    }
}

/// Shared count of spontaneous wakeups still available
#[derive(Debug)]
pub struct WakeupBudget {
    limit: usize,
    claimed: Mutex<usize>,
}

impl WakeupBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            claimed: Mutex::new(0),
        }
    }

    /// Take one slot; false once `limit` actors have claimed theirs
    pub fn try_claim(&self) -> bool {
        let mut claimed = self.claimed.lock();
        if *claimed < self.limit {
            *claimed += 1;
            true
        } else {
            false
        }
    }

    pub fn claimed(&self) -> usize {
        *self.claimed.lock()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Orchestrator of one GHS run over a validated topology
#[derive(Debug)]
pub struct GhsSystem {
    topology: Arc<Topology>,
    initiators: usize,
    metrics: Arc<ProtocolMetrics>,
}

impl GhsSystem {
    /// `initiators` is clamped to the vertex count. Zero is only valid for a
    /// single vertex graph, which needs no wakeup at all.
    pub fn new(topology: Topology, initiators: usize) -> Result<Self> {
        let n = topology.vertex_count();
        if initiators == 0 && n > 1 {
            return Err(GhsError::configuration(
                "at least one vertex must wake up spontaneously",
                Some("initiators"),
            ));
        }

        Ok(Self {
            initiators: initiators.min(n),
            topology: Arc::new(topology),
            metrics: Arc::new(ProtocolMetrics::new()),
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn initiators(&self) -> usize {
        self.initiators
    }

    /// Build one actor per vertex with edge proxies pointing at the peers'
    /// mailboxes
    fn build_actors(&self) -> Vec<(NodeActor, MailboxReceiver<Envelope>)> {
        let n = self.topology.vertex_count();
        let budget = Arc::new(WakeupBudget::new(self.initiators));

        let (mailboxes, receivers): (Vec<_>, Vec<_>) =
            (0..n).map(|v| Mailbox::<Envelope>::new(VertexId(v))).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(v, receiver)| {
                let vertex = VertexId(v);
                let edges = self
                    .topology
                    .incident(vertex)
                    .filter_map(|e| {
                        let peer = e.other(vertex)?;
                        Some(Edge::new(e.id, e.weight, mailboxes[peer.index()].clone()))
                    })
                    .collect();

                let actor = NodeActor::new(vertex, edges, mailboxes[v].clone(), FragmentSeed::default())
                    .with_wakeup_budget(Arc::clone(&budget))
                    .with_metrics(Arc::clone(&self.metrics));
                (actor, receiver)
            })
            .collect()
    }

    /// Run the protocol to termination and collect every vertex's final view
    pub async fn run(self) -> Result<RunReport> {
        let started = Instant::now();
        info!(
            vertices = self.topology.vertex_count(),
            edges = self.topology.edge_count(),
            initiators = self.initiators,
            "Starting GHS run"
        );

        let mut tasks = JoinSet::new();
        let mut spawned = HashMap::new();
        for (actor, receiver) in self.build_actors() {
            let vertex = actor.vertex();
            let task = ActorTask::new(actor, receiver, Arc::clone(&self.metrics));
            let handle = tasks.spawn(task.run());
            spawned.insert(handle.id(), vertex);
        }

        let mut reports = Vec::with_capacity(spawned.len());
        let mut first_error: Option<GhsError> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let failure = match joined {
                Ok((_, Ok(node))) => {
                    reports.push(node.report());
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(join_error) if join_error.is_cancelled() && first_error.is_some() => continue,
                Err(join_error) => GhsError::ActorFailed {
                    vertex: spawned
                        .get(&join_error.id())
                        .copied()
                        .unwrap_or(VertexId(usize::MAX)),
                    message: join_error.to_string(),
                },
            };

            if first_error.is_none() {
                error!(error = %failure, "Actor failed, aborting run");
                tasks.abort_all();
                first_error = Some(failure);
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        reports.sort_by_key(|r| r.vertex);
        let report = RunReport {
            reports,
            metrics: self.metrics.snapshot(),
            topology: self.topology,
            elapsed: started.elapsed(),
        };

        info!(
            vertices = report.reports.len(),
            messages = report.metrics.total_sent(),
            deferred = report.metrics.total_deferred(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "GHS run finished"
        );
        Ok(report)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One report per vertex, ordered by vertex id
    pub reports: Vec<NodeReport>,
    pub metrics: MetricsSnapshot,
    pub topology: Arc<Topology>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn all_completed(&self) -> bool {
        self.reports.iter().all(|r| r.completed)
    }

    /// Edges marked `Branch` by both endpoints, ordered by weight.
    ///
    /// An edge that only one endpoint considers `Branch` means the endpoints
    /// disagree about the tree and is reported as a protocol violation.
    pub fn tree_edges(&self) -> Result<Vec<WeightedEdge>> {
        let status: HashMap<(VertexId, EdgeId), EdgeStatus> = self
            .reports
            .iter()
            .flat_map(|r| r.edge_statuses.iter().map(move |(id, s)| ((r.vertex, *id), *s)))
            .collect();

        let mut tree = Vec::new();
        for edge in self.topology.edges() {
            let at_u = status.get(&(edge.u, edge.id)).copied();
            let at_v = status.get(&(edge.v, edge.id)).copied();
            match (at_u, at_v) {
                (Some(EdgeStatus::Branch), Some(EdgeStatus::Branch)) => tree.push(*edge),
                (Some(EdgeStatus::Branch), _) | (_, Some(EdgeStatus::Branch)) => {
                    return Err(GhsError::protocol(format!(
                        "endpoints disagree on {edge}: {} sees {:?}, {} sees {:?}",
                        edge.u, at_u, edge.v, at_v
                    )));
                }
                _ => {}
            }
        }

        tree.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        Ok(tree)
    }

    pub fn total_weight(&self) -> Result<f64> {
        Ok(self.tree_edges()?.iter().map(|e| e.weight).sum())
    }

    /// Messages exchanged between vertices, excluding self-requeues
    pub fn message_count(&self) -> u64 {
        self.metrics.total_sent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghs_types::{DisjointSet, GhsMessage};

    async fn run(vertices: usize, edges: &[(usize, usize, f64)], initiators: usize) -> RunReport {
        let topology = Topology::new(vertices, edges).unwrap();
        GhsSystem::new(topology, initiators).unwrap().run().await.unwrap()
    }

    fn kruskal_weight(vertices: usize, edges: &[(usize, usize, f64)]) -> f64 {
        let mut sorted = edges.to_vec();
        sorted.sort_by(|a, b| a.2.total_cmp(&b.2));
        let mut sets = DisjointSet::new(vertices);
        sorted
            .iter()
            .filter(|(u, v, _)| sets.union(*u, *v))
            .map(|(_, _, w)| w)
            .sum()
    }

    fn as_triples(tree: &[WeightedEdge]) -> Vec<(usize, usize, f64)> {
        tree.iter().map(|e| (e.u.0, e.v.0, e.weight)).collect()
    }

    #[test]
    fn test_wakeup_budget_limits_claims() {
        let budget = WakeupBudget::new(2);
        assert!(budget.try_claim());
        assert!(budget.try_claim());
        assert!(!budget.try_claim());
        assert_eq!(budget.claimed(), 2);
        assert_eq!(budget.limit(), 2);
    }

    #[test]
    fn test_zero_initiators_rejected() {
        let topology = Topology::new(2, &[(0, 1, 1.0)]).unwrap();
        let err = GhsSystem::new(topology, 0).unwrap_err();
        assert_eq!(err.category(), "configuration");

        let single = Topology::new(1, &[]).unwrap();
        assert!(GhsSystem::new(single, 0).is_ok());
    }

    #[test]
    fn test_initiators_clamped_to_vertex_count() {
        let topology = Topology::new(2, &[(0, 1, 1.0)]).unwrap();
        assert_eq!(GhsSystem::new(topology, 10).unwrap().initiators(), 2);
    }

    #[derive(Debug)]
    struct Countdown {
        remaining: usize,
    }

    #[async_trait]
    impl ActorBehavior for Countdown {
        type Message = ();

        fn id(&self) -> VertexId {
            VertexId(0)
        }

        async fn handle(&mut self, _msg: ()) -> Result<()> {
            self.remaining -= 1;
            Ok(())
        }

        fn is_finished(&self) -> bool {
            self.remaining == 0
        }
    }

    #[tokio::test]
    async fn test_task_stops_when_finished() {
        let (mailbox, receiver) = Mailbox::new(VertexId(0));
        for _ in 0..3 {
            mailbox.send(()).unwrap();
        }
        let metrics = Arc::new(ProtocolMetrics::new());
        let task = ActorTask::new(Countdown { remaining: 2 }, receiver, Arc::clone(&metrics));

        let behavior = task.run().await.unwrap();
        assert_eq!(behavior.remaining, 0);
        assert_eq!(metrics.snapshot().messages_processed, 2);
        // receiver closed once finished
        assert!(mailbox.send(()).is_err());
    }

    #[tokio::test]
    async fn test_task_reports_premature_termination() {
        let (mailbox, receiver) = Mailbox::new(VertexId(0));
        mailbox.send(()).unwrap();
        drop(mailbox);
        let task = ActorTask::new(Countdown { remaining: 2 }, receiver, Arc::new(ProtocolMetrics::new()));

        let err = task.run().await.unwrap_err();
        assert_eq!(err, GhsError::PrematureTermination { vertex: VertexId(0) });
    }

    #[tokio::test]
    async fn test_unknown_edge_fails_actor() {
        let (inbox, receiver) = Mailbox::new(VertexId(0));
        let (peer, _peer_rx) = Mailbox::new(VertexId(1));
        let actor = NodeActor::new(
            VertexId(0),
            vec![Edge::new(EdgeId(0), 1.0, peer)],
            inbox.clone(),
            FragmentSeed::default(),
        );
        inbox
            .send(Envelope::new(EdgeId(42), GhsMessage::Accept))
            .unwrap();

        let err = ActorTask::new(actor, receiver, Arc::new(ProtocolMetrics::new()))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, GhsError::UnknownSenderEdge { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_vertex_completes_immediately() {
        let report = run(1, &[], 0).await;
        assert!(report.all_completed());
        assert!(report.tree_edges().unwrap().is_empty());
        assert_eq!(report.message_count(), 0);
        assert_eq!(report.reports[0].father, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_vertices_share_one_branch() {
        let report = run(2, &[(0, 1, 7.0)], 2).await;
        assert!(report.all_completed());
        assert_eq!(as_triples(&report.tree_edges().unwrap()), vec![(0, 1, 7.0)]);

        for node in &report.reports {
            assert_eq!(node.edge_statuses, vec![(EdgeId(0), EdgeStatus::Branch)]);
            assert_eq!(node.father, Some(EdgeId(0)));
            assert_eq!(node.level, 1);
        }
    }

    const FOUR: &[(usize, usize, f64)] = &[
        (0, 1, 10.0),
        (0, 2, 6.0),
        (0, 3, 5.0),
        (1, 3, 15.0),
        (2, 3, 4.0),
    ];

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_four_vertex_graph() {
        let report = run(4, FOUR, 4).await;
        assert!(report.all_completed());

        let tree = report.tree_edges().unwrap();
        assert_eq!(
            as_triples(&tree),
            vec![(2, 3, 4.0), (0, 3, 5.0), (0, 2, 6.0)]
        );
        assert_eq!(report.total_weight().unwrap(), 15.0);
        assert!(report.message_count() > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_initiator_reaches_same_tree() {
        let report = run(4, FOUR, 1).await;
        assert!(report.all_completed());
        assert_eq!(report.total_weight().unwrap(), 15.0);
        assert_eq!(report.tree_edges().unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ring_drops_heaviest_edge() {
        let n = 12;
        let edges: Vec<_> = (0..n)
            .map(|i| (i, (i + 1) % n, ((i * 7) % n) as f64 + 1.0))
            .collect();
        let heaviest = edges
            .iter()
            .copied()
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .unwrap();

        let report = run(n, &edges, n).await;
        let tree = as_triples(&report.tree_edges().unwrap());
        assert_eq!(tree.len(), n - 1);
        assert!(!tree.contains(&heaviest));
        assert_eq!(report.total_weight().unwrap(), kruskal_weight(n, &edges));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_complete_graph_matches_kruskal() {
        let n = 7;
        let mut edges = Vec::new();
        for u in 0..n {
            for v in (u + 1)..n {
                // distinct, unsorted weights
                edges.push((u, v, ((u * 31 + v * 17) % 97) as f64 + (u * n + v) as f64 / 100.0));
            }
        }

        let report = run(n, &edges, 3).await;
        let tree = report.tree_edges().unwrap();
        assert_eq!(tree.len(), n - 1);

        let mut sets = DisjointSet::new(n);
        for e in &tree {
            assert!(sets.union(e.u.index(), e.v.index()), "cycle through {e}");
        }
        assert_eq!(sets.set_count(), 1);
        assert_eq!(report.total_weight().unwrap(), kruskal_weight(n, &edges));
        assert!(report.reports.iter().all(|r| r.father.is_some()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_core_endpoints_share_fragment_identity() {
        let report = run(4, FOUR, 4).await;
        let name = report.reports[0].name;
        let level = report.reports[0].level;
        for node in &report.reports {
            assert_eq!(node.name, name);
            assert_eq!(node.level, level);
        }
    }
}
