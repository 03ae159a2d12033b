//! Protocol message statistics
//!
//! Counters shared by every actor of one run. Message complexity of GHS is
//! O(E + N log N); these counts are what the experiment results file records.

use ghs_types::MessageKind;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Run-wide message counters
#[derive(Debug, Default)]
pub struct ProtocolMetrics {
    sent: [AtomicU64; 8],
    deferred: [AtomicU64; 8],
    messages_processed: AtomicU64,
    total_processing_time_ns: AtomicU64,
    undeliverable_halts: AtomicU64,
}

impl ProtocolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message delivered to a neighbor's mailbox
    pub fn record_sent(&self, kind: MessageKind) {
        self.sent[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message put back into the receiver's own mailbox
    pub fn record_deferred(&self, kind: MessageKind) {
        self.deferred[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Halt sent to a neighbor that had already completed
    pub fn record_undeliverable_halt(&self) {
        self.undeliverable_halts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_handled(&self, duration: Duration) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn avg_processing_time_ns(&self) -> f64 {
        let count = self.messages_processed.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let total = self.total_processing_time_ns.load(Ordering::Relaxed);
        total as f64 / count as f64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let collect = |counters: &[AtomicU64; 8]| {
            MessageKind::ALL
                .iter()
                .map(|kind| (*kind, counters[kind.index()].load(Ordering::Relaxed)))
                .collect::<BTreeMap<_, _>>()
        };

        MetricsSnapshot {
            sent: collect(&self.sent),
            deferred: collect(&self.deferred),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            avg_processing_time_ns: self.avg_processing_time_ns(),
            undeliverable_halts: self.undeliverable_halts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ProtocolMetrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub sent: BTreeMap<MessageKind, u64>,
    pub deferred: BTreeMap<MessageKind, u64>,
    pub messages_processed: u64,
    pub avg_processing_time_ns: f64,
    pub undeliverable_halts: u64,
}

impl MetricsSnapshot {
    /// Messages exchanged between distinct vertices
    pub fn total_sent(&self) -> u64 {
        self.sent.values().sum()
    }

    pub fn total_deferred(&self) -> u64 {
        self.deferred.values().sum()
    }

    pub fn sent_of(&self, kind: MessageKind) -> u64 {
        self.sent.get(&kind).copied().unwrap_or(0)
    }
}
