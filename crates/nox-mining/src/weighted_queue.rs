//! Weighted priority queue over transaction candidates.
//!
//! Candidates live in an arena owned by the selection engine; the queue and
//! the dependency map reference them by index. Ordering is fully
//! deterministic: the weight is a composite key of priority and fee
//! density, with insertion order breaking ties.

use nox_mempool::TxDesc;
use nox_types::Hash;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Index of a candidate in the selection arena.
pub type CandIdx = usize;

/// A candidate transaction with its selection metadata.
#[derive(Clone)]
pub struct TxCandidate {
    /// The pooled transaction and its fee metadata.
    pub desc: TxDesc,
    /// Legacy priority, value × age over adjusted size.
    pub priority: f64,
    /// Ids of pooled predecessors this candidate waits on. `None` once the
    /// candidate is queue-ready.
    pub depends_on: Option<HashSet<Hash>>,
}

impl TxCandidate {
    /// Wrap a descriptor with no dependencies and zero priority.
    pub fn new(desc: TxDesc) -> Self {
        Self {
            desc,
            priority: 0.0,
            depends_on: None,
        }
    }
}

/// Ordering mode of the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    /// Order on (priority desc, fee-per-kB desc).
    PriorityThenFee,
    /// Order on (fee-per-kB desc, priority desc).
    FeeThenPriority,
}

/// Heap entry carrying the composite key.
#[derive(Clone, Copy, Debug)]
struct QueueEntry {
    idx: CandIdx,
    priority: f64,
    fee_per_kb: i64,
    seq: u64,
    mode: SortMode,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        let keys = match self.mode {
            SortMode::PriorityThenFee => self
                .priority
                .total_cmp(&other.priority)
                .then(self.fee_per_kb.cmp(&other.fee_per_kb)),
            SortMode::FeeThenPriority => self
                .fee_per_kb
                .cmp(&other.fee_per_kb)
                .then(self.priority.total_cmp(&other.priority)),
        };
        // Earlier insertion wins ties, so the max-heap must see a lower
        // sequence number as greater.
        keys.then(other.seq.cmp(&self.seq))
    }
}

/// Max-queue over candidate indices under the current sort mode.
pub struct WeightedTxQueue {
    heap: BinaryHeap<QueueEntry>,
    mode: SortMode,
    next_seq: u64,
}

impl WeightedTxQueue {
    /// Create a queue in the given mode with reserved capacity.
    pub fn new(mode: SortMode, capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            mode,
            next_seq: 0,
        }
    }

    /// Current ordering mode.
    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Queue a candidate under its key values.
    pub fn push(&mut self, idx: CandIdx, priority: f64, fee_per_kb: i64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            idx,
            priority,
            fee_per_kb,
            seq,
            mode: self.mode,
        });
    }

    /// Remove and return the maximum candidate under the current key.
    pub fn pop(&mut self) -> Option<CandIdx> {
        self.heap.pop().map(|entry| entry.idx)
    }

    /// Number of queued candidates.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Switch the ordering mode, re-keying every queued entry. Insertion
    /// sequence numbers survive the switch so ties stay stable.
    pub fn set_mode(&mut self, mode: SortMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        for entry in &mut entries {
            entry.mode = mode;
        }
        self.heap = BinaryHeap::from(entries);
    }
}
