use std::collections::{HashSet, VecDeque};

use ratecache_core::{Timestamp, batch_start};

/// Deduplicated FIFO of batch-aligned fetch starts.
#[derive(Debug)]
pub struct PendingJobs {
    batch_secs: u64,
    order: VecDeque<Timestamp>,
    members: HashSet<Timestamp>,
}

impl PendingJobs {
    pub fn new(batch_secs: u64) -> Self {
        Self {
            batch_secs,
            order: VecDeque::new(),
            members: HashSet::new(),
        }
    }

    /// Start of the batch that covers `ts`.
    pub const fn normalize(&self, ts: Timestamp) -> Timestamp {
        batch_start(ts, self.batch_secs)
    }

    /// Schedule the batch covering `ts`. Returns whether a new job was created.
    pub fn add(&mut self, ts: Timestamp) -> bool {
        let job = self.normalize(ts);
        if !self.members.insert(job) {
            return false;
        }
        self.order.push_back(job);
        true
    }

    /// Remove and return the oldest job.
    pub fn pop(&mut self) -> Option<Timestamp> {
        let job = self.order.pop_front()?;
        self.members.remove(&job);
        Some(job)
    }

    pub fn contains(&self, job: Timestamp) -> bool {
        self.members.contains(&job)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Jobs in dispatch order.
    pub fn snapshot(&self) -> Vec<Timestamp> {
        self.order.iter().copied().collect()
    }
}
