//! Folding classified commits into trust buckets.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{CommitRecord, SignatureCode};

/// Per-code tally of every commit seen in a run, trusted ones included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub total: usize,
    pub by_code: BTreeMap<SignatureCode, usize>,
}

/// Final bucket contents of a run.
///
/// `unsigned` is always an order-preserving sub-list of `invalidated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Buckets {
    pub unsigned: Vec<CommitRecord>,
    pub invalidated: Vec<CommitRecord>,
    pub summary: AuditSummary,
}

/// Append-only accumulator, fed in stream order.
#[derive(Debug, Default)]
pub struct Aggregator {
    buckets: Buckets,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one commit. Trusted commits are only counted.
    pub fn push(&mut self, record: CommitRecord) {
        let summary = &mut self.buckets.summary;
        summary.total += 1;
        *summary.by_code.entry(record.signature).or_insert(0) += 1;

        if record.signature.is_trusted() {
            return;
        }
        if record.signature.is_unsigned() {
            self.buckets.unsigned.push(record.clone());
        }
        self.buckets.invalidated.push(record);
    }

    /// Commits pushed so far, trusted ones included.
    pub(crate) fn len(&self) -> usize {
        self.buckets.summary.total
    }

    /// Close the accumulator; buckets are read-only from here on.
    pub fn finish(self) -> Buckets {
        self.buckets
    }
}

impl Extend<CommitRecord> for Aggregator {
    fn extend<I: IntoIterator<Item = CommitRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}
