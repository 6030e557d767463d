use crate::normalize::NormalizedUrl;
use std::collections::HashSet;

/// A URL waiting to be fetched, tagged with its hop distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: NormalizedUrl,
    pub depth: usize,
}

/// Outcome of [`VisitedSet::insert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    Duplicate,
    CapReached,
}

/// Every URL enqueued or visited during one crawl, in discovery order.
///
/// Only grows. Membership is decided by [`NormalizedUrl::key`], so the first
/// spelling of a URL is the one kept.
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: HashSet<String>,
    order: Vec<NormalizedUrl>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` unless it is already present or the set holds `cap`
    /// entries. The membership test, cap check and insert happen together.
    pub fn insert_if_absent(&mut self, url: &NormalizedUrl, cap: usize) -> Insertion {
        if self.keys.contains(url.key()) {
            return Insertion::Duplicate;
        }
        if self.order.len() >= cap {
            return Insertion::CapReached;
        }
        self.keys.insert(url.key().to_string());
        self.order.push(url.clone());
        Insertion::Inserted
    }

    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.keys.contains(url.key())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_full(&self, cap: usize) -> bool {
        self.order.len() >= cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<NormalizedUrl> {
        self.order
    }
}
