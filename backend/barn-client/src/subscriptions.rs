//! Buckets this session receives push notifications for.

use std::collections::HashSet;

/// Set of subscribed bucket names.
///
/// Mutated only when the server acknowledges a `REGISTEREVENT` or
/// `UNREGISTEREVENT`, never when the request is sent. Iteration order
/// carries no meaning; [`sorted`](SubscriptionRegistry::sorted) exists for
/// stable display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionRegistry {
    buckets: HashSet<String>,
}

impl SubscriptionRegistry {
    pub fn contains(&self, bucket_name: &str) -> bool {
        self.buckets.contains(bucket_name)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(String::as_str)
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut buckets: Vec<String> = self.buckets.iter().cloned().collect();
        buckets.sort();
        buckets
    }

    /// Returns false if the bucket was already registered.
    pub(crate) fn insert(&mut self, bucket_name: &str) -> bool {
        self.buckets.insert(bucket_name.to_string())
    }

    /// Returns false (and does nothing) if the bucket was not registered.
    pub(crate) fn remove(&mut self, bucket_name: &str) -> bool {
        self.buckets.remove(bucket_name)
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}
