//! Metric sinks receiving counter increments from the delta applier

use crate::stats::{Category, Direction};
use metrics::counter;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Label carrying the user identity on per-user series
pub const USER_LABEL: &str = "email";

/// Exported per-user counter name for a direction
pub fn user_metric_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Downlink => "pp_user_downlink",
        Direction::Uplink => "pp_user_uplink",
    }
}

/// Destination for exported counter increments
///
/// Implementations must tolerate increments concurrent with scrape reads.
pub trait MetricSink: Send + Sync {
    fn increment_fixed(&self, category: Category, direction: Direction, amount: u64);

    /// Creates the series for `identity` on first use
    fn increment_user(&self, identity: &str, direction: Direction, amount: u64);
}

impl<T: MetricSink + ?Sized> MetricSink for Arc<T> {
    fn increment_fixed(&self, category: Category, direction: Direction, amount: u64) {
        (**self).increment_fixed(category, direction, amount)
    }

    fn increment_user(&self, identity: &str, direction: Direction, amount: u64) {
        (**self).increment_user(identity, direction, amount)
    }
}

/// Sink backed by the `metrics` facade and whichever recorder is installed
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl MetricSink for PrometheusSink {
    fn increment_fixed(&self, category: Category, direction: Direction, amount: u64) {
        counter!(category.metric_name(direction)).increment(amount);
    }

    fn increment_user(&self, identity: &str, direction: Direction, amount: u64) {
        counter!(user_metric_name(direction), USER_LABEL => identity.to_string()).increment(amount);
    }
}

/// Lock-protected in-process sink, readable directly
#[derive(Debug, Default)]
pub struct InMemorySink {
    fixed: RwLock<HashMap<(Category, Direction), u64>>,
    users: RwLock<HashMap<(String, Direction), u64>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed_value(&self, category: Category, direction: Direction) -> u64 {
        self.fixed
            .read()
            .get(&(category, direction))
            .copied()
            .unwrap_or(0)
    }

    /// `None` if the user's series was never materialised
    pub fn user_value(&self, identity: &str, direction: Direction) -> Option<u64> {
        self.users
            .read()
            .get(&(identity.to_string(), direction))
            .copied()
    }

    /// Number of distinct user identities with at least one series
    pub fn user_count(&self) -> usize {
        let users = self.users.read();
        let mut identities: Vec<&str> = users.keys().map(|(id, _)| id.as_str()).collect();
        identities.sort_unstable();
        identities.dedup();
        identities.len()
    }

    /// Copy of every fixed series value
    pub fn fixed_values(&self) -> HashMap<(Category, Direction), u64> {
        self.fixed.read().clone()
    }

    /// Copy of every per-user series value
    pub fn user_values(&self) -> HashMap<(String, Direction), u64> {
        self.users.read().clone()
    }
}

impl MetricSink for InMemorySink {
    fn increment_fixed(&self, category: Category, direction: Direction, amount: u64) {
        *self.fixed.write().entry((category, direction)).or_insert(0) += amount;
    }

    fn increment_user(&self, identity: &str, direction: Direction, amount: u64) {
        *self
            .users
            .write()
            .entry((identity.to_string(), direction))
            .or_insert(0) += amount;
    }
}
