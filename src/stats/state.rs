use crate::stats::types::{Category, TrafficCounters};
use std::collections::HashMap;

/// Last observed absolute value per tracked series
///
/// Owned by the poll loop and written only by the delta applier. Starts
/// empty, so every previous value is implicitly zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesStore {
    fixed: [TrafficCounters; Category::ALL.len()],
    users: HashMap<String, TrafficCounters>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_fixed(&self, category: Category) -> TrafficCounters {
        self.fixed[category.index()]
    }

    /// `None` until the identity has been observed at least once
    pub fn previous_user(&self, identity: &str) -> Option<TrafficCounters> {
        self.users.get(identity).copied()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub(crate) fn set_fixed(&mut self, category: Category, counters: TrafficCounters) {
        self.fixed[category.index()] = counters;
    }

    pub(crate) fn set_user(&mut self, identity: &str, counters: TrafficCounters) {
        match self.users.get_mut(identity) {
            Some(stored) => *stored = counters,
            None => {
                self.users.insert(identity.to_string(), counters);
            }
        }
    }
}
