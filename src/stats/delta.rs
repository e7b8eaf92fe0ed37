//! Delta computation between consecutive snapshots
//!
//! Upstream values are lifetime totals. Exported counters only ever grow, so
//! each cycle contributes `max(current - previous, 0)` per series. A drop is
//! treated as an upstream reset: the cycle contributes nothing and the stored
//! value resyncs to the lower reading.

use crate::metrics::MetricSink;
use crate::stats::state::SeriesStore;
use crate::stats::types::{Category, Direction, Snapshot, TrafficCounters};

/// Non-negative increment between two absolute readings
pub fn counter_delta(previous: u64, current: u64) -> u64 {
    current.saturating_sub(previous)
}

/// Outcome of reconciling one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Non-zero increments issued to the sink
    pub increments: usize,
    /// Series whose reading went backwards this cycle
    pub resets: usize,
    /// Users present in the snapshot
    pub users_seen: usize,
    /// Users observed for the first time
    pub new_users: usize,
}

/// Reconcile `snapshot` against `store`, incrementing `sink` by the deltas
///
/// Users absent from the snapshot keep their stored readings untouched and
/// receive no increment. A user's first observation counts from zero and
/// always materialises both of its exported series.
pub fn apply_snapshot<K>(store: &mut SeriesStore, snapshot: &Snapshot, sink: &K) -> ApplyReport
where
    K: MetricSink + ?Sized,
{
    let mut report = ApplyReport::default();

    for category in Category::ALL {
        let previous = store.previous_fixed(category);
        let current = snapshot.fixed(category);

        for direction in Direction::ALL {
            let delta = observe(&mut report, previous, current, direction, || {
                category.metric_name(direction).to_string()
            });
            if delta > 0 {
                sink.increment_fixed(category, direction, delta);
                report.increments += 1;
            }
        }

        store.set_fixed(category, current);
    }

    for (identity, current) in snapshot.users() {
        report.users_seen += 1;

        let stored = store.previous_user(identity);
        let first_seen = stored.is_none();
        if first_seen {
            report.new_users += 1;
            tracing::debug!(user = %identity, "New user series");
        }
        let previous = stored.unwrap_or_default();

        for direction in Direction::ALL {
            let delta = observe(&mut report, previous, *current, direction, || {
                format!("user {identity}")
            });
            if delta > 0 {
                report.increments += 1;
            }
            if delta > 0 || first_seen {
                sink.increment_user(identity, direction, delta);
            }
        }

        store.set_user(identity, *current);
    }

    report
}

fn observe(
    report: &mut ApplyReport,
    previous: TrafficCounters,
    current: TrafficCounters,
    direction: Direction,
    series: impl Fn() -> String,
) -> u64 {
    let previous = previous.get(direction);
    let current = current.get(direction);

    if current < previous {
        report.resets += 1;
        tracing::debug!(
            series = %series(),
            %direction,
            previous,
            current,
            "Upstream counter reset, resyncing"
        );
    }

    counter_delta(previous, current)
}
