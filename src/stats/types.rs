use crate::stats::error::FetchResult;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Traffic direction as reported by the upstream counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Downlink,
    Uplink,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Downlink, Direction::Uplink];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Downlink => "downlink",
            Direction::Uplink => "uplink",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed traffic categories tracked by the upstream process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    InboundApi,
    InboundMetricsIn,
    InboundVlessTls,
    OutboundBlock,
    OutboundDirect,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::InboundApi,
        Category::InboundMetricsIn,
        Category::InboundVlessTls,
        Category::OutboundBlock,
        Category::OutboundDirect,
    ];

    /// Stable position of this category inside `Category::ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Dotted upstream path, e.g. `inbound.vless_tls`
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::InboundApi => "inbound.api",
            Category::InboundMetricsIn => "inbound.metrics_in",
            Category::InboundVlessTls => "inbound.vless_tls",
            Category::OutboundBlock => "outbound.block",
            Category::OutboundDirect => "outbound.direct",
        }
    }

    /// Exported counter name for one direction of this category
    pub fn metric_name(&self, direction: Direction) -> &'static str {
        match (self, direction) {
            (Category::InboundApi, Direction::Downlink) => "pp_inbound_api_downlink",
            (Category::InboundApi, Direction::Uplink) => "pp_inbound_api_uplink",
            (Category::InboundMetricsIn, Direction::Downlink) => "pp_inbound_metrics_in_downlink",
            (Category::InboundMetricsIn, Direction::Uplink) => "pp_inbound_metrics_in_uplink",
            (Category::InboundVlessTls, Direction::Downlink) => "pp_inbound_vless_tls_downlink",
            (Category::InboundVlessTls, Direction::Uplink) => "pp_inbound_vless_tls_uplink",
            (Category::OutboundBlock, Direction::Downlink) => "pp_outbound_block_downlink",
            (Category::OutboundBlock, Direction::Uplink) => "pp_outbound_block_uplink",
            (Category::OutboundDirect, Direction::Downlink) => "pp_outbound_direct_downlink",
            (Category::OutboundDirect, Direction::Uplink) => "pp_outbound_direct_uplink",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute lifetime byte counters for one series pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrafficCounters {
    #[serde(deserialize_with = "null_as_default")]
    pub downlink: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub uplink: u64,
}

impl TrafficCounters {
    pub fn new(downlink: u64, uplink: u64) -> Self {
        Self { downlink, uplink }
    }

    pub fn get(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Downlink => self.downlink,
            Direction::Uplink => self.uplink,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InboundStats {
    #[serde(deserialize_with = "null_as_default")]
    pub api: TrafficCounters,
    #[serde(deserialize_with = "null_as_default")]
    pub metrics_in: TrafficCounters,
    #[serde(deserialize_with = "null_as_default")]
    pub vless_tls: TrafficCounters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutboundStats {
    #[serde(deserialize_with = "null_as_default")]
    pub block: TrafficCounters,
    #[serde(deserialize_with = "null_as_default")]
    pub direct: TrafficCounters,
}

/// Point-in-time absolute counters from one successful poll
///
/// Every value is a lifetime total. A value lower than the previous poll's
/// means the upstream counter was reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub inbound: InboundStats,
    #[serde(deserialize_with = "null_as_default")]
    pub outbound: OutboundStats,
    #[serde(deserialize_with = "users_or_empty")]
    pub user: HashMap<String, TrafficCounters>,
}

/// Root of the upstream introspection document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DebugVars {
    #[serde(deserialize_with = "null_as_default")]
    stats: Snapshot,
}

/// Key of the per-user map; its children are identities, not field names
const USER_KEY: &str = "user";

/// `null` decodes like a missing value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn users_or_empty<'de, D>(deserializer: D) -> Result<HashMap<String, TrafficCounters>, D::Error>
where
    D: Deserializer<'de>,
{
    let users = Option::<HashMap<String, Option<TrafficCounters>>>::deserialize(deserializer)?;
    Ok(users
        .unwrap_or_default()
        .into_iter()
        .map(|(identity, counters)| (identity, counters.unwrap_or_default()))
        .collect())
}

/// Lowercase object keys so field names match regardless of case
///
/// User identities are kept verbatim. When two keys fold to the same name,
/// the one already in lowercase wins.
fn fold_keys(value: Value, keep_keys: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = Map::with_capacity(map.len());
            for (key, child) in map {
                if keep_keys {
                    folded.insert(key, fold_keys(child, false));
                    continue;
                }

                let lower = key.to_lowercase();
                let child = fold_keys(child, lower == USER_KEY);
                if key == lower || !folded.contains_key(&lower) {
                    folded.insert(lower, child);
                }
            }
            Value::Object(folded)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| fold_keys(v, false)).collect())
        }
        other => other,
    }
}

impl Snapshot {
    /// Decode a full upstream document (the snapshot lives under `stats`)
    ///
    /// Field names match case-insensitively and `null` counts as zero.
    pub fn from_slice(body: &[u8]) -> FetchResult<Self> {
        let raw: Value = serde_json::from_slice(body)?;
        let vars: DebugVars = serde_json::from_value(fold_keys(raw, false))?;
        Ok(vars.stats)
    }

    pub fn fixed(&self, category: Category) -> TrafficCounters {
        match category {
            Category::InboundApi => self.inbound.api,
            Category::InboundMetricsIn => self.inbound.metrics_in,
            Category::InboundVlessTls => self.inbound.vless_tls,
            Category::OutboundBlock => self.outbound.block,
            Category::OutboundDirect => self.outbound.direct,
        }
    }

    pub fn fixed_mut(&mut self, category: Category) -> &mut TrafficCounters {
        match category {
            Category::InboundApi => &mut self.inbound.api,
            Category::InboundMetricsIn => &mut self.inbound.metrics_in,
            Category::InboundVlessTls => &mut self.inbound.vless_tls,
            Category::OutboundBlock => &mut self.outbound.block,
            Category::OutboundDirect => &mut self.outbound.direct,
        }
    }

    pub fn users(&self) -> &HashMap<String, TrafficCounters> {
        &self.user
    }

    /// Builder-style helper for setting one fixed category
    pub fn with_fixed(mut self, category: Category, counters: TrafficCounters) -> Self {
        *self.fixed_mut(category) = counters;
        self
    }

    /// Builder-style helper for setting one user's counters
    pub fn with_user(mut self, identity: impl Into<String>, counters: TrafficCounters) -> Self {
        self.user.insert(identity.into(), counters);
        self
    }
}
