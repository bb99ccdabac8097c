//! Read-only analytics over an immutable innings snapshot.
//!
//! Each module is an independent query component; none mutates the snapshot
//! and none depends on another's output.

pub mod allocation;
pub mod clustering;
pub mod leaderboard;
pub mod matchup;
pub mod momentum;
pub mod name_index;
pub mod patterns;
pub mod range_index;
pub mod recommender;
pub mod win_probability;

use serde::ser::{Serialize, Serializer};

/// String-keyed map that serializes as a JSON object in insertion order.
///
/// Several query contracts are maps whose order carries meaning (e.g. sorted
/// by descending count), which a `HashMap`/`BTreeMap` would lose.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        OrderedMap(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        OrderedMap(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Round to `places` decimals for presentation fields.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
