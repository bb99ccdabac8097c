//! Memoised query evaluation.
//!
//! Results are pure functions of the immutable match model, so each one is
//! computed at most once per (team, query, parameters) key and shared via
//! `Arc` afterwards. Absent results are memoised too; errors are not.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::model::{MatchModel, Team};

use super::query::{run_query, QueryKind, QueryParams};
use super::{AnalysisSettings, MatchReport};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub team: Team,
    pub kind: QueryKind,
    pub params: QueryParams,
}

impl QueryKey {
    /// Canonical key: parameters a query ignores are dropped, and the
    /// whole-match win probability series is filed under the chasing side.
    pub fn new(team: Team, kind: QueryKind, params: QueryParams) -> Self {
        let team = if kind == QueryKind::WinProbability { Team::B } else { team };
        let params = if kind.uses_params() { params } else { QueryParams::default() };
        QueryKey { team, kind, params }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Option<Arc<serde_json::Value>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&self, key: QueryKey, compute: F) -> Result<Option<Arc<serde_json::Value>>>
    where
        F: FnOnce() -> Result<Option<serde_json::Value>>,
    {
        {
            let entries = self
                .entries
                .read()
                .map_err(|e| AnalyticsError::Cache(e.to_string()))?;
            if let Some(cached) = entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit: {} {}", key.team.key(), key.kind.as_str());
                return Ok(cached.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss: {} {}", key.team.key(), key.kind.as_str());
        let value = compute()?.map(Arc::new);

        let mut entries = self
            .entries
            .write()
            .map_err(|e| AnalyticsError::Cache(e.to_string()))?;
        // a concurrent miss may have filled the slot; keep the first value
        Ok(entries.entry(key).or_insert(value).clone())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AnalyticsError::Cache(e.to_string()))?;
        Ok(CacheStats {
            entries: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

/// Shared read-only analytics over one match. Cheap to clone.
#[derive(Clone)]
pub struct AnalyticsEngine {
    model: Arc<MatchModel>,
    settings: Arc<AnalysisSettings>,
    report: Arc<MatchReport>,
    cache: Arc<QueryCache>,
}

impl AnalyticsEngine {
    pub fn new(model: MatchModel, settings: AnalysisSettings) -> Self {
        let report = MatchReport::build(&model, &settings);
        AnalyticsEngine {
            model: Arc::new(model),
            settings: Arc::new(settings),
            report: Arc::new(report),
            cache: Arc::new(QueryCache::new()),
        }
    }

    pub fn model(&self) -> &MatchModel {
        &self.model
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn report(&self) -> &MatchReport {
        &self.report
    }

    pub fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.stats()
    }

    pub fn query(&self, team: Team, kind: QueryKind, params: QueryParams) -> Result<Option<Arc<serde_json::Value>>> {
        let key = QueryKey::new(team, kind, params);
        let (model, settings) = (&self.model, &self.settings);
        let (team, params) = (key.team, key.params.clone());
        self.cache
            .get_or_compute(key, || run_query(model, settings, team, kind, &params))
    }

    /// Names across both squads matching `prefix`, alphabetical.
    pub fn search_players(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for team in Team::ALL {
            let params = QueryParams {
                threshold: None,
                prefix: Some(prefix.to_string()),
            };
            if let Some(value) = self.query(team, QueryKind::PlayerSearch, params)? {
                let found: Vec<String> = serde_json::from_value((*value).clone())?;
                names.extend(found);
            }
        }
        names.sort_by_key(|n| n.to_lowercase());
        names.dedup();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn computes_once_per_key() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let key = || QueryKey::new(Team::A, QueryKind::BattingLeaderboard, QueryParams::default());
        for _ in 0..3 {
            let v = cache
                .get_or_compute(key(), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(serde_json::json!([1, 2])))
                })
                .unwrap();
            assert_eq!(*v.unwrap(), serde_json::json!([1, 2]));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().unwrap();
        assert_eq!((stats.entries, stats.hits, stats.misses), (1, 2, 1));
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = QueryCache::new();
        let key = || QueryKey::new(Team::B, QueryKind::OptimalBowlingAllocation, QueryParams::default());
        let err = cache.get_or_compute(key(), || Err(AnalyticsError::AllocationInfeasible { quota: 20, capacity: 8 }));
        assert!(err.is_err());
        let ok = cache.get_or_compute(key(), || Ok(None)).unwrap();
        assert!(ok.is_none());
        assert_eq!(cache.stats().unwrap().entries, 1);
    }

    #[test]
    fn keys_drop_unused_params() {
        let params = QueryParams {
            threshold: Some(30),
            prefix: None,
        };
        let a = QueryKey::new(Team::A, QueryKind::BatterClusters, params.clone());
        let b = QueryKey::new(Team::A, QueryKind::BatterClusters, QueryParams::default());
        assert_eq!(a, b);
        let c = QueryKey::new(Team::A, QueryKind::BattersAbove, params);
        assert_ne!(c.params, QueryParams::default());
        let w = QueryKey::new(Team::A, QueryKind::WinProbability, QueryParams::default());
        assert_eq!(w.team, Team::B);
    }
}
