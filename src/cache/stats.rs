use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use utoipa::ToSchema;

/// Lock-free counters shared by the tiers and the in-flight map of one cache
#[derive(Debug, Default)]
pub struct CacheCounters {
    pub memory_hits: AtomicU64,
    pub persistent_hits: AtomicU64,
    pub misses: AtomicU64,
    pub joined_in_flight: AtomicU64,
}

impl CacheCounters {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            joined_in_flight: self.joined_in_flight.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CounterSnapshot {
    pub memory_hits: u64,
    pub persistent_hits: u64,
    pub misses: u64,
    pub joined_in_flight: u64,
}

/// Point-in-time statistics for a named cache
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStats {
    pub namespace: String,
    pub entries: usize,
    pub in_flight: usize,
    #[serde(flatten)]
    pub counters: CounterSnapshot,
}

impl CacheStats {
    /// Fraction of lookups answered from either tier
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.counters.memory_hits + self.counters.persistent_hits;
        let total = hits + self.counters.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
