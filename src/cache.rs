//! Session-scoped memoization caches.
//!
//! Both caches are pure lookup tables keyed by deterministic inputs, so a
//! hit always returns exactly what a recomputation would. Disabling a cache
//! only turns every lookup into a recomputation. Caches grow monotonically
//! and are bounded by the palette size and the number of distinct sampled
//! cell colors within a session; they are created with the session and
//! dropped with it.

use std::collections::HashMap;
use std::hash::Hash;

use crate::color::{Rgb, TermColor};
use crate::grid::CellStyle;

/// RGB input -> palette output.
pub type StyleCache = Memo<Rgb, TermColor>;

/// Sampled half-cell colors (top, bottom) -> resolved cell style.
pub type PositionCache = Memo<(Rgb, Rgb), CellStyle>;

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when unused).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A toggleable memoization table.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    map: HashMap<K, V>,
    enabled: bool,
    hits: u64,
    misses: u64,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash,
    V: Copy,
{
    pub fn new(enabled: bool) -> Self {
        Self {
            map: HashMap::new(),
            enabled,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// When disabled, always computes and stores nothing.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if !self.enabled {
            self.misses += 1;
            return compute();
        }
        if let Some(v) = self.map.get(&key) {
            self.hits += 1;
            return *v;
        }
        self.misses += 1;
        let v = compute();
        self.map.insert(key, v);
        v
    }

    /// Drop all entries and reset counters.
    pub fn clear(&mut self) {
        self.map.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.map.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_hit_after_miss() {
        let mut memo: Memo<u32, u32> = Memo::new(true);
        let mut calls = 0;
        let a = memo.get_or_insert_with(3, || {
            calls += 1;
            9
        });
        let b = memo.get_or_insert_with(3, || {
            calls += 1;
            0
        });
        assert_eq!((a, b), (9, 9));
        assert_eq!(calls, 1);
        assert_eq!(
            memo.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_memo_disabled_always_computes() {
        let mut memo: Memo<u32, u32> = Memo::new(false);
        let mut calls = 0;
        for _ in 0..3 {
            memo.get_or_insert_with(1, || {
                calls += 1;
                1
            });
        }
        assert_eq!(calls, 3);
        assert_eq!(memo.stats().entries, 0);
        assert_eq!(memo.stats().misses, 3);
    }

    #[test]
    fn test_memo_clear() {
        let mut memo: Memo<u32, u32> = Memo::new(true);
        memo.get_or_insert_with(1, || 1);
        memo.clear();
        assert_eq!(memo.stats(), CacheStats::default());
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entries: 1,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
