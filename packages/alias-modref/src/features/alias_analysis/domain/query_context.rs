//! Per-root-query state: the alias cache and its assumption bookkeeping.
//!
//! Alias queries over cyclically defined values (merges at control-flow
//! joins) recurse into sub-queries that can reach the original pair again.
//! The cache breaks such cycles optimistically: an in-flight pair is seeded
//! with a speculative `NoAlias` entry before its computation runs, so the
//! recursive arm sees a definite answer instead of looping. Every use of a
//! speculative entry is counted; if the computation later disproves the
//! assumption, all results derived under it are purged and recomputed on
//! next access.

use crate::features::alias_analysis::domain::alias_result::AliasResult;
use crate::features::alias_analysis::domain::memory_location::MemoryLocation;
use crate::features::capture::ports::CaptureInfo;
use crate::shared::models::{LocationSize, ValueId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Cache key form of a location: base identity plus extent, with the type
/// tag stripped so tag-insensitive results are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReducedLocation {
    pub base: ValueId,
    pub size: LocationSize,
}

impl From<&MemoryLocation> for ReducedLocation {
    fn from(loc: &MemoryLocation) -> Self {
        Self {
            base: loc.base,
            size: loc.size,
        }
    }
}

/// Ordered pair of reduced locations, in normalized orientation.
pub type LocPair = (ReducedLocation, ReducedLocation);

/// Normalize a query pair for cache lookup. Returns the key and whether
/// the operands were swapped relative to the query; a swapped hit must
/// re-orient its offset before being returned.
pub fn normalized_pair(a: &MemoryLocation, b: &MemoryLocation) -> (LocPair, bool) {
    let ra = ReducedLocation::from(a);
    let rb = ReducedLocation::from(b);
    if ra.base > rb.base {
        ((rb, ra), true)
    } else {
        ((ra, rb), false)
    }
}

/// Marker value for definitive (non-speculative) cache entries.
pub(crate) const DEFINITIVE: i32 = -1;

/// One memoized alias answer.
#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    /// Result stored in the key's normalized orientation
    pub result: AliasResult,

    /// Number of times this entry has been used while speculative.
    /// `-1` marks a definitive result.
    pub assumption_uses: i32,
}

impl CacheEntry {
    #[inline]
    pub fn is_definitive(&self) -> bool {
        self.assumption_uses < 0
    }
}

/// Counters describing one query context's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Alias queries answered, cached or computed
    pub alias_queries: u64,

    /// Queries answered from the cache
    pub cache_hits: u64,

    /// Cache hits that consumed a speculative entry
    pub speculative_hits: u64,

    /// Optimistic seeds that were contradicted by their own computation
    pub assumptions_disproven: u64,

    /// Entries removed because they were derived from a disproven seed
    pub entries_purged: u64,
}

/// Mutable state scoped to one root query (or one batch session).
///
/// Owns the memoized answers for the query tree rooted here, the
/// assumption bookkeeping that keeps them sound, and the capture-info
/// provider consulted for escape questions along the way.
pub struct QueryContext {
    pub(crate) cache: FxHashMap<LocPair, CacheEntry>,

    /// Distinguishes independent recursive contexts. Components that
    /// compare resolutions of two different merge points derive a fresh
    /// context at the same depth instead of reusing this cache.
    pub depth: u32,

    /// Live speculative uses across the whole in-flight query tree
    pub(crate) assumption_uses: i32,

    /// Pairs currently holding assumption-based results, in derivation
    /// order; a disproof truncates back to its own window
    pub(crate) assumption_based: Vec<LocPair>,

    /// Capture provider consulted for escape queries in this context
    pub capture: Rc<dyn CaptureInfo>,

    pub stats: QueryStats,
}

impl QueryContext {
    pub fn new(capture: Rc<dyn CaptureInfo>) -> Self {
        Self {
            cache: FxHashMap::default(),
            depth: 0,
            assumption_uses: 0,
            assumption_based: Vec::new(),
            capture,
            stats: QueryStats::default(),
        }
    }

    /// A fresh context sharing this one's capture provider and depth but
    /// none of its memoized answers. Results memoized under one assumption
    /// context are not valid evidence in another.
    pub fn with_empty_cache(&self) -> Self {
        let mut ctx = Self::new(Rc::clone(&self.capture));
        ctx.depth = self.depth;
        ctx
    }

    /// Number of memoized pairs currently held
    #[inline]
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Number of results currently resting on unconfirmed assumptions
    #[inline]
    pub fn pending_assumptions(&self) -> usize {
        self.assumption_based.len()
    }
}
