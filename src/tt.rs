//! Shared transposition table for caching search results.
//!
//! Uses Zobrist hashes to store and retrieve position evaluations, enabling
//! significant search tree pruning. Entries are grouped into fixed-size
//! buckets of four, each guarded by a **seqlock**: readers copy the bucket
//! optimistically and re-check a version counter rather than taking a lock,
//! so concurrent probes from worker threads never block a writer and vice
//! versa. The table also carries the two ABDADA reservation fields (searcher
//! count, search depth) directly in each entry, per the teacher's approach
//! of avoiding a second side table.

use std::cell::UnsafeCell;
use std::mem;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};

use crate::board::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed low - score <= alpha)
    UpperBound, // Score is at most this value (failed high - score >= beta)
}

impl BoundType {
    const fn to_bits(self) -> u8 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => BoundType::LowerBound,
            2 => BoundType::UpperBound,
            _ => BoundType::Exact,
        }
    }
}

/// Generation wraps around in 6 bits, matching the "age" field width used
/// by the replacement policy.
const GENERATION_MASK: u16 = 0x3F;

/// A single bucket slot, copied out of the table by value on probe.
#[derive(Clone, Copy, Debug)]
pub struct TTEntry {
    hash: u64,
    depth: u32,
    score: i32,
    bound_type: BoundType,
    best_move: Option<Move>,
    generation: u16,
    searchers: u8,
    search_depth: u32,
}

impl TTEntry {
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    #[must_use]
    pub fn generation(&self) -> u16 {
        self.generation
    }
}

/// Raw, non-atomic storage for a single slot. Mutated only under the
/// enclosing bucket's seqlock.
#[derive(Clone, Copy)]
struct RawSlot {
    occupied: bool,
    hash: u64,
    depth: u32,
    score: i32,
    bound: u8,
    best_move: u16,
    generation: u16,
    searchers: u8,
    search_depth: u32,
}

impl RawSlot {
    const EMPTY: RawSlot = RawSlot {
        occupied: false,
        hash: 0,
        depth: 0,
        score: 0,
        bound: 0,
        best_move: 0,
        generation: 0,
        searchers: 0,
        search_depth: 0,
    };

    fn to_entry(self) -> Option<TTEntry> {
        if !self.occupied {
            return None;
        }
        let mv = crate::board::Move::from_u16(self.best_move);
        Some(TTEntry {
            hash: self.hash,
            depth: self.depth,
            score: self.score,
            bound_type: BoundType::from_bits(self.bound),
            best_move: if mv == crate::board::Move::null() {
                None
            } else {
                Some(mv)
            },
            generation: self.generation,
            searchers: self.searchers,
            search_depth: self.search_depth,
        })
    }
}

const BUCKET_SLOTS: usize = 4;

/// Four entries guarded by a single version counter. Even version = stable,
/// odd version = write in progress.
struct Bucket {
    version: AtomicU32,
    slots: UnsafeCell<[RawSlot; BUCKET_SLOTS]>,
}

// SAFETY: `slots` is only mutated while `version` is held odd by the single
// writer performing that store; readers never dereference `slots` without
// checking that `version` was even and unchanged across the copy.
unsafe impl Sync for Bucket {}

impl Bucket {
    fn new() -> Self {
        Bucket {
            version: AtomicU32::new(0),
            slots: UnsafeCell::new([RawSlot::EMPTY; BUCKET_SLOTS]),
        }
    }

    /// Optimistic read: copy the four slots and confirm the version didn't
    /// change (and wasn't mid-write) across the copy. One retry, then give
    /// up and report a miss, per the seqlock contract.
    fn read(&self) -> Option<[RawSlot; BUCKET_SLOTS]> {
        for _ in 0..2 {
            let v1 = self.version.load(Ordering::Acquire);
            if v1 & 1 != 0 {
                std::hint::spin_loop();
                continue;
            }
            // SAFETY: odd/even check above brackets this read against the
            // writer's fence-protected store below.
            let snapshot = unsafe { *self.slots.get() };
            let v2 = self.version.load(Ordering::Acquire);
            if v1 == v2 {
                return Some(snapshot);
            }
            std::hint::spin_loop();
        }
        None
    }

    /// Writer-side critical section: bump to odd, write, bump to even.
    fn write(&self, f: impl FnOnce(&mut [RawSlot; BUCKET_SLOTS])) {
        self.version.fetch_add(1, Ordering::AcqRel);
        // SAFETY: version is now odd; no reader will dereference `slots`
        // until it observes an even version again.
        let slots = unsafe { &mut *self.slots.get() };
        f(slots);
        self.version.fetch_add(1, Ordering::AcqRel);
    }
}

/// Probe/store/replacement statistics, for UCI `info string` reporting.
/// Not consulted by the search itself.
#[derive(Default)]
pub struct TTStats {
    pub probes: AtomicU64,
    pub hits: AtomicU64,
    pub stores: AtomicU64,
    pub collisions: AtomicU64,
    pub evictions: AtomicU64,
}

/// Shared, lock-free-on-read transposition table.
///
/// `probe`/`store`/`prefetch` take `&self`, so the table can be wrapped in
/// an `Arc` and shared across Lazy-SMP worker threads without an outer lock.
pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    mask: usize,
    generation: AtomicU16,
    stats: TTStats,
}

impl TranspositionTable {
    /// `size_mb`: desired size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_size = mem::size_of::<Bucket>();
        let mut num_buckets = (size_mb * 1024 * 1024) / bucket_size.max(1);
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }

        let mut buckets = Vec::with_capacity(num_buckets);
        for _ in 0..num_buckets {
            buckets.push(Bucket::new());
        }

        TranspositionTable {
            buckets,
            mask: num_buckets - 1,
            generation: AtomicU16::new(0),
            stats: TTStats::default(),
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Advance the aging generation. Called once per root search.
    pub fn new_generation(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn generation(&self) -> u16 {
        self.generation.load(Ordering::Relaxed) & GENERATION_MASK
    }

    /// Hint the CPU to start pulling this bucket's cache line into L1/L2
    /// ahead of the coming `probe`/`store`.
    #[inline]
    pub fn prefetch(&self, hash: u64) {
        let idx = self.index(hash);
        #[cfg(target_arch = "x86_64")]
        {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
            let ptr = std::ptr::addr_of!(self.buckets[idx]).cast::<i8>();
            // SAFETY: `ptr` is a valid reference into `self.buckets`; prefetch
            // is a hint and never faults even on a stale/unmapped hint.
            unsafe { _mm_prefetch(ptr, _MM_HINT_T0) };
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            let _ = idx;
        }
    }

    /// Probe the table for the entry matching `hash`, or `None` on a miss
    /// (either no matching key, or an unstable concurrent write).
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.stats.probes.fetch_add(1, Ordering::Relaxed);
        let bucket = &self.buckets[self.index(hash)];
        let snapshot = bucket.read()?;
        let found = snapshot
            .into_iter()
            .find(|slot| slot.occupied && slot.hash == hash)
            .and_then(RawSlot::to_entry);
        if found.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store a search result, applying the bucket replacement policy and
    /// skip-rewrite rules.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
        generation: u16,
    ) {
        self.stats.stores.fetch_add(1, Ordering::Relaxed);
        let bucket = &self.buckets[self.index(hash)];
        let generation = generation & GENERATION_MASK;
        let best_move_bits = best_move.unwrap_or(Move::null()).as_u16();

        bucket.write(|slots| {
            // 1. Overwrite a slot already holding this key (subject to the
            // protect-deeper-Exact rule and the skip-rewrite rules).
            if let Some(slot) = slots.iter_mut().find(|s| s.occupied && s.hash == hash) {
                if Self::should_skip_rewrite(slot, depth, score, bound_type, best_move_bits) {
                    return;
                }
                *slot = RawSlot {
                    occupied: true,
                    hash,
                    depth,
                    score,
                    bound: bound_type.to_bits(),
                    best_move: best_move_bits,
                    generation,
                    searchers: slot.searchers,
                    search_depth: slot.search_depth,
                };
                return;
            }

            // 2. Fill an empty slot.
            if let Some(slot) = slots.iter_mut().find(|s| !s.occupied) {
                *slot = RawSlot {
                    occupied: true,
                    hash,
                    depth,
                    score,
                    bound: bound_type.to_bits(),
                    best_move: best_move_bits,
                    generation,
                    searchers: 0,
                    search_depth: 0,
                };
                return;
            }

            // 3. Replace the slot with the worst replacement score.
            self.stats.collisions.fetch_add(1, Ordering::Relaxed);
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            let victim_idx = (0..BUCKET_SLOTS)
                .min_by_key(|&i| Self::replacement_score(&slots[i], generation))
                .expect("bucket has slots");
            let victim = &mut slots[victim_idx];
            *victim = RawSlot {
                occupied: true,
                hash,
                depth,
                score,
                bound: bound_type.to_bits(),
                best_move: best_move_bits,
                generation,
                searchers: 0,
                search_depth: 0,
            };
        });
    }

    /// `depth*256 + (MaxAge - age_diff)`, with a bonus protecting Exact
    /// entries and a penalty evicting depth-0 (qsearch) entries first.
    fn replacement_score(slot: &RawSlot, current_generation: u16) -> i32 {
        const MAX_AGE: i32 = 64;
        let age_diff = current_generation.wrapping_sub(slot.generation) & GENERATION_MASK;
        let mut score = i32::from(slot.depth) * 256 + (MAX_AGE - i32::from(age_diff));
        if BoundType::from_bits(slot.bound) == BoundType::Exact {
            score += 1024;
        }
        if slot.depth == 0 {
            score -= 2048;
        }
        score
    }

    fn should_skip_rewrite(
        existing: &RawSlot,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move_bits: u16,
    ) -> bool {
        let existing_bound = BoundType::from_bits(existing.bound);
        if existing.best_move == best_move_bits
            && existing.score == score
            && existing_bound == bound_type
            && existing.depth >= depth
        {
            return true;
        }
        if existing_bound == BoundType::Exact && existing.depth >= depth && bound_type != BoundType::Exact {
            return true;
        }
        if depth == 0 && existing.depth > 0 {
            return true;
        }
        false
    }

    /// ABDADA: reserve this position for search at `depth` by this worker.
    /// Returns `true` if another worker already holds a reservation at
    /// `>= depth` (the caller should defer this move to another worker).
    #[must_use]
    pub fn try_start_search(&self, hash: u64, depth: u32) -> bool {
        let bucket = &self.buckets[self.index(hash)];
        let mut already_searched = false;
        bucket.write(|slots| {
            if let Some(slot) = slots.iter_mut().find(|s| s.occupied && s.hash == hash) {
                if slot.searchers > 0 && slot.search_depth >= depth {
                    already_searched = true;
                } else {
                    slot.searchers = slot.searchers.saturating_add(1);
                    slot.search_depth = slot.search_depth.max(depth);
                }
            }
        });
        already_searched
    }

    /// Release a reservation previously taken by `try_start_search`.
    pub fn end_search(&self, hash: u64) {
        let bucket = &self.buckets[self.index(hash)];
        bucket.write(|slots| {
            if let Some(slot) = slots.iter_mut().find(|s| s.occupied && s.hash == hash) {
                slot.searchers = slot.searchers.saturating_sub(1);
                if slot.searchers == 0 {
                    slot.search_depth = 0;
                }
            }
        });
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        // Sample the first 1000 buckets, Stockfish-style, to avoid an O(n) scan.
        let sample_size = self.buckets.len().min(1000);
        if sample_size == 0 {
            return 0;
        }
        let occupied: usize = self.buckets[..sample_size]
            .iter()
            .filter_map(Bucket::read)
            .map(|snapshot| snapshot.iter().filter(|s| s.occupied).count())
            .sum();
        ((occupied as u64 * 1000) / (sample_size as u64 * BUCKET_SLOTS as u64)) as u32
    }

    #[must_use]
    pub fn stats(&self) -> &TTStats {
        &self.stats
    }

    /// Clear all entries (new game).
    pub fn clear(&self) {
        for bucket in &self.buckets {
            bucket.write(|slots| {
                *slots = [RawSlot::EMPTY; BUCKET_SLOTS];
            });
        }
    }
}

// SAFETY: every field is either `Sync` on its own (the `Bucket`s, via the
// impl above) or only ever accessed through atomics.
unsafe impl Sync for TranspositionTable {}
unsafe impl Send for TranspositionTable {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    #[test]
    fn store_and_probe_roundtrip() {
        let tt = TranspositionTable::new(1);
        let mv = Move::quiet(Square::new(1, 4), Square::new(3, 4));
        tt.store(12345, 6, 55, BoundType::Exact, Some(mv), 1);

        let entry = tt.probe(12345).expect("entry should be present");
        assert_eq!(entry.depth(), 6);
        assert_eq!(entry.score(), 55);
        assert_eq!(entry.bound_type(), BoundType::Exact);
        assert_eq!(entry.best_move(), Some(mv));
    }

    #[test]
    fn probe_miss_returns_none() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(999).is_none());
    }

    #[test]
    fn skip_rewrite_shallower_duplicate() {
        let tt = TranspositionTable::new(1);
        let mv = Move::quiet(Square::new(0, 0), Square::new(0, 1));
        tt.store(42, 10, 100, BoundType::Exact, Some(mv), 1);
        tt.store(42, 4, 100, BoundType::Exact, Some(mv), 1);

        let entry = tt.probe(42).unwrap();
        assert_eq!(entry.depth(), 10, "deeper entry must survive a shallow duplicate store");
    }

    #[test]
    fn abdada_reservation_defers_second_worker() {
        let tt = TranspositionTable::new(1);
        tt.store(7, 8, 0, BoundType::Exact, None, 1);

        assert!(!tt.try_start_search(7, 8), "first reservation should succeed");
        assert!(tt.try_start_search(7, 8), "second worker at same depth should defer");
        tt.end_search(7);
        tt.end_search(7);
    }

    #[test]
    fn hashfull_reports_zero_when_empty() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
    }
}
