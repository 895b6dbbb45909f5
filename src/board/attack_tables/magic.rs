//! Magic-bitboard and PEXT indexing for sliding-piece attacks.
//!
//! Both tables are built from the Hyperbola Quintessence oracle in the
//! parent module, so magic multiply-shift, PEXT, and ray-walk all agree
//! bit-for-bit by construction (see the `parity` tests below).

use std::sync::{LazyLock, OnceLock};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{oracle_bishop_attacks, oracle_rook_attacks};

/// Sliding-piece attack indexing mode, configurable via `set_pext_mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PextMode {
    /// Benchmark PEXT against multiply-shift once at startup and memoize the winner.
    Auto,
    /// Use PEXT when the hardware supports it, otherwise fall back to multiply-shift.
    Force,
    /// Always use magic multiply-shift.
    Disable,
}

impl Default for PextMode {
    fn default() -> Self {
        PextMode::Disable
    }
}

struct SquareMagic {
    mask: u64,
    magic: u64,
    shift: u32,
    table: Vec<u64>,
}

struct SquarePext {
    mask: u64,
    table: Vec<u64>,
}

fn rook_relevant_mask(sq: usize) -> u64 {
    let r = (sq / 8) as i32;
    let f = (sq % 8) as i32;
    let mut mask = 0u64;
    for tr in (r + 1)..=6 {
        mask |= 1u64 << (tr * 8 + f);
    }
    for tr in (1..r).rev() {
        mask |= 1u64 << (tr * 8 + f);
    }
    for tf in (f + 1)..=6 {
        mask |= 1u64 << (r * 8 + tf);
    }
    for tf in (1..f).rev() {
        mask |= 1u64 << (r * 8 + tf);
    }
    mask
}

fn bishop_relevant_mask(sq: usize) -> u64 {
    let r = (sq / 8) as i32;
    let f = (sq % 8) as i32;
    let mut mask = 0u64;
    for (dr, df) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let mut tr = r + dr;
        let mut tf = f + df;
        while (1..=6).contains(&tr) && (1..=6).contains(&tf) {
            mask |= 1u64 << (tr * 8 + tf);
            tr += dr;
            tf += df;
        }
    }
    mask
}

/// Maps a dense subset index (0..2^popcount(mask)) onto an occupancy
/// restricted to the bits of `mask` (the inverse of PEXT-style extraction).
fn subset_of(mask: u64, index: usize) -> u64 {
    let mut result = 0u64;
    let mut m = mask;
    let mut idx = index;
    while m != 0 {
        let lsb = m & m.wrapping_neg();
        if idx & 1 != 0 {
            result |= lsb;
        }
        idx >>= 1;
        m &= m - 1;
    }
    result
}

fn pext_software(occ: u64, mask: u64) -> usize {
    let mut result = 0usize;
    let mut bit = 0u32;
    let mut m = mask;
    while m != 0 {
        let lsb = m & m.wrapping_neg();
        if occ & lsb != 0 {
            result |= 1usize << bit;
        }
        bit += 1;
        m &= m - 1;
    }
    result
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "bmi2")]
unsafe fn pext_hw(occ: u64, mask: u64) -> u64 {
    std::arch::x86_64::_pext_u64(occ, mask)
}

fn hardware_pext_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        std::is_x86_feature_detected!("bmi2")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

#[inline]
fn pext_index(occ: u64, mask: u64) -> usize {
    #[cfg(target_arch = "x86_64")]
    {
        if hardware_pext_available() {
            return unsafe { pext_hw(occ, mask) } as usize;
        }
    }
    pext_software(occ, mask)
}

/// Search for a collision-free magic multiplier for `sq`, verifying every
/// subset of `mask` against the ray-walk oracle before accepting a candidate.
fn find_magic(sq: usize, mask: u64, rook: bool) -> (u64, u32, Vec<u64>) {
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let size = 1usize << bits;

    let mut reference = vec![0u64; size];
    for (i, slot) in reference.iter_mut().enumerate() {
        let occ = subset_of(mask, i);
        *slot = if rook {
            oracle_rook_attacks(sq, occ)
        } else {
            oracle_bishop_attacks(sq, occ)
        };
    }

    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15 ^ (sq as u64) ^ u64::from(rook));
    loop {
        let magic: u64 = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        let mut table: Vec<Option<u64>> = vec![None; size];
        let mut ok = true;
        for (i, r) in reference.iter().enumerate() {
            let occ = subset_of(mask, i);
            let idx = (occ.wrapping_mul(magic) >> shift) as usize;
            match table[idx] {
                None => table[idx] = Some(*r),
                Some(existing) if existing == *r => {}
                Some(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            return (
                magic,
                shift,
                table.into_iter().map(|v| v.unwrap_or(0)).collect(),
            );
        }
    }
}

fn build_pext_table(sq: usize, mask: u64, rook: bool) -> Vec<u64> {
    let bits = mask.count_ones();
    let size = 1usize << bits;
    let mut table = vec![0u64; size];
    for i in 0..size {
        let occ = subset_of(mask, i);
        let idx = pext_index(occ, mask);
        table[idx] = if rook {
            oracle_rook_attacks(sq, occ)
        } else {
            oracle_bishop_attacks(sq, occ)
        };
    }
    table
}

static ROOK_MAGICS: LazyLock<Vec<SquareMagic>> = LazyLock::new(|| {
    (0..64)
        .map(|sq| {
            let mask = rook_relevant_mask(sq);
            let (magic, shift, table) = find_magic(sq, mask, true);
            SquareMagic {
                mask,
                magic,
                shift,
                table,
            }
        })
        .collect()
});

static BISHOP_MAGICS: LazyLock<Vec<SquareMagic>> = LazyLock::new(|| {
    (0..64)
        .map(|sq| {
            let mask = bishop_relevant_mask(sq);
            let (magic, shift, table) = find_magic(sq, mask, false);
            SquareMagic {
                mask,
                magic,
                shift,
                table,
            }
        })
        .collect()
});

static ROOK_PEXT: LazyLock<Vec<SquarePext>> = LazyLock::new(|| {
    (0..64)
        .map(|sq| {
            let mask = rook_relevant_mask(sq);
            let table = build_pext_table(sq, mask, true);
            SquarePext { mask, table }
        })
        .collect()
});

static BISHOP_PEXT: LazyLock<Vec<SquarePext>> = LazyLock::new(|| {
    (0..64)
        .map(|sq| {
            let mask = bishop_relevant_mask(sq);
            let table = build_pext_table(sq, mask, false);
            SquarePext { mask, table }
        })
        .collect()
});

pub(crate) fn rook_attacks_magic(sq: usize, occ: u64) -> u64 {
    let sm = &ROOK_MAGICS[sq];
    let idx = ((occ & sm.mask).wrapping_mul(sm.magic) >> sm.shift) as usize;
    sm.table[idx]
}

pub(crate) fn bishop_attacks_magic(sq: usize, occ: u64) -> u64 {
    let sm = &BISHOP_MAGICS[sq];
    let idx = ((occ & sm.mask).wrapping_mul(sm.magic) >> sm.shift) as usize;
    sm.table[idx]
}

pub(crate) fn rook_attacks_pext(sq: usize, occ: u64) -> u64 {
    let sp = &ROOK_PEXT[sq];
    sp.table[pext_index(occ & sp.mask, sp.mask)]
}

pub(crate) fn bishop_attacks_pext(sq: usize, occ: u64) -> u64 {
    let sp = &BISHOP_PEXT[sq];
    sp.table[pext_index(occ & sp.mask, sp.mask)]
}

/// Benchmark magic-multiply against PEXT across a fixed set of squares and
/// occupancy patterns and return whether PEXT was faster. Run once; the
/// result is memoized by `use_pext`'s `OnceLock`.
fn benchmark_prefers_pext() -> bool {
    const WARMUP: usize = 10_000;
    const TIMED: usize = 100_000;
    let squares = [3usize, 27, 36, 60];
    let occupancies = [
        0u64,
        0x00FF_0000_FF00_0000,
        0xFFFF_0000_0000_FFFF,
        0x0000_FFFF_FFFF_0000,
    ];

    let mut acc = 0u64;
    for _ in 0..WARMUP {
        for &sq in &squares {
            for &occ in &occupancies {
                acc ^= rook_attacks_magic(sq, occ) ^ rook_attacks_pext(sq, occ);
            }
        }
    }
    std::hint::black_box(acc);

    let start = Instant::now();
    let mut acc = 0u64;
    for _ in 0..TIMED {
        for &sq in &squares {
            for &occ in &occupancies {
                acc ^= rook_attacks_magic(sq, occ);
            }
        }
    }
    std::hint::black_box(acc);
    let magic_time = start.elapsed();

    let start = Instant::now();
    let mut acc = 0u64;
    for _ in 0..TIMED {
        for &sq in &squares {
            for &occ in &occupancies {
                acc ^= rook_attacks_pext(sq, occ);
            }
        }
    }
    std::hint::black_box(acc);
    let pext_time = start.elapsed();

    pext_time < magic_time
}

static AUTO_DECISION: OnceLock<bool> = OnceLock::new();
static CONFIGURED_MODE: OnceLock<PextMode> = OnceLock::new();

/// Set the process-wide indexing mode. Only the first call takes effect;
/// later calls are ignored, matching the one-shot initialization the
/// auto-benchmark itself relies on.
pub(crate) fn set_pext_mode(mode: PextMode) {
    let _ = CONFIGURED_MODE.set(mode);
}

fn current_mode() -> PextMode {
    *CONFIGURED_MODE.get_or_init(PextMode::default)
}

/// Whether sliding-attack lookups should use PEXT indexing right now.
fn use_pext() -> bool {
    match current_mode() {
        PextMode::Disable => false,
        PextMode::Force => hardware_pext_available(),
        PextMode::Auto => {
            hardware_pext_available() && *AUTO_DECISION.get_or_init(benchmark_prefers_pext)
        }
    }
}

pub(crate) fn rook_attacks_indexed(sq: usize, occ: u64) -> u64 {
    if use_pext() {
        rook_attacks_pext(sq, occ)
    } else {
        rook_attacks_magic(sq, occ)
    }
}

pub(crate) fn bishop_attacks_indexed(sq: usize, occ: u64) -> u64 {
    if use_pext() {
        bishop_attacks_pext(sq, occ)
    } else {
        bishop_attacks_magic(sq, occ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_matches_oracle_for_all_squares() {
        let occupancies = [
            0u64,
            0xFFFF_FFFF_FFFF_FFFF,
            0x00FF_0000_FF00_0000,
            0x8142_2418_1818_2442,
        ];
        for sq in 0..64 {
            for &occ in &occupancies {
                assert_eq!(rook_attacks_magic(sq, occ), oracle_rook_attacks(sq, occ));
                assert_eq!(
                    bishop_attacks_magic(sq, occ),
                    oracle_bishop_attacks(sq, occ)
                );
            }
        }
    }

    #[test]
    fn pext_matches_oracle_for_all_squares() {
        let occupancies = [
            0u64,
            0xFFFF_FFFF_FFFF_FFFF,
            0x00FF_0000_FF00_0000,
            0x8142_2418_1818_2442,
        ];
        for sq in 0..64 {
            for &occ in &occupancies {
                assert_eq!(rook_attacks_pext(sq, occ), oracle_rook_attacks(sq, occ));
                assert_eq!(bishop_attacks_pext(sq, occ), oracle_bishop_attacks(sq, occ));
            }
        }
    }

    #[test]
    fn three_paths_agree() {
        for sq in [0usize, 9, 28, 35, 54, 63] {
            for occ in [0u64, 0x0010_0000_0000_1000, 0xFF00_0000_0000_00FF] {
                let oracle = oracle_rook_attacks(sq, occ);
                let magic = rook_attacks_magic(sq, occ);
                let pext = rook_attacks_pext(sq, occ);
                assert_eq!(oracle, magic);
                assert_eq!(oracle, pext);
            }
        }
    }
}
