//! Move-ordering heuristic tables: killers, history, counter moves,
//! continuation history, and capture history.
//!
//! Kept as small, independently-testable structs rather than raw arrays on
//! `SearchTables` so each heuristic's update/decay/reset rules live in one
//! place.

use super::super::{Move, Piece, EMPTY_MOVE, MAX_PLY};

const NUM_SQUARES: usize = 64;
const NUM_PIECES: usize = 6;

/// Two killer-move slots per ply, most recent first.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[EMPTY_MOVE; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(EMPTY_MOVE, |s| s[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(EMPTY_MOVE, |s| s[1])
    }

    /// A third, weaker killer slot: the move bumped out of primary two
    /// cutoffs ago. We don't keep a dedicated slot for it; callers compare
    /// against `secondary` at `ply` and fall back to nothing otherwise, so
    /// this just mirrors `secondary` for now and exists as a named seam for
    /// ordering code.
    #[must_use]
    pub fn tertiary(&self, ply: usize) -> Move {
        self.secondary(ply)
    }

    /// Promote `mv` into the primary slot for `ply`, demoting the previous
    /// primary to secondary (unless `mv` is already stored).
    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] == mv {
            return;
        }
        slot[1] = slot[0];
        slot[0] = mv;
    }

    pub fn reset(&mut self) {
        self.slots = [[EMPTY_MOVE; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Quiet-move history heuristic, indexed by `[from][to]`.
pub struct HistoryTable {
    scores: Vec<i32>,
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable {
            scores: vec![0; NUM_SQUARES * NUM_SQUARES],
        }
    }

    #[inline]
    fn idx(mv: &Move) -> usize {
        mv.from().index() * NUM_SQUARES + mv.to().index()
    }

    #[must_use]
    pub fn score(&self, mv: &Move) -> i32 {
        self.scores[Self::idx(mv)]
    }

    /// Reward a move that caused a beta cutoff with a depth-cubed bonus.
    pub fn update(&mut self, mv: &Move, depth: u32, _context: i32) {
        let idx = Self::idx(mv);
        let bonus = (depth * depth * depth) as i32;
        self.scores[idx] = self.scores[idx].saturating_add(bonus);
    }

    /// Penalize a quiet move that was tried but did not cause a cutoff,
    /// so moves that only ever fail low sink in future ordering.
    pub fn penalize(&mut self, mv: &Move, depth: u32) {
        let idx = Self::idx(mv);
        let malus = (depth * depth) as i32;
        self.scores[idx] = self.scores[idx].saturating_sub(malus);
    }

    /// Halve all scores between searches so stale bonuses fade out.
    pub fn decay(&mut self) {
        for entry in &mut self.scores {
            *entry >>= 1;
        }
    }

    pub fn reset(&mut self) {
        self.scores.iter_mut().for_each(|s| *s = 0);
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter-move heuristic: what reply refuted the opponent's last move,
/// indexed by `[from][to]` of that last move.
pub struct CounterMoveTable {
    moves: Vec<Move>,
}

impl CounterMoveTable {
    #[must_use]
    pub fn new() -> Self {
        CounterMoveTable {
            moves: vec![EMPTY_MOVE; NUM_SQUARES * NUM_SQUARES],
        }
    }

    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> Move {
        self.moves
            .get(from * NUM_SQUARES + to)
            .copied()
            .unwrap_or(EMPTY_MOVE)
    }

    pub fn set(&mut self, from: usize, to: usize, mv: Move) {
        if let Some(slot) = self.moves.get_mut(from * NUM_SQUARES + to) {
            *slot = mv;
        }
    }

    pub fn reset(&mut self) {
        self.moves.iter_mut().for_each(|m| *m = EMPTY_MOVE);
    }
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

/// "Did this move work last time it followed this piece landing on this
/// square?" heuristic, indexed by `[prev_piece][prev_to][this_to]`.
/// Heap-allocated (`Vec`, not a stack array) since `6 * 64 * 64` `i32`s would
/// otherwise bloat every `SearchState` on the stack.
pub struct ContinuationHistoryTable {
    scores: Vec<i32>,
}

impl ContinuationHistoryTable {
    #[must_use]
    pub fn new() -> Self {
        ContinuationHistoryTable {
            scores: vec![0; NUM_PIECES * NUM_SQUARES * NUM_SQUARES],
        }
    }

    #[inline]
    fn idx(piece: Piece, prev_to: usize, mv: &Move) -> usize {
        (piece.index() * NUM_SQUARES + prev_to) * NUM_SQUARES + mv.to().index()
    }

    #[must_use]
    pub fn score(&self, piece: Piece, prev_to: usize, mv: &Move) -> i32 {
        self.scores[Self::idx(piece, prev_to, mv)]
    }

    pub fn update(&mut self, piece: Piece, prev_to: usize, mv: &Move, depth: u32) {
        let idx = Self::idx(piece, prev_to, mv);
        let bonus = (depth * depth) as i32;
        self.scores[idx] = self.scores[idx].saturating_add(bonus);
    }

    pub fn decay(&mut self) {
        for entry in &mut self.scores {
            *entry >>= 1;
        }
    }

    pub fn reset(&mut self) {
        self.scores.iter_mut().for_each(|s| *s = 0);
    }
}

impl Default for ContinuationHistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Capture history: was capturing `victim` with `attacker` good last time?
/// Indexed by `[attacker][victim]`, small enough to stay a plain array.
pub struct CaptureHistoryTable {
    scores: [[i32; NUM_PIECES]; NUM_PIECES],
}

impl CaptureHistoryTable {
    #[must_use]
    pub fn new() -> Self {
        CaptureHistoryTable {
            scores: [[0; NUM_PIECES]; NUM_PIECES],
        }
    }

    pub fn update(&mut self, attacker: Piece, victim: Piece, depth: u32) {
        let bonus = (depth * depth) as i32;
        let entry = &mut self.scores[attacker.index()][victim.index()];
        *entry = entry.saturating_add(bonus);
    }

    pub fn reset(&mut self) {
        self.scores = [[0; NUM_PIECES]; NUM_PIECES];
    }
}

impl Default for CaptureHistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
