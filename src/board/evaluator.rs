//! Evaluator capability consumed by the search.
//!
//! The search only ever asks "what is this position worth to the side to
//! move, in centipawns" — it never depends on *how* that number is
//! produced. That indirection is what lets a hand-written static
//! evaluator, a neural-network evaluator, or a tablebase-backed wrapper
//! all slot into the same search without it knowing the difference.

use std::fmt;

use super::Board;

/// Evaluates a position from the side-to-move's perspective, in centipawns.
pub trait Evaluator: Send + Sync {
    /// Full evaluation, used at quiescence stand-pat and PV nodes.
    fn evaluate(&self, board: &Board) -> i32;

    /// Cheaper evaluation used for pruning decisions (razoring, futility,
    /// reverse futility). Defaults to [`Evaluator::evaluate`]; an evaluator
    /// whose full evaluation is expensive (e.g. a network forward pass)
    /// should override this with a faster approximation.
    fn evaluate_fast(&self, board: &Board) -> i32 {
        self.evaluate(board)
    }
}

impl fmt::Debug for dyn Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<dyn Evaluator>")
    }
}

/// Default evaluator: tapered incremental material and piece-square tables,
/// plus a bishop-pair and tempo bonus. Tuned for correctness and speed, not
/// playing strength — callers wanting a stronger evaluator provide their
/// own [`Evaluator`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialPstEvaluator;

impl Evaluator for MaterialPstEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        board.evaluate_material_pst()
    }
}
