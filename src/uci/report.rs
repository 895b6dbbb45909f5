use crate::board::{Move, SearchIterationInfo};

use super::format_uci_move;

pub fn print_ready() {
    println!("readyok");
}

/// Print the final `bestmove [ponder <move>]` line.
///
/// A missing best move (no legal moves, or a search stopped before any
/// iteration completed) is reported as the null move `0000` rather than
/// omitting the move entirely, matching the UCI convention GUIs expect.
pub fn print_bestmove(best_move: Option<Move>, ponder_move: Option<Move>) {
    let uci_move = best_move.map_or_else(|| "0000".to_string(), |m| format_uci_move(&m));
    match ponder_move {
        Some(p) => println!("bestmove {} ponder {}", uci_move, format_uci_move(&p)),
        None => println!("bestmove {}", uci_move),
    }
}

/// Print one `info depth ...` line for a completed iteration.
pub fn print_iteration_info(info: &SearchIterationInfo, hashfull: u32) {
    let score = match info.mate_in {
        Some(n) => format!("mate {n}"),
        None => format!("cp {}", info.score),
    };
    let multipv = if info.multipv > 0 { info.multipv } else { 1 };
    println!(
        "info depth {} seldepth {} multipv {} score {} nodes {} nps {} hashfull {} time {} tbhits 0 pv {}",
        info.depth,
        info.seldepth,
        multipv,
        score,
        info.nodes,
        info.nps,
        hashfull,
        info.time_ms,
        info.pv,
    );
}
