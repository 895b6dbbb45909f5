//! Universal Chess Interface (UCI) protocol implementation.
//!
//! Handles communication with chess GUIs following the UCI specification.

use std::fmt;

use crate::board::{Board, FenError, Move, MoveParseError};

pub mod command;
pub mod options;
pub mod print;
pub mod report;

/// Error type for UCI position command parsing
#[derive(Debug, Clone)]
pub enum UciError {
    /// Invalid FEN string
    InvalidFen(FenError),
    /// Invalid move in the move list
    InvalidMove { move_str: String, error: MoveParseError },
    /// Missing required parts in the command
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "Invalid FEN: {e}"),
            UciError::InvalidMove { move_str, error } => {
                write!(f, "Invalid move '{move_str}': {error}")
            }
            UciError::MissingParts => write!(f, "Missing required parts in position command"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

/// Parse a move in UCI format (e.g., "e2e4", "e7e8q").
///
/// Delegates to `Board::parse_move`. Returns `None` if the move is invalid.
#[must_use]
pub fn parse_uci_move(board: &mut Board, uci_string: &str) -> Option<Move> {
    board.parse_move(uci_string).ok()
}

/// Parse a UCI position command, returning an error on failure.
///
/// Supports both "position startpos" and "position fen <fen>" formats,
/// optionally followed by "moves <move1> <move2> ...".
pub fn try_parse_position_command(board: &mut Board, parts: &[&str]) -> Result<(), UciError> {
    let mut i = 1;

    if i >= parts.len() {
        return Err(UciError::MissingParts);
    }

    if parts[i] == "startpos" {
        *board = Board::new();
        i += 1;
    } else if parts[i] == "fen" {
        if i + 6 >= parts.len() {
            return Err(UciError::MissingParts);
        }
        let fen = parts[i + 1..i + 7].join(" ");
        *board = Board::try_from_fen(&fen)?;
        i += 7;
    } else {
        return Err(UciError::MissingParts);
    }

    if i < parts.len() && parts[i] == "moves" {
        i += 1;
        while i < parts.len() {
            let mv = board.parse_move(parts[i]).map_err(|e| UciError::InvalidMove {
                move_str: parts[i].to_string(),
                error: e,
            })?;
            board.make_move(mv);
            i += 1;
        }
    }

    Ok(())
}

/// Parse a UCI position command, printing errors to stderr on failure.
///
/// This is a convenience wrapper around `try_parse_position_command` for
/// use in the main UCI loop where errors should be logged but not propagated.
pub fn parse_position_command(board: &mut Board, parts: &[&str]) {
    if let Err(e) = try_parse_position_command(board, parts) {
        eprintln!("Error: {e}");
    }
}

#[must_use]
pub fn format_uci_move(mv: &Move) -> String {
    mv.to_string()
}

/// Drive the engine over the UCI text protocol on stdin/stdout.
///
/// This is the one piece of the crate spec.md places out of scope as an
/// external "consumer" of the core; it exists only as the thin glue a
/// runnable binary needs and talks to `EngineController` exclusively
/// through the narrow capability surface described in spec.md Section 6
/// (`set_position_from_fen`-equivalent via `set_board`, `apply_uci_move`
/// via `parse_move`, `search`, `stop`, `set_option`, `clear_hash`/
/// `resize_hash`).
pub fn run_uci_loop() {
    use std::io::{self, BufRead, Write};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use command::{parse_go_params, parse_uci_command, GoParams, UciCommand};
    use options::{parse_setoption, UciOptionAction, UciOptions};
    use report::{print_bestmove, print_iteration_info, print_ready};

    use crate::board::{SearchIterationInfo, DEFAULT_TT_MB};
    use crate::engine::time::{build_search_request, TimeConfig, TimeControl};
    use crate::engine::{EngineController, SearchParams as EngineSearchParams};

    let mut controller = EngineController::new(DEFAULT_TT_MB);
    let mut ui_options = UciOptions::new(DEFAULT_TT_MB);

    let run_go = |controller: &mut EngineController, ui_options: &UciOptions, go: &GoParams| {
        let white_to_move = controller.board().white_to_move();
        let time_left_ms = if white_to_move {
            go.wtime.unwrap_or(0)
        } else {
            go.btime.unwrap_or(0)
        };
        let inc_ms = if white_to_move {
            go.winc.unwrap_or(0)
        } else {
            go.binc.unwrap_or(0)
        };

        let time_control = if let Some(mt) = go.movetime {
            TimeControl::move_time_ms(mt)
        } else if go.infinite || go.ponder {
            TimeControl::Infinite
        } else if time_left_ms > 0 {
            TimeControl::incremental(
                Duration::from_millis(time_left_ms),
                Duration::from_millis(inc_ms),
                go.movestogo,
            )
        } else if go.depth.is_some() {
            TimeControl::Depth
        } else {
            TimeControl::Infinite
        };

        let time_config = TimeConfig {
            move_overhead_ms: ui_options.move_overhead_ms,
            soft_time_percent: ui_options.soft_time_percent,
            hard_time_percent: ui_options.hard_time_percent,
            default_max_nodes: ui_options.default_max_nodes,
        };

        let (request, _) = build_search_request(
            time_control,
            go.depth,
            go.nodes,
            go.ponder,
            go.infinite,
            &time_config,
        );

        let tt = controller
            .with_search_state_ref(|state| state.shared_tt())
            .unwrap_or_else(|| Arc::new(crate::tt::TranspositionTable::new(DEFAULT_TT_MB)));
        let callback: crate::board::SearchInfoCallback =
            Arc::new(move |info: &SearchIterationInfo| {
                print_iteration_info(info, tt.hashfull_per_mille());
            });
        controller.set_info_callback(Some(callback));

        let params = EngineSearchParams {
            depth: request.depth,
            soft_time_ms: request.soft_time_ms,
            hard_time_ms: request.hard_time_ms,
            ponder: request.ponder,
            infinite: request.infinite,
            multi_pv: ui_options.multi_pv,
        };

        controller.start_search(params, |result| {
            print_bestmove(result.best_move, result.ponder_move);
            let mut out = io::stdout();
            let _ = out.flush();
        });
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let Some(cmd) = parse_uci_command(&line) else {
            continue;
        };

        match cmd {
            UciCommand::Uci => {
                let params = controller
                    .with_search_state_ref(|s| s.params().clone())
                    .unwrap_or_default();
                ui_options.print(&params);
            }
            UciCommand::IsReady => print_ready(),
            UciCommand::UciNewGame => controller.new_game(),
            UciCommand::Position(parts) => {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                let mut board = controller.board().clone();
                parse_position_command(&mut board, &refs);
                controller.set_board(board);
            }
            UciCommand::Go(parts) => {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                let go_params = parse_go_params(&refs);
                run_go(&mut controller, &ui_options, &go_params);
            }
            UciCommand::Perft(depth) => {
                let mut board = controller.board().clone();
                let start = Instant::now();
                let nodes = board.perft(depth);
                print::print_perft_info(depth, nodes, start.elapsed());
            }
            UciCommand::SetOption(parts) => {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                if let Some((name, value)) = parse_setoption(&refs) {
                    let action = controller
                        .with_search_state(|state| {
                            ui_options.apply_setoption(&name, value.as_deref(), state)
                        })
                        .flatten();
                    match action {
                        Some(UciOptionAction::ReinitHash(mb)) => controller.resize_hash(mb),
                        Some(UciOptionAction::SetThreads(n)) => controller.set_threads(n),
                        Some(UciOptionAction::SetParallelMode(mode)) => {
                            controller.set_parallel_mode(mode);
                        }
                        None => {}
                    }
                }
            }
            UciCommand::Debug(mode) => {
                let on = mode.as_deref() == Some("on");
                controller.with_search_state(|state| state.set_trace(on));
            }
            UciCommand::Stop => controller.signal_stop(),
            UciCommand::PonderHit => controller.ponderhit(),
            UciCommand::Quit => break,
            UciCommand::Unknown(raw) => {
                eprintln!("info string unrecognized command '{raw}'");
            }
        }
        let _ = io::stdout().flush();
    }

    controller.stop_search();
}
