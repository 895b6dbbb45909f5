//! Lazy SMP (Symmetric `MultiProcessing`) parallel search.
//!
//! Implements parallel search where multiple threads search the same position
//! independently with different depth offsets. All threads share a common
//! transposition table, which provides natural coordination.
//!
//! Key insights from chess programming community:
//! - Separate killer/history tables per thread reduce correlated pruning failures
//! - Helper threads searching at depth+1 populate TT for main thread
//! - Time-to-depth speedup is modest, but playing strength gains are significant

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::Mutex;

use crate::board::{Board, Evaluator, Move, EMPTY_MOVE, MAX_PLY};
use crate::tt::TranspositionTable;

use super::simple::{simple_search, SimpleSearchContext};
use super::{SearchConfig, SearchInfoCallback, SearchIterationInfo, SearchParams, SearchResult, SearchState, MATE_SCORE};

/// Shared state across all worker threads
pub struct SharedSearchState {
    /// Thread-safe transposition table
    pub tt: Arc<TranspositionTable>,
    /// Shared position evaluator
    pub evaluator: Arc<dyn Evaluator>,
    /// Stop flag checked by all workers
    pub stop: Arc<AtomicBool>,
    /// Global node counter (sum of all workers)
    pub total_nodes: Arc<AtomicU64>,
    /// Maximum selective depth seen
    pub max_seldepth: Arc<AtomicU64>,
    /// TT generation for aging
    pub generation: u16,
    /// Search parameters
    pub params: SearchParams,
}

impl SharedSearchState {
    /// Create with a specific TT and evaluator
    pub fn new(
        tt: Arc<TranspositionTable>,
        evaluator: Arc<dyn Evaluator>,
        stop: Arc<AtomicBool>,
        generation: u16,
    ) -> Self {
        SharedSearchState {
            tt,
            evaluator,
            stop,
            total_nodes: Arc::new(AtomicU64::new(0)),
            max_seldepth: Arc::new(AtomicU64::new(0)),
            generation,
            params: SearchParams::default(),
        }
    }

    /// Update seldepth if this value is higher
    pub fn update_seldepth(&self, seldepth: u32) {
        let mut current = self.max_seldepth.load(Ordering::Relaxed);
        while seldepth as u64 > current {
            match self.max_seldepth.compare_exchange_weak(
                current,
                seldepth as u64,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(c) => current = c,
            }
        }
    }

    /// Add nodes to global counter
    pub fn add_nodes(&self, nodes: u64) {
        self.total_nodes.fetch_add(nodes, Ordering::Relaxed);
    }
}

/// Result from a single worker thread
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
}

/// Configuration for SMP search
#[derive(Clone)]
pub struct SmpConfig {
    /// Number of worker threads
    pub num_threads: usize,
    /// Maximum depth to search
    pub max_depth: u32,
    /// Time limit in milliseconds (0 = unlimited)
    pub time_limit_ms: u64,
    /// Node limit (0 = unlimited)
    pub node_limit: u64,
    /// Optional callback for iteration info
    pub info_callback: Option<SearchInfoCallback>,
    /// Minimum depth at which work-stealing splits the root (1-32 typical)
    pub split_min_depth: u32,
    /// Minimum number of root moves required to split the root
    pub split_min_moves: u32,
}

impl Default for SmpConfig {
    fn default() -> Self {
        SmpConfig {
            num_threads: 1,
            max_depth: 64,
            time_limit_ms: 0,
            node_limit: 0,
            info_callback: None,
            split_min_depth: 5,
            split_min_moves: 4,
        }
    }
}

impl SmpConfig {
    /// Create config with specified thread count
    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        SmpConfig {
            num_threads: num_threads.max(1),
            ..Default::default()
        }
    }

    /// Set max depth
    #[must_use]
    pub fn depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set time limit
    #[must_use]
    pub fn time(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    /// Set node limit
    #[must_use]
    pub fn nodes(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Set info callback
    #[must_use]
    pub fn with_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.info_callback = Some(callback);
        self
    }

    /// Set the minimum depth at which work-stealing actually splits the
    /// root across threads; shallower iterations run single-threaded since
    /// thread spawn/queue overhead dwarfs the work available.
    #[must_use]
    pub fn with_split_min_depth(mut self, split_min_depth: u32) -> Self {
        self.split_min_depth = split_min_depth.max(1);
        self
    }

    /// Set the minimum number of legal root moves required before
    /// work-stealing splits the root across threads.
    #[must_use]
    pub fn with_split_min_moves(mut self, split_min_moves: u32) -> Self {
        self.split_min_moves = split_min_moves.max(1);
        self
    }
}

/// Get depth offset for a worker thread.
///
/// Thread 0 (main): searches at target depth
/// Thread 1: searches at depth + 1 (populates TT with deeper entries)
/// Thread 2: searches at depth (different move order due to separate tables)
/// Thread 3: searches at depth + 1
/// etc.
fn worker_depth_offset(worker_id: usize) -> i32 {
    // Odd workers search deeper, even workers search at target depth
    #[allow(clippy::match_same_arms)]
    match worker_id % 4 {
        0 => 0, // Main worker: target depth
        1 => 1, // Search deeper
        2 => 0, // Same depth, different ordering
        3 => 1, // Search deeper
        _ => 0,
    }
}

/// Search thread stack size (32 MB to handle deep recursion)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Run parallel search using Lazy SMP.
///
/// This spawns multiple worker threads that search the same position
/// independently. Workers share a transposition table but have separate
/// move ordering tables (killers, history, counter moves).
#[allow(clippy::needless_pass_by_value)] // Arc is cloned for thread sharing
pub fn smp_search(
    board: &Board,
    state: &mut SearchState,
    config: SmpConfig,
    stop: Arc<AtomicBool>,
) -> SearchResult {
    let num_threads = config.num_threads.max(1);

    // For single-threaded, use the existing path
    if num_threads == 1 {
        let mut board_clone = board.clone();
        let search_config = SearchConfig {
            max_depth: Some(config.max_depth),
            time_limit_ms: config.time_limit_ms,
            node_limit: config.node_limit,
            extract_ponder: true,
            info_callback: config.info_callback,
            multi_pv: 1, // SMP currently only supports single PV
        };
        return super::search(&mut board_clone, state, search_config, &stop);
    }

    // Increment generation for new search
    state.generation = state.generation.wrapping_add(1);
    state.stats.reset_search();

    // Create shared state with the TT and evaluator from SearchState
    let shared = Arc::new(SharedSearchState::new(
        state.shared_tt(),
        state.shared_evaluator(),
        Arc::clone(&stop),
        state.generation,
    ));

    let start_time = Instant::now();
    let info_callback = config.info_callback.clone();
    let max_depth = config.max_depth;
    let time_limit_ms = config.time_limit_ms;
    let node_limit = config.node_limit;

    // Spawn worker threads
    let mut handles: Vec<JoinHandle<WorkerResult>> = Vec::with_capacity(num_threads);

    for worker_id in 0..num_threads {
        let board_clone = board.clone();
        let shared_clone = Arc::clone(&shared);
        let info_cb = if worker_id == 0 {
            info_callback.clone()
        } else {
            None // Only main worker reports info
        };

        let handle = thread::Builder::new()
            .name(format!("search-{worker_id}"))
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                run_worker(
                    worker_id,
                    board_clone,
                    shared_clone,
                    max_depth,
                    time_limit_ms,
                    node_limit,
                    info_cb,
                    start_time,
                )
            })
            .expect("failed to spawn search worker");

        handles.push(handle);
    }

    // Wait for all workers to complete
    let mut results: Vec<WorkerResult> = Vec::with_capacity(num_threads);
    for handle in handles {
        if let Ok(result) = handle.join() {
            results.push(result);
        }
    }

    // Update stats from shared counters
    state.stats.nodes = shared.total_nodes.load(Ordering::Relaxed);
    state.stats.seldepth = shared.max_seldepth.load(Ordering::Relaxed) as u32;

    // Select best result: prefer main worker (worker 0) as its search is most complete.
    // Only use helper results if main worker has no result.
    let main_result = results
        .iter()
        .find(|r| r.worker_id == 0 && r.best_move.is_some());
    let best_result = main_result.or_else(|| {
        results
            .iter()
            .filter(|r| r.best_move.is_some())
            .max_by_key(|r| r.depth)
    });

    let best_move = best_result.and_then(|r| r.best_move);

    // Extract ponder move from TT
    let ponder_move = best_move.and_then(|mv| {
        let mut temp_board = board.clone();
        let info = temp_board.make_move(mv);
        let ponder = shared.tt.probe(temp_board.hash).and_then(|entry| {
            entry.best_move().filter(|pmv| {
                let moves = temp_board.generate_moves();
                moves.iter().any(|m| m == pmv)
            })
        });
        temp_board.unmake_move(mv, info);
        ponder
    });

    SearchResult {
        best_move,
        ponder_move,
    }
}

/// Run a single worker thread
#[allow(clippy::too_many_arguments, clippy::needless_pass_by_value)]
fn run_worker(
    worker_id: usize,
    mut board: Board,
    shared: Arc<SharedSearchState>,
    max_depth: u32,
    time_limit_ms: u64,
    node_limit: u64,
    info_callback: Option<SearchInfoCallback>,
    _start_time: Instant,
) -> WorkerResult {
    // Create local SearchState for this worker with the shared TT and evaluator
    let mut local_state = SearchState::with_shared_tables(
        Arc::clone(&shared.tt),
        Arc::clone(&shared.evaluator),
        shared.generation,
    );
    local_state.params = shared.params.clone();

    // Reset local tables for this worker
    local_state.tables.history.decay();
    local_state.tables.killer_moves.reset();
    local_state.tables.counter_moves.reset();

    // Calculate this worker's depth offset
    // Helper threads search slightly deeper to populate TT for main thread
    let depth_offset = worker_depth_offset(worker_id);
    let search_depth = ((max_depth as i32) + depth_offset).max(1) as u32;

    // Run search with iterative deepening (handled internally by simple_search)
    // Each worker does full iterative deepening from depth 1 to search_depth
    let move_result = simple_search(
        &mut board,
        &mut local_state,
        search_depth,
        time_limit_ms,
        node_limit,
        &shared.stop,
        info_callback, // Main worker (id 0) reports info via callback
    );

    // Update shared stats
    shared.add_nodes(local_state.stats.nodes);
    shared.update_seldepth(local_state.stats.seldepth);

    // Get best move and score
    let best_move = move_result;
    let best_score = if let Some(entry) = shared.tt.probe(board.hash) {
        entry.score()
    } else {
        -30000i32
    };

    WorkerResult {
        worker_id,
        best_move,
        score: best_score,
        depth: search_depth,
        nodes: local_state.stats.total_nodes,
    }
}

// ============================================================================
// WORK-STEALING PARALLEL SEARCH
// ============================================================================

/// Run parallel search using root-level work stealing.
///
/// Unlike Lazy SMP (where every thread independently replays the whole
/// iterative-deepening search), work stealing drives a single
/// iterative-deepening loop on the calling thread and, for each depth,
/// splits that depth's root moves across a shared queue: idle threads pull
/// the next unsearched root move instead of redundantly searching moves
/// another thread already has in flight. A shared alpha bound lets moves
/// searched later in the iteration benefit from cutoffs found by moves
/// searched earlier.
///
/// Splitting happens only at the root — once a thread starts on a root
/// move it searches that move's subtree single-threaded, same as a Lazy
/// SMP worker would. Iterations shallower than `config.split_min_depth`, or
/// positions with fewer than `config.split_min_moves` legal root moves, run
/// single-threaded: thread spawn and queue-contention overhead would
/// dwarf the work available.
#[allow(clippy::too_many_lines)]
pub fn work_stealing_search(
    board: &Board,
    state: &mut SearchState,
    config: SmpConfig,
    stop: Arc<AtomicBool>,
) -> SearchResult {
    let num_threads = config.num_threads.max(1);
    if num_threads == 1 {
        let mut board_clone = board.clone();
        let search_config = SearchConfig {
            max_depth: Some(config.max_depth),
            time_limit_ms: config.time_limit_ms,
            node_limit: config.node_limit,
            extract_ponder: true,
            info_callback: config.info_callback,
            multi_pv: 1,
        };
        return super::search(&mut board_clone, state, search_config, &stop);
    }

    state.generation = state.generation.wrapping_add(1);
    state.stats.reset_search();

    let tt = state.shared_tt();
    let evaluator = state.shared_evaluator();
    let params = state.params.clone();

    let mut root_board = board.clone();
    let root_moves: Vec<Move> = root_board.generate_moves().iter().copied().collect();
    if root_moves.is_empty() {
        return SearchResult {
            best_move: None,
            ponder_move: None,
        };
    }

    let start_time = Instant::now();
    let total_nodes = Arc::new(AtomicU64::new(0));

    // Move ordering across iterations: search the previous iteration's best
    // move (and its runners-up) first so the shared alpha bound tightens
    // quickly once threads start pulling from the queue.
    let mut move_order: Vec<Move> = root_moves.clone();
    let mut best_move_overall: Option<Move> = None;
    let mut best_score_overall = -MATE_SCORE;

    let max_depth = config.max_depth.max(1);
    'iterative_deepening: for depth in 1..=max_depth {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        if config.node_limit > 0 && total_nodes.load(Ordering::Relaxed) >= config.node_limit {
            break;
        }
        if config.time_limit_ms > 0
            && start_time.elapsed().as_millis() as u64 >= config.time_limit_ms
        {
            break;
        }

        let split_this_depth =
            depth >= config.split_min_depth && move_order.len() as u32 >= config.split_min_moves;
        let threads_this_depth = if split_this_depth { num_threads } else { 1 };

        let queue = Arc::new(Mutex::new(VecDeque::from(move_order.clone())));
        let shared_alpha = Arc::new(AtomicI32::new(-MATE_SCORE));
        let results: Arc<Mutex<Vec<(Move, i32, bool)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(move_order.len())));

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(threads_this_depth);
        for _ in 0..threads_this_depth {
            let root_board_clone = root_board.clone();
            let queue = Arc::clone(&queue);
            let shared_alpha = Arc::clone(&shared_alpha);
            let results = Arc::clone(&results);
            let stop = Arc::clone(&stop);
            let tt = Arc::clone(&tt);
            let evaluator = Arc::clone(&evaluator);
            let params = params.clone();
            let total_nodes = Arc::clone(&total_nodes);
            let time_limit_ms = config.time_limit_ms;
            let node_limit = config.node_limit;

            let handle = thread::Builder::new()
                .name("search-ws".to_string())
                .stack_size(SEARCH_STACK_SIZE)
                .spawn(move || {
                    let mut local_state =
                        SearchState::with_shared_tables(tt, evaluator, 0);
                    local_state.params = params;

                    loop {
                        let mv = {
                            let mut q = queue.lock();
                            q.pop_front()
                        };
                        let Some(mv) = mv else { break };
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }

                        let alpha = shared_alpha.load(Ordering::Relaxed);
                        let (score, nodes, completed) = search_root_move(
                            &root_board_clone,
                            mv,
                            depth,
                            alpha,
                            MATE_SCORE,
                            &mut local_state,
                            &stop,
                            start_time,
                            time_limit_ms,
                            node_limit,
                        );
                        total_nodes.fetch_add(nodes, Ordering::Relaxed);

                        if completed {
                            let mut current = shared_alpha.load(Ordering::Relaxed);
                            while score > current {
                                match shared_alpha.compare_exchange_weak(
                                    current,
                                    score,
                                    Ordering::Relaxed,
                                    Ordering::Relaxed,
                                ) {
                                    Ok(_) => break,
                                    Err(c) => current = c,
                                }
                            }
                            results.lock().push((mv, score, true));
                        } else {
                            results.lock().push((mv, score, false));
                        }
                    }
                })
                .expect("failed to spawn work-stealing search worker");
            handles.push(handle);
        }

        for handle in handles {
            let _ = handle.join();
        }

        let iteration_results = results.lock().clone();
        let completed: Vec<(Move, i32)> = iteration_results
            .iter()
            .filter(|(_, _, done)| *done)
            .map(|(mv, score, _)| (*mv, *score))
            .collect();

        // An incomplete iteration (ran out of time mid-split) contributes
        // nothing; keep whatever the previous completed iteration found.
        if completed.len() < move_order.len() {
            break 'iterative_deepening;
        }

        if let Some(&(mv, score)) = completed.iter().max_by_key(|(_, score)| *score) {
            best_move_overall = Some(mv);
            best_score_overall = score;
        }

        // Reorder next iteration's root moves best-first.
        let mut scored: Vec<(Move, i32)> = completed;
        scored.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
        move_order = scored.into_iter().map(|(mv, _)| mv).collect();

        if let Some(callback) = &config.info_callback {
            let elapsed = start_time.elapsed();
            let nodes = total_nodes.load(Ordering::Relaxed);
            let nps = if elapsed.as_millis() > 0 {
                nodes * 1000 / elapsed.as_millis() as u64
            } else {
                nodes
            };
            callback(&SearchIterationInfo {
                depth,
                nodes,
                nps,
                time_ms: elapsed.as_millis() as u64,
                score: best_score_overall,
                mate_in: None,
                pv: best_move_overall.map(|m| m.to_string()).unwrap_or_default(),
                seldepth: depth,
                tt_hits: 0,
                multipv: 1,
            });
        }
    }

    state.stats.nodes = total_nodes.load(Ordering::Relaxed);
    state.stats.total_nodes = total_nodes.load(Ordering::Relaxed);

    let ponder_move = best_move_overall.and_then(|mv| {
        let mut temp_board = root_board.clone();
        let info = temp_board.make_move(mv);
        let ponder = tt.probe(temp_board.hash).and_then(|entry| {
            entry.best_move().filter(|pmv| {
                let moves = temp_board.generate_moves();
                moves.iter().any(|m| m == pmv)
            })
        });
        temp_board.unmake_move(mv, info);
        ponder
    });

    SearchResult {
        best_move: best_move_overall,
        ponder_move,
    }
}

/// Search a single root move to `depth`, returning `(score, nodes_searched,
/// completed)`. `completed` is `false` when the search was cut short by the
/// stop flag, the time limit, or the node limit — the caller should not
/// trust a partial score for move ordering or best-move selection.
#[allow(clippy::too_many_arguments)]
fn search_root_move(
    root_board: &Board,
    mv: Move,
    depth: u32,
    alpha: i32,
    beta: i32,
    local_state: &mut SearchState,
    stop: &AtomicBool,
    start_time: Instant,
    time_limit_ms: u64,
    node_limit: u64,
) -> (i32, u64, bool) {
    let mut board = root_board.clone();
    let info = board.make_move(mv);

    let mut ctx = SimpleSearchContext {
        board: &mut board,
        state: local_state,
        stop,
        start_time,
        time_limit_ms,
        node_limit,
        nodes: 0,
        initial_depth: depth,
        static_eval: [0; MAX_PLY],
        previous_move: [EMPTY_MOVE; MAX_PLY],
        previous_piece: [None; MAX_PLY],
        info_callback: None,
        root_moves: Vec::new(),
    };

    let score = -ctx.alphabeta(depth.saturating_sub(1), -beta, -alpha, true, 1, EMPTY_MOVE);
    let nodes = ctx.nodes;
    let completed = !stop.load(Ordering::Relaxed);

    board.unmake_move(mv, info);

    (score, nodes, completed)
}
