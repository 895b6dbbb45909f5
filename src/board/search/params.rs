/// Tunable search parameters.
///
/// Numeric margins and depths are grouped with the boolean flags that gate
/// the technique they belong to, so `null_reduction`/`null_min_depth` sit
/// next to `null_move_enabled`, and so on. All of these are exposed as UCI
/// options (see `crate::uci::options`) for tuning and for disabling a
/// technique entirely when diagnosing a regression.
#[derive(Clone, Debug)]
pub struct SearchParams {
    pub null_move_enabled: bool,
    pub null_reduction: u32,
    pub null_min_depth: u32,
    pub null_verification_depth: u32,

    pub futility_enabled: bool,
    pub futility_margin: i32,
    pub futility_max_depth: u32,

    pub razoring_enabled: bool,
    pub razor_margin: i32,
    pub razor_max_depth: u32,

    pub aspiration_enabled: bool,

    pub lmr_min_depth: u32,
    pub lmr_min_move: usize,
    pub lmr_reduction: u32,

    pub lmp_min_depth: u32,
    pub lmp_move_limit: usize,

    pub iir_min_depth: u32,

    pub singular_extension_enabled: bool,
    pub singular_margin: i32,

    pub probcut_enabled: bool,

    pub check_extension_enabled: bool,

    pub rfp_enabled: bool,
    pub rfp_margin: i32,
    pub static_null_margin: i32,

    pub delta_margin: i32,

    /// SEE threshold below which a capture is pruned from quiescence search
    /// at shallow qsearch depth.
    pub see_prune_threshold: i32,

    /// TT depth threshold above which aging is more aggressive when the
    /// table is full (generation replacement still always wins; this only
    /// affects same-generation replacement of shallow entries).
    pub tt_aging_depth: u32,

    /// Minimum iterative-deepening depth at which work-stealing parallel
    /// search splits the root across threads (1-32).
    pub ws_split_min_depth: u32,
    /// Minimum number of legal root moves required before work-stealing
    /// splits the root across threads (1-64).
    pub ws_split_min_moves: u32,

    /// Aspiration window half-width added per Lazy-SMP helper re-search,
    /// in centipawns (0-400).
    pub lazy_smp_aspiration_delta: i32,

    /// History pruning: skip late, quiet moves with a poor history score at
    /// shallow depth. Disabled for the first `history_prune_min_index`
    /// moves at each node so a legal reply is always tried.
    pub history_pruning_enabled: bool,
    pub history_prune_min_index: usize,
    pub history_prune_threshold: i32,
    pub history_prune_max_depth: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            null_move_enabled: true,
            null_reduction: 2,
            null_min_depth: 3,
            null_verification_depth: 6,

            futility_enabled: true,
            futility_margin: 150,
            futility_max_depth: 8,

            razoring_enabled: true,
            razor_margin: 250,
            razor_max_depth: 3,

            aspiration_enabled: true,

            lmr_min_depth: 3,
            lmr_min_move: 3,
            lmr_reduction: 1,

            lmp_min_depth: 3,
            lmp_move_limit: 8,

            iir_min_depth: 6,

            singular_extension_enabled: true,
            singular_margin: 50,

            probcut_enabled: true,

            check_extension_enabled: true,

            rfp_enabled: true,
            rfp_margin: 100,
            static_null_margin: 120,

            delta_margin: 200,

            see_prune_threshold: 0,

            tt_aging_depth: 8,

            ws_split_min_depth: 5,
            ws_split_min_moves: 4,

            lazy_smp_aspiration_delta: 25,

            history_pruning_enabled: true,
            history_prune_min_index: 4,
            history_prune_threshold: -2000,
            history_prune_max_depth: 5,
        }
    }
}
