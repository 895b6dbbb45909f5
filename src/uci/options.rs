use crate::board::{set_pext_mode, PextMode, SearchParams, SearchState, DEFAULT_TT_MB};
use crate::engine::ParallelMode;

/// Print a UCI spin option.
fn print_spin(
    name: &str,
    default: impl std::fmt::Display,
    min: impl std::fmt::Display,
    max: impl std::fmt::Display,
) {
    println!("option name {name} type spin default {default} min {min} max {max}");
}

/// Print a UCI check option.
fn print_check(name: &str, default: bool) {
    println!(
        "option name {name} type check default {}",
        if default { "true" } else { "false" }
    );
}

/// Print a UCI combo option.
fn print_combo(name: &str, default: &str, vars: &[&str]) {
    print!("option name {name} type combo default {default}");
    for var in vars {
        print!(" var {var}");
    }
    println!();
}

pub enum UciOptionAction {
    ReinitHash(usize),
    SetThreads(usize),
    SetParallelMode(ParallelMode),
}

fn pext_mode_name(mode: PextMode) -> &'static str {
    match mode {
        PextMode::Auto => "Auto",
        PextMode::Force => "Force",
        PextMode::Disable => "Disable",
    }
}

fn parse_pext_mode(value: &str) -> Option<PextMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(PextMode::Auto),
        "force" => Some(PextMode::Force),
        "disable" => Some(PextMode::Disable),
        _ => None,
    }
}

fn parallel_mode_name(mode: ParallelMode) -> &'static str {
    match mode {
        ParallelMode::LazySmp => "LazySMP",
        ParallelMode::WorkStealing => "WorkStealing",
    }
}

fn parse_parallel_mode(value: &str) -> Option<ParallelMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lazysmp" => Some(ParallelMode::LazySmp),
        "workstealing" => Some(ParallelMode::WorkStealing),
        _ => None,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

pub struct UciOptions {
    pub hash_mb: usize,
    pub threads: usize,
    pub default_max_nodes: u64,
    pub move_overhead_ms: u64,
    pub soft_time_percent: u64,
    pub hard_time_percent: u64,
    pub multi_pv: u32,
    pub ponder: bool,
    pub pext_mode: PextMode,
    pub parallel_mode: ParallelMode,
}

impl UciOptions {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        UciOptions {
            hash_mb,
            threads: 1,
            default_max_nodes: 0,
            move_overhead_ms: 50,
            soft_time_percent: 70,
            hard_time_percent: 90,
            multi_pv: 1,
            ponder: false,
            pext_mode: PextMode::default(),
            parallel_mode: ParallelMode::default(),
        }
    }

    pub fn print(&self, params: &SearchParams) {
        println!("id name chess_engine");
        println!("id author Dean Menezes");

        // Engine options
        print_spin("Hash", self.hash_mb, 1, 65536);
        print_spin("Threads", self.threads, 1, 256);
        print_spin("Move Overhead", self.move_overhead_ms, 0, 1000);
        print_spin("Soft Time Percent", self.soft_time_percent, 1, 100);
        print_spin("Hard Time Percent", self.hard_time_percent, 1, 100);
        print_spin("Max Nodes", self.default_max_nodes, 0_u64, u64::MAX);
        print_spin("MultiPV", self.multi_pv, 1, 64);
        print_check("Ponder", self.ponder);
        print_combo("PEXT", pext_mode_name(self.pext_mode), &["Auto", "Force", "Disable"]);
        print_combo(
            "Parallel Mode",
            parallel_mode_name(self.parallel_mode),
            &["LazySMP", "WorkStealing"],
        );

        // Tunable search parameters for SPSA
        print_check("NullMove", params.null_move_enabled);
        print_spin("NullMoveReduction", params.null_reduction, 1, 5);

        print_check("Futility", params.futility_enabled);
        print_spin("FutilityMargin", params.futility_margin, 50, 250);
        print_spin("FutilityMaxDepth", params.futility_max_depth, 1, 16);

        print_check("Razoring", params.razoring_enabled);
        print_spin("RazorMargin", params.razor_margin, 50, 400);
        print_spin("RazorMaxDepth", params.razor_max_depth, 1, 6);

        print_check("Aspiration", params.aspiration_enabled);
        print_check("SingularExtension", params.singular_extension_enabled);
        print_check("ProbCut", params.probcut_enabled);
        print_check("CheckExtension", params.check_extension_enabled);

        print_check("RFP", params.rfp_enabled);
        print_spin("RFPMargin", params.rfp_margin, 50, 300);

        print_spin("IIRMinDepth", params.iir_min_depth, 3, 8);
        print_spin("LMRMinDepth", params.lmr_min_depth, 2, 6);
        print_spin("SeePruneThreshold", params.see_prune_threshold, -200, 200);
        print_spin("TTAgingDepth", params.tt_aging_depth, 1, 32);
        print_spin("WorkStealingSplitMinDepth", params.ws_split_min_depth, 1, 32);
        print_spin("WorkStealingSplitMinMoves", params.ws_split_min_moves, 1, 64);
        print_spin("LazySmpAspirationDelta", params.lazy_smp_aspiration_delta, 0, 400);

        print_check("HistoryPruning", params.history_pruning_enabled);
        print_spin("HistoryPruneMinIndex", params.history_prune_min_index, 0, 32);
        print_spin("HistoryPruneThreshold", params.history_prune_threshold, -16000, 0);
        print_spin("HistoryPruneMaxDepth", params.history_prune_max_depth, 0, 16);

        println!("uciok");
    }

    pub fn apply_setoption(
        &mut self,
        name: &str,
        value: Option<&str>,
        state: &mut SearchState,
    ) -> Option<UciOptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_TT_MB)
                    .max(1);
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Some(UciOptionAction::ReinitHash(mb));
                }
            }
            "threads" => {
                let threads = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, 256);
                if threads != self.threads {
                    self.threads = threads;
                    return Some(UciOptionAction::SetThreads(threads));
                }
            }
            "move overhead" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.move_overhead_ms = v;
                }
            }
            "soft time percent" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.soft_time_percent = v.clamp(1, 100);
                }
            }
            "hard time percent" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.hard_time_percent = v.clamp(1, 100);
                }
            }
            "max nodes" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.default_max_nodes = v;
                }
            }
            "softtime" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.soft_time_percent = v.clamp(1, 100);
                }
            }
            "hardtime" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.hard_time_percent = v.clamp(1, 100);
                }
            }
            "nodes" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.default_max_nodes = v;
                }
            }
            "multipv" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    self.multi_pv = v.clamp(1, 64);
                }
            }
            "ponder" => {
                if let Some(v) = value {
                    self.ponder = parse_bool(v);
                }
            }
            "pext" => {
                if let Some(mode) = value.and_then(parse_pext_mode) {
                    self.pext_mode = mode;
                    set_pext_mode(mode);
                }
            }
            "parallel mode" => {
                if let Some(mode) = value.and_then(parse_parallel_mode) {
                    if mode != self.parallel_mode {
                        self.parallel_mode = mode;
                        return Some(UciOptionAction::SetParallelMode(mode));
                    }
                }
            }
            // Tunable search parameters for SPSA
            "nullmove" => {
                if let Some(v) = value {
                    state.params_mut().null_move_enabled = parse_bool(v);
                }
            }
            "nullmovereduction" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().null_reduction = v.clamp(1, 5);
                }
            }
            "futility" => {
                if let Some(v) = value {
                    state.params_mut().futility_enabled = parse_bool(v);
                }
            }
            "futilitymargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().futility_margin = v.clamp(50, 250);
                }
            }
            "futilitymaxdepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().futility_max_depth = v.clamp(1, 16);
                }
            }
            "razoring" => {
                if let Some(v) = value {
                    state.params_mut().razoring_enabled = parse_bool(v);
                }
            }
            "razormargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().razor_margin = v.clamp(50, 400);
                }
            }
            "razormaxdepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().razor_max_depth = v.clamp(1, 6);
                }
            }
            "aspiration" => {
                if let Some(v) = value {
                    state.params_mut().aspiration_enabled = parse_bool(v);
                }
            }
            "singularextension" => {
                if let Some(v) = value {
                    state.params_mut().singular_extension_enabled = parse_bool(v);
                }
            }
            "probcut" => {
                if let Some(v) = value {
                    state.params_mut().probcut_enabled = parse_bool(v);
                }
            }
            "checkextension" => {
                if let Some(v) = value {
                    state.params_mut().check_extension_enabled = parse_bool(v);
                }
            }
            "rfp" => {
                if let Some(v) = value {
                    state.params_mut().rfp_enabled = parse_bool(v);
                }
            }
            "rfpmargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().rfp_margin = v.clamp(50, 300);
                }
            }
            "iirmindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().iir_min_depth = v.clamp(3, 8);
                }
            }
            "lmrmindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().lmr_min_depth = v.clamp(2, 6);
                }
            }
            "seeprunethreshold" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().see_prune_threshold = v.clamp(-200, 200);
                }
            }
            "ttagingdepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().tt_aging_depth = v.clamp(1, 32);
                }
            }
            "workstealingsplitmindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().ws_split_min_depth = v.clamp(1, 32);
                }
            }
            "workstealingsplitminmoves" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().ws_split_min_moves = v.clamp(1, 64);
                }
            }
            "lazysmpaspirationdelta" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().lazy_smp_aspiration_delta = v.clamp(0, 400);
                }
            }
            "historypruning" => {
                if let Some(v) = value {
                    state.params_mut().history_pruning_enabled = parse_bool(v);
                }
            }
            "historypruneminindex" => {
                if let Some(v) = value.and_then(|v| v.parse::<usize>().ok()) {
                    state.params_mut().history_prune_min_index = v.clamp(0, 32);
                }
            }
            "historyprunethreshold" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().history_prune_threshold = v.clamp(-16000, 0);
                }
            }
            "historyprunemaxdepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().history_prune_max_depth = v.clamp(0, 16);
                }
            }
            _ => {}
        }
        None
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
