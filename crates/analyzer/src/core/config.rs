/// Knobs for one analysis run, explicitly passed rather than ambient so
/// tests can vary them per call.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Analyze functions on a rayon pool instead of sequentially.
    pub parallel_execution: bool,
    /// Report effects only reachable from an interaction through a
    /// conditional branch. On by default: an attacker chooses the path.
    pub flag_conditional_paths: bool,
    /// Collapse findings sharing (function, interaction, effect, kind).
    pub deduplication_enabled: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            parallel_execution: true,
            flag_conditional_paths: true,
            deduplication_enabled: true,
        }
    }
}
