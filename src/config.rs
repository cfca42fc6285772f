//! Analysis configuration: every tunable constant the detection and
//! scoring model uses, bundled into one struct with a `Default` impl so
//! a single request's worth of thresholds can be constructed once and
//! shared read-only across the pipeline.

/// Tunable thresholds for the analysis pipeline.
///
/// All values here default to the literal constants the detection and
/// scoring model is built against. Override via
/// [`Analyzer::with_config`](crate::Analyzer::with_config) for testing
/// or for deployments that want to tune sensitivity without recompiling.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    // Cycle detector
    pub min_cycle_length: usize,
    pub max_cycle_length: usize,

    // Smurfing detector
    pub smurfing_window_hours: i64,
    pub smurfing_min_endpoints: usize,

    // Layered shell detector
    pub shell_min_hops: usize,
    pub shell_max_hops: usize,
    pub shell_max_degree: usize,

    // Velocity burst signal
    pub velocity_window_hours: i64,
    pub velocity_min_tx: usize,

    // Scoring weights
    pub score_cycle: f64,
    pub score_smurfing: f64,
    pub score_shell: f64,
    pub score_velocity: f64,
    pub score_centrality: f64,
    pub score_fp_merchant: f64,

    // Merchant false-positive damper thresholds
    pub merchant_min_lifetime_days: i64,
    pub merchant_amount_cv_threshold: f64,
    pub merchant_spacing_cv_threshold: f64,

    /// Safety valve for the elementary-circuit enumerator: total DFS
    /// visit-steps across the whole enumeration before it stops and
    /// returns whatever cycles it has already found. An internal guard
    /// against combinatorial blow-up on dense input graphs.
    pub cycle_work_cap: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_cycle_length: 3,
            max_cycle_length: 5,

            smurfing_window_hours: 72,
            smurfing_min_endpoints: 10,

            shell_min_hops: 3,
            shell_max_hops: 5,
            shell_max_degree: 3,

            velocity_window_hours: 24,
            velocity_min_tx: 10,

            score_cycle: 40.0,
            score_smurfing: 30.0,
            score_shell: 25.0,
            score_velocity: 20.0,
            score_centrality: 10.0,
            score_fp_merchant: -25.0,

            merchant_min_lifetime_days: 30,
            merchant_amount_cv_threshold: 0.30,
            merchant_spacing_cv_threshold: 0.50,

            cycle_work_cap: 2_000_000,
        }
    }
}
