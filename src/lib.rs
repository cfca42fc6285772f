//! # Mule Ring Detector
//!
//! A forensic analysis core for money-muling detection: feed it a batch
//! of financial transactions and it returns a structured report
//! identifying suspicious accounts and the rings they form.
//!
//! ## Pipeline
//!
//! - **Parser**: multi-format (CSV/TSV/Excel) ingestion with flexible
//!   column-alias mapping, type coercion, and deduplication.
//! - **Graph Builder**: folds the transaction batch into a directed,
//!   aggregated transaction graph plus an undirected degree map.
//! - **Pattern Detector**: three independent sub-detectors — elementary
//!   cycle enumeration, fan-in/fan-out smurfing, and layered shell
//!   chains — run in parallel over the shared immutable graph.
//! - **Scoring Engine**: combines pattern memberships with a velocity
//!   burst check, a degree-centrality anomaly check, and a merchant
//!   false-positive damper into one bounded suspicion score.
//! - **Report Builder**: deduplicates rings across detectors, assigns
//!   stable ring ids, and assembles the final [`Report`].
//!
//! ## Alignment with ambient conventions
//!
//! Errors are typed with `thiserror`; pipeline stages log through
//! `tracing`; money amounts are `rust_decimal::Decimal`, never floats.

pub mod config;
pub mod cycle_detector;
pub mod graph;
pub mod parser;
pub mod raw_ring;
pub mod report;
pub mod scoring;
pub mod shell_detector;
pub mod smurfing_detector;

pub use config::AnalysisConfig;
pub use graph::TransactionGraph;
pub use parser::{Transaction, TransactionTable};
pub use report::{AccountVerdict, Report, Ring, Summary};

use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Errors that can stop the pipeline before a [`Report`] is produced.
///
/// Row-level problems (bad timestamps, non-positive amounts, self-loops)
/// are never surfaced here: the parser drops those rows silently and
/// logs a count. Only input-shape problems reach the caller.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("no valid transactions remained after parsing")]
    NoValidTransactions,

    #[error("failed to parse input: {0}")]
    ParseError(String),
}

/// Runs the full pipeline on one batch: Parser → Graph Builder →
/// three-way parallel Pattern Detector → Scoring Engine → Report Builder.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, file_bytes: &[u8], filename: &str) -> Result<Report, AnalysisError> {
        let started = Instant::now();

        tracing::info!(filename, bytes = file_bytes.len(), "starting analysis");

        let table = parser::parse(file_bytes, filename)?;
        tracing::debug!(rows = table.len(), "parsed transaction table");

        let graph = TransactionGraph::build(&table);
        tracing::debug!(nodes = graph.node_count(), "built transaction graph");

        let (cycles, (smurfing, shell)) = rayon::join(
            || cycle_detector::detect(&graph, &self.config),
            || {
                rayon::join(
                    || smurfing_detector::detect(&graph, &self.config),
                    || shell_detector::detect(&graph, &self.config),
                )
            },
        );
        tracing::debug!(
            cycles = cycles.len(),
            smurfing = smurfing.len(),
            shell = shell.len(),
            "pattern detectors complete"
        );

        let scores = scoring::score_accounts(&graph, &self.config, &cycles, &smurfing, &shell);

        let elapsed_seconds = started.elapsed().as_secs_f64();
        let report = report::build(&graph, &cycles, &smurfing, &shell, &scores, elapsed_seconds);

        tracing::info!(
            suspicious_accounts = report.summary.suspicious_accounts_flagged,
            fraud_rings = report.summary.fraud_rings_detected,
            seconds = report.summary.processing_time_seconds,
            "analysis complete"
        );

        Ok(report)
    }
}

/// Convenience wrapper over [`Analyzer::new`] for one-off calls.
pub fn analyze(file_bytes: &[u8], filename: &str) -> Result<Report, AnalysisError> {
    Analyzer::new().analyze(file_bytes, filename)
}
