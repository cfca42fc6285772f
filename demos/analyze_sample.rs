//! Mule ring detection example
//!
//! This example demonstrates running the full analysis pipeline over an
//! embedded CSV batch containing a circular routing pattern, printing
//! the resulting suspicious accounts and fraud rings.

use mule_ring_detector::analyze;

const SAMPLE_CSV: &str = "transaction_id,sender,receiver,amount,timestamp\n\
TX001,A,B,500,2025-01-01 09:00:00\n\
TX002,B,C,490,2025-01-01 10:00:00\n\
TX003,C,A,480,2025-01-01 11:00:00\n\
TX004,D,E,1000,2025-01-02 08:00:00\n";

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Mule Ring Detector ===\n");

    let report = match analyze(SAMPLE_CSV.as_bytes(), "sample_batch.csv") {
        Ok(report) => report,
        Err(err) => {
            eprintln!("analysis failed: {err}");
            std::process::exit(1);
        }
    };

    println!("Accounts analyzed: {}", report.summary.total_accounts_analyzed);
    println!(
        "Suspicious accounts flagged: {}",
        report.summary.suspicious_accounts_flagged
    );
    println!("Fraud rings detected: {}", report.summary.fraud_rings_detected);
    println!("Processing time: {:.3}s\n", report.summary.processing_time_seconds);

    for account in &report.suspicious_accounts {
        println!(
            "  {} — score {} — patterns {:?} — ring {:?}",
            account.account_id, account.suspicion_score, account.detected_patterns, account.ring_id
        );
    }

    println!();
    for ring in &report.fraud_rings {
        println!(
            "  {} — {} — members {:?} — risk {}",
            ring.ring_id, ring.pattern_type, ring.members, ring.risk_score
        );
    }
}
