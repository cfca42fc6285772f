//! Report assembly: deduplicates RawRings across detectors into stable
//! `RING_NNN` identifiers, joins scored accounts to their smallest
//! containing ring, filters to accounts with a positive score, and
//! sorts everything into the final deterministic shape.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::graph::TransactionGraph;
use crate::parser::Transaction;
use crate::raw_ring::RawRing;
use crate::scoring::{self, AccountScore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub ring_id: String,
    pub pattern_type: String,
    pub members: Vec<String>,
    pub member_count: usize,
    pub risk_score: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountVerdict {
    pub account_id: String,
    pub suspicion_score: Decimal,
    pub detected_patterns: Vec<String>,
    pub ring_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub suspicious_accounts: Vec<AccountVerdict>,
    pub fraud_rings: Vec<Ring>,
    pub summary: Summary,
    pub transactions: Vec<Transaction>,
}

impl Report {
    /// Serializes the report to the JSON shape the external HTTP
    /// transport returns verbatim.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Assembles the final [`Report`] from each detector's raw findings,
/// the scoring pass, and the wall-clock duration of the whole analysis.
pub fn build(
    graph: &TransactionGraph,
    cycle_rings: &[RawRing],
    smurfing_rings: &[RawRing],
    shell_rings: &[RawRing],
    scores: &[AccountScore],
    elapsed_seconds: f64,
) -> Report {
    let score_by_account: HashMap<&str, &AccountScore> =
        scores.iter().map(|s| (s.account_id.as_str(), s)).collect();

    let mut seen_identities = HashSet::new();
    let mut rings = Vec::new();
    let mut smallest_ring_for_account: HashMap<String, String> = HashMap::new();

    for raw in cycle_rings.iter().chain(smurfing_rings).chain(shell_rings) {
        if !seen_identities.insert(raw.identity()) {
            continue;
        }

        let ring_id = format!("RING_{:03}", rings.len() + 1);
        for member in &raw.members {
            smallest_ring_for_account
                .entry(member.clone())
                .or_insert_with(|| ring_id.clone());
        }

        let member_scores: Vec<Decimal> = raw
            .members
            .iter()
            .filter_map(|m| score_by_account.get(m.as_str()).map(|s| s.score))
            .collect();

        rings.push(Ring {
            ring_id,
            pattern_type: raw.pattern_type.as_str().to_string(),
            members: raw.members.clone(),
            member_count: raw.members.len(),
            risk_score: scoring::ring_risk_score(&member_scores),
        });
    }

    let mut suspicious_accounts: Vec<AccountVerdict> = scores
        .iter()
        .filter(|s| s.score > Decimal::ZERO)
        .map(|s| AccountVerdict {
            account_id: s.account_id.clone(),
            suspicion_score: s.score,
            detected_patterns: s.labels.clone(),
            ring_id: smallest_ring_for_account.get(&s.account_id).cloned(),
        })
        .collect();

    suspicious_accounts.sort_by(|a, b| {
        b.suspicion_score
            .cmp(&a.suspicion_score)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });

    let summary = Summary {
        total_accounts_analyzed: graph.node_count(),
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: rings.len(),
        processing_time_seconds: (elapsed_seconds * 1000.0).round() / 1000.0,
    };

    Report {
        suspicious_accounts,
        fraud_rings: rings,
        summary,
        transactions: Vec::new(),
    }
}
