//! Per-account suspicion scoring: pattern signals, a velocity burst
//! check, a degree-centrality anomaly check, and a merchant
//! false-positive damper, combined into one bounded `[0, 100]` score.

use std::collections::{HashMap, HashSet};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::raw_ring::{PatternType, RawRing};

/// Everything the scoring engine needs about one account, computed
/// once from the graph and reused across every signal check.
struct AccountProfile {
    lifetime_days: i64,
    amounts: Vec<Decimal>,
    inter_arrival_hours: Vec<f64>,
    full_timeline_len: usize,
    max_transactions_in_velocity_window: usize,
}

fn build_profile(graph: &TransactionGraph, account: &str, config: &AnalysisConfig) -> AccountProfile {
    let timeline = graph.incident_timeline(account);

    let lifetime_days = match (timeline.first(), timeline.last()) {
        (Some((first, _)), Some((last, _))) => (*last - *first).num_days(),
        _ => 0,
    };

    let amounts: Vec<Decimal> = timeline.iter().map(|(_, amount)| *amount).collect();

    let inter_arrival_hours: Vec<f64> = timeline
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0).num_seconds() as f64 / 3600.0)
        .collect();

    let window = chrono::Duration::hours(config.velocity_window_hours);
    let mut max_in_window = 0usize;
    let mut left = 0usize;
    for right in 0..timeline.len() {
        while timeline[right].0 - timeline[left].0 > window {
            left += 1;
        }
        max_in_window = max_in_window.max(right - left + 1);
    }

    AccountProfile {
        lifetime_days,
        amounts,
        inter_arrival_hours,
        full_timeline_len: timeline.len(),
        max_transactions_in_velocity_window: max_in_window,
    }
}

fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt() / mean)
}

fn decimal_to_f64(values: &[Decimal]) -> Vec<f64> {
    values
        .iter()
        .map(|d| d.to_string().parse::<f64>().unwrap_or(0.0))
        .collect()
}

fn looks_like_merchant(profile: &AccountProfile, config: &AnalysisConfig) -> bool {
    if profile.lifetime_days < config.merchant_min_lifetime_days {
        return false;
    }
    let amount_cv = match coefficient_of_variation(&decimal_to_f64(&profile.amounts)) {
        Some(cv) => cv,
        None => return false,
    };
    let spacing_cv = match coefficient_of_variation(&profile.inter_arrival_hours) {
        Some(cv) => cv,
        None => return false,
    };
    amount_cv <= config.merchant_amount_cv_threshold
        && spacing_cv <= config.merchant_spacing_cv_threshold
}

/// One scored account: final bounded score plus the labels that
/// contributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountScore {
    pub account_id: String,
    pub score: Decimal,
    pub labels: Vec<String>,
}

fn round_half_up(value: f64) -> Decimal {
    let raw = Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO);
    raw.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn score_accounts(
    graph: &TransactionGraph,
    config: &AnalysisConfig,
    cycle_rings: &[RawRing],
    smurfing_rings: &[RawRing],
    shell_rings: &[RawRing],
) -> Vec<AccountScore> {
    let mut pattern_membership: HashMap<&str, HashSet<PatternType>> = HashMap::new();
    let mut pattern_labels: HashMap<&str, HashSet<&str>> = HashMap::new();

    for ring in cycle_rings.iter().chain(smurfing_rings).chain(shell_rings) {
        for member in &ring.members {
            pattern_membership
                .entry(member.as_str())
                .or_default()
                .insert(ring.pattern_type);
            pattern_labels
                .entry(member.as_str())
                .or_default()
                .insert(ring.label.as_str());
        }
    }

    let (degree_mean, degree_stddev) = graph.degree_mean_stddev();

    let mut accounts: Vec<&String> = graph.nodes().collect();
    accounts.sort_unstable();

    accounts
        .into_iter()
        .map(|account| {
            let mut total = 0.0f64;
            let mut labels: Vec<String> = Vec::new();

            if let Some(patterns) = pattern_membership.get(account.as_str()) {
                if patterns.contains(&PatternType::Cycle) {
                    total += config.score_cycle;
                }
                if patterns.contains(&PatternType::Smurfing) {
                    total += config.score_smurfing;
                }
                if patterns.contains(&PatternType::Shell) {
                    total += config.score_shell;
                }
            }
            if let Some(found) = pattern_labels.get(account.as_str()) {
                let mut sorted: Vec<&str> = found.iter().copied().collect();
                sorted.sort_unstable();
                labels.extend(sorted.into_iter().map(String::from));
            }

            let profile = build_profile(graph, account, config);

            if profile.full_timeline_len >= config.velocity_min_tx
                && profile.max_transactions_in_velocity_window >= config.velocity_min_tx
            {
                total += config.score_velocity;
                labels.push("high_velocity".to_string());
            }

            let degree = graph.degree(account) as f64;
            if degree_stddev > 0.0 && degree >= degree_mean + 2.0 * degree_stddev {
                total += config.score_centrality;
                labels.push("centrality_anomaly".to_string());
            }

            if looks_like_merchant(&profile, config) {
                total += config.score_fp_merchant;
            }

            let clamped = total.max(0.0).min(100.0);
            labels.sort_unstable();
            labels.dedup();

            AccountScore {
                account_id: account.clone(),
                score: round_half_up(clamped),
                labels,
            }
        })
        .collect()
}

/// Mean of member scores for one ring, rounded half-up to one decimal.
pub fn ring_risk_score(member_scores: &[Decimal]) -> Decimal {
    if member_scores.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = member_scores.iter().sum();
    let mean = sum / Decimal::from(member_scores.len());
    mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Transaction, TransactionTable};
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn tx(id: &str, from: &str, to: &str, amount: &str, ts: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            sender: from.to_string(),
            receiver: to.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    #[test]
    fn account_in_a_cycle_ring_gets_the_cycle_weight() {
        let table = TransactionTable {
            rows: vec![
                tx("T1", "A", "B", "10", "2025-01-01 00:00:00"),
                tx("T2", "B", "C", "10", "2025-01-02 00:00:00"),
                tx("T3", "C", "A", "10", "2025-01-03 00:00:00"),
            ],
        };
        let graph = TransactionGraph::build(&table);
        let config = AnalysisConfig::default();
        let cycle = RawRing {
            members: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            pattern_type: PatternType::Cycle,
            label: "cycle_length_3".to_string(),
        };
        let scores = score_accounts(&graph, &config, &[cycle], &[], &[]);
        let a_score = scores.iter().find(|s| s.account_id == "A").unwrap();
        assert_eq!(a_score.score, Decimal::from_str("40.0").unwrap());
        assert!(a_score.labels.contains(&"cycle_length_3".to_string()));
    }

    #[test]
    fn account_untouched_by_any_detector_scores_zero() {
        let table = TransactionTable {
            rows: vec![tx("T1", "A", "B", "10", "2025-01-01 00:00:00")],
        };
        let graph = TransactionGraph::build(&table);
        let scores = score_accounts(&graph, &AnalysisConfig::default(), &[], &[], &[]);
        assert!(scores.iter().all(|s| s.score == Decimal::ZERO));
    }

    #[test]
    fn score_never_exceeds_one_hundred() {
        let table = TransactionTable {
            rows: vec![
                tx("T1", "A", "B", "10", "2025-01-01 00:00:00"),
                tx("T2", "B", "C", "10", "2025-01-02 00:00:00"),
                tx("T3", "C", "A", "10", "2025-01-03 00:00:00"),
            ],
        };
        let graph = TransactionGraph::build(&table);
        let config = AnalysisConfig::default();
        let cycle = RawRing {
            members: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            pattern_type: PatternType::Cycle,
            label: "cycle_length_3".to_string(),
        };
        let smurfing = RawRing {
            members: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            pattern_type: PatternType::Smurfing,
            label: "fan_in_smurfing".to_string(),
        };
        let shell = RawRing {
            members: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            pattern_type: PatternType::Shell,
            label: "layered_shell_chain".to_string(),
        };
        let scores = score_accounts(&graph, &config, &[cycle], &[smurfing], &[shell]);
        assert!(scores.iter().all(|s| s.score <= Decimal::from(100)));
    }

    #[test]
    fn merchant_damper_requires_at_least_two_data_points() {
        let profile = AccountProfile {
            lifetime_days: 60,
            amounts: vec![Decimal::from_str("10").unwrap()],
            inter_arrival_hours: vec![],
            full_timeline_len: 1,
            max_transactions_in_velocity_window: 1,
        };
        assert!(!looks_like_merchant(&profile, &AnalysisConfig::default()));
    }

    #[test]
    fn ring_risk_score_is_the_mean_of_member_scores() {
        let scores = vec![
            Decimal::from_str("40.0").unwrap(),
            Decimal::from_str("60.0").unwrap(),
        ];
        assert_eq!(ring_risk_score(&scores), Decimal::from_str("50.0").unwrap());
    }
}
