//! Fan-in / fan-out "smurfing" detection: a two-pointer sliding window
//! per account, per direction, over its sorted incoming or outgoing
//! timeline, tracking distinct counterparties with a running multiset
//! as the window advances.

use std::collections::HashMap;

use chrono::Duration;

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::raw_ring::{PatternType, RawRing};

#[derive(Clone, Copy)]
enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Incoming => "fan_in_smurfing",
            Direction::Outgoing => "fan_out_smurfing",
        }
    }
}

pub fn detect(graph: &TransactionGraph, config: &AnalysisConfig) -> Vec<RawRing> {
    let mut accounts: Vec<&str> = graph.nodes().map(|s| s.as_str()).collect();
    accounts.sort_unstable();

    let mut rings = Vec::new();
    for account in accounts {
        if let Some(ring) = first_window_over_threshold(graph, config, account, Direction::Incoming)
        {
            rings.push(ring);
        }
        if let Some(ring) = first_window_over_threshold(graph, config, account, Direction::Outgoing)
        {
            rings.push(ring);
        }
    }
    rings
}

/// Finds the minimum (first, by right-endpoint advance) window that
/// reaches `config.smurfing_min_endpoints` distinct counterparties.
fn first_window_over_threshold(
    graph: &TransactionGraph,
    config: &AnalysisConfig,
    account: &str,
    direction: Direction,
) -> Option<RawRing> {
    let timeline = match direction {
        Direction::Incoming => graph.incoming_timeline(account),
        Direction::Outgoing => graph.outgoing_timeline(account),
    };
    if timeline.is_empty() {
        return None;
    }

    let window = Duration::hours(config.smurfing_window_hours);
    let mut left = 0usize;
    let mut counterparty_counts: HashMap<&str, usize> = HashMap::new();

    for right in 0..timeline.len() {
        let (ts_right, cp_right) = &timeline[right];
        *counterparty_counts.entry(cp_right.as_str()).or_insert(0) += 1;

        while *ts_right - timeline[left].0 > window {
            let (_, cp_left) = &timeline[left];
            if let Some(count) = counterparty_counts.get_mut(cp_left.as_str()) {
                *count -= 1;
                if *count == 0 {
                    counterparty_counts.remove(cp_left.as_str());
                }
            }
            left += 1;
        }

        if counterparty_counts.len() >= config.smurfing_min_endpoints {
            let mut counterparties: Vec<String> =
                counterparty_counts.keys().map(|s| s.to_string()).collect();
            counterparties.sort_unstable();

            let mut members = vec![account.to_string()];
            members.extend(counterparties);

            return Some(RawRing {
                members,
                pattern_type: PatternType::Smurfing,
                label: direction.label().to_string(),
            });
        }
    }

    None
}
