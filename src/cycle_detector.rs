//! Elementary directed circuit enumeration, bounded by length.
//!
//! Restricts each search to the subgraph of nodes lexicographically
//! greater than or equal to the start node. Every elementary cycle has
//! exactly one node that is its lexicographic minimum, so starting only
//! from that node and only ever stepping to nodes `>= start` finds each
//! cycle exactly once, already in its rotation-canonical form — no
//! separate rotation or dedup pass is needed.

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::raw_ring::{PatternType, RawRing};

pub fn detect(graph: &TransactionGraph, config: &AnalysisConfig) -> Vec<RawRing> {
    let mut nodes: Vec<&str> = graph.nodes().map(|s| s.as_str()).collect();
    nodes.sort_unstable();

    let mut rings = Vec::new();
    let mut work = 0usize;

    for &start in &nodes {
        let mut path = vec![start.to_string()];
        let completed = step(graph, config, start, &mut path, &mut work, &mut rings);
        if !completed {
            tracing::warn!(
                work,
                cap = config.cycle_work_cap,
                "cycle enumeration work cap reached; returning partial results"
            );
            break;
        }
    }

    rings
}

/// Returns `false` if the work cap was hit (caller should stop entirely).
fn step(
    graph: &TransactionGraph,
    config: &AnalysisConfig,
    start: &str,
    path: &mut Vec<String>,
    work: &mut usize,
    rings: &mut Vec<RawRing>,
) -> bool {
    *work += 1;
    if *work > config.cycle_work_cap {
        return false;
    }

    let current = path.last().unwrap().clone();
    let mut successors: Vec<String> = graph.successors(&current).map(String::from).collect();
    successors.sort_unstable();

    for next in successors {
        if next.as_str() < start {
            continue;
        }
        if next == start {
            if path.len() >= config.min_cycle_length {
                rings.push(RawRing {
                    members: path.clone(),
                    pattern_type: PatternType::Cycle,
                    label: format!("cycle_length_{}", path.len()),
                });
            }
            continue;
        }
        if path.len() >= config.max_cycle_length {
            continue;
        }
        if path.contains(&next) {
            continue;
        }

        path.push(next);
        if !step(graph, config, start, path, work, rings) {
            return false;
        }
        path.pop();
    }

    true
}
