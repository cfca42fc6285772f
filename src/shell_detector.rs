//! Layered shell-chain detection: bounded-depth DFS over outgoing
//! edges, flagging simple paths whose intermediate nodes all have low
//! undirected degree. Endpoints are unconstrained; only the hops
//! strictly between the source and the current tail matter.

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::raw_ring::{PatternType, RawRing};

pub fn detect(graph: &TransactionGraph, config: &AnalysisConfig) -> Vec<RawRing> {
    let mut nodes: Vec<&str> = graph.nodes().map(|s| s.as_str()).collect();
    nodes.sort_unstable();

    let mut rings = Vec::new();
    for &start in &nodes {
        let mut path = vec![start.to_string()];
        walk(graph, config, &mut path, &mut rings);
    }
    rings
}

fn walk(
    graph: &TransactionGraph,
    config: &AnalysisConfig,
    path: &mut Vec<String>,
    rings: &mut Vec<RawRing>,
) {
    if path.len() - 1 >= config.shell_max_hops {
        return;
    }

    let tail = path.last().unwrap().clone();
    let mut successors: Vec<String> = graph.successors(&tail).map(String::from).collect();
    successors.sort_unstable();

    for next in successors {
        if path.contains(&next) {
            continue;
        }

        let next_degree = graph.degree(&next);
        path.push(next);
        let hops = path.len() - 1;
        if hops >= config.shell_min_hops {
            rings.push(RawRing {
                members: path.clone(),
                pattern_type: PatternType::Shell,
                label: "layered_shell_chain".to_string(),
            });
        }
        // `next` only continues the chain as an intermediate if its own
        // degree stays within the threshold; as the path's current tail
        // it was just flagged above regardless of degree.
        if next_degree <= config.shell_max_degree {
            walk(graph, config, path, rings);
        }
        path.pop();
    }
}
