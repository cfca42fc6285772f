//! Directed transaction graph: one aggregated edge per ordered account
//! pair, plus the undirected degree map used throughout scoring and
//! shell-chain detection.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::parser::TransactionTable;

/// Every transaction `u -> v` observed for one ordered pair, aggregated.
#[derive(Debug, Clone, Default)]
pub struct Edge {
    pub count: usize,
    pub amount_sum: Decimal,
    pub timeline: Vec<(NaiveDateTime, Decimal)>,
}

/// The directed multigraph built from one batch, plus its undirected
/// degree map.
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    nodes: HashSet<String>,
    edges: HashMap<(String, String), Edge>,
    /// account -> set of distinct neighbors (senders and receivers, both
    /// directions collapsed)
    neighbors: HashMap<String, HashSet<String>>,
}

impl TransactionGraph {
    /// Fold a [`TransactionTable`] into a graph in one linear pass.
    pub fn build(table: &TransactionTable) -> Self {
        let mut graph = TransactionGraph::default();

        for tx in table.iter() {
            graph.nodes.insert(tx.sender.clone());
            graph.nodes.insert(tx.receiver.clone());

            let edge = graph
                .edges
                .entry((tx.sender.clone(), tx.receiver.clone()))
                .or_default();
            edge.count += 1;
            edge.amount_sum += tx.amount;
            edge.timeline.push((tx.timestamp, tx.amount));

            graph
                .neighbors
                .entry(tx.sender.clone())
                .or_default()
                .insert(tx.receiver.clone());
            graph
                .neighbors
                .entry(tx.receiver.clone())
                .or_default()
                .insert(tx.sender.clone());
        }

        graph
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, account: &str) -> bool {
        self.nodes.contains(account)
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.get(&(from.to_string(), to.to_string()))
    }

    /// Outgoing neighbors of `account`, in no particular order.
    pub fn successors(&self, account: &str) -> impl Iterator<Item = &str> {
        self.edges
            .keys()
            .filter(move |(from, _)| from == account)
            .map(|(_, to)| to.as_str())
    }

    /// Undirected degree: count of distinct neighbors in either direction.
    pub fn degree(&self, account: &str) -> usize {
        self.neighbors.get(account).map_or(0, |n| n.len())
    }

    /// All transactions with `account` as sender or receiver, chronological.
    pub fn incident_timeline(&self, account: &str) -> Vec<(NaiveDateTime, Decimal)> {
        let mut combined: Vec<(NaiveDateTime, Decimal)> = self
            .edges
            .iter()
            .filter(|((from, to), _)| from == account || to == account)
            .flat_map(|(_, edge)| edge.timeline.iter().copied())
            .collect();
        combined.sort_by_key(|(ts, _)| *ts);
        combined
    }

    /// Transactions with `account` as receiver, chronological, paired
    /// with the sending counterparty.
    pub fn incoming_timeline(&self, account: &str) -> Vec<(NaiveDateTime, String)> {
        let mut incoming: Vec<(NaiveDateTime, String)> = self
            .edges
            .iter()
            .filter(|((_, to), _)| to == account)
            .flat_map(|((from, _), edge)| {
                edge.timeline.iter().map(move |(ts, _)| (*ts, from.clone()))
            })
            .collect();
        incoming.sort_by_key(|(ts, _)| *ts);
        incoming
    }

    /// Transactions with `account` as sender, chronological, paired
    /// with the receiving counterparty.
    pub fn outgoing_timeline(&self, account: &str) -> Vec<(NaiveDateTime, String)> {
        let mut outgoing: Vec<(NaiveDateTime, String)> = self
            .edges
            .iter()
            .filter(|((from, _), _)| from == account)
            .flat_map(|((_, to), edge)| {
                edge.timeline.iter().map(move |(ts, _)| (*ts, to.clone()))
            })
            .collect();
        outgoing.sort_by_key(|(ts, _)| *ts);
        outgoing
    }

    /// Mean and population standard deviation of undirected degree
    /// across all nodes.
    pub fn degree_mean_stddev(&self) -> (f64, f64) {
        if self.nodes.is_empty() {
            return (0.0, 0.0);
        }
        let degrees: Vec<f64> = self.nodes.iter().map(|n| self.degree(n) as f64).collect();
        let mean = degrees.iter().sum::<f64>() / degrees.len() as f64;
        let variance =
            degrees.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / degrees.len() as f64;
        (mean, variance.sqrt())
    }
}
