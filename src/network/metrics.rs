//! Per-month centrality statistics

use crate::graph::CompressedGraph;
use crate::network::detection::connected_components;
use crate::network::{CentralityKind, YearMonth};

/// Month-level centrality averages
#[derive(Debug, Clone, PartialEq)]
pub struct CentralitySummary {
    pub month: YearMonth,
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    /// One value per `CentralityKind::ALL` entry
    pub values: [f64; 6],
}

impl CentralitySummary {
    pub fn value(&self, kind: CentralityKind) -> f64 {
        let idx = CentralityKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        self.values[idx]
    }
}

/// Per-node values of every measure on one connected component, in
/// `CentralityKind::ALL` order; `None` where the measure is undefined
pub fn component_centralities(component: &CompressedGraph) -> [Option<Vec<f64>>; 6] {
    CentralityKind::ALL.map(|kind| kind.compute(component))
}

/// Average every centrality measure over the month's graph.
///
/// Each measure is computed per connected component; a component where the
/// measure is undefined contributes nothing to it. The denominator is always
/// the node count of the whole month graph.
pub fn summarize_month(month: YearMonth, graph: &CompressedGraph) -> CentralitySummary {
    let components = connected_components(graph);
    let mut totals = [0.0; 6];

    for members in &components {
        let component = graph.subgraph(members);
        for (idx, values) in component_centralities(&component).into_iter().enumerate() {
            match values {
                Some(values) => totals[idx] += values.iter().sum::<f64>(),
                None => log::debug!(
                    "{}: {} skipped for a component of {} nodes",
                    month,
                    CentralityKind::ALL[idx].column_name(),
                    members.len()
                ),
            }
        }
    }

    let node_count = graph.node_count;
    let values = if node_count > 0 {
        totals.map(|total| total / node_count as f64)
    } else {
        [0.0; 6]
    };

    CentralitySummary {
        month,
        node_count,
        edge_count: graph.edge_count(),
        component_count: components.len(),
        values,
    }
}
