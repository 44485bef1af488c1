//! Monthly transmission networks and their centrality summaries

pub mod detection;
pub mod metrics;
pub mod partition;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::config::NetworkConfig;
use crate::data::{LabeledPairs, MetadataTable, TransmissionEvent};
use crate::graph::centrality;
use crate::graph::CompressedGraph;

pub use metrics::{summarize_month, CentralitySummary};
pub use partition::{build_month_graph, partition_by_month};

/// Calendar month used to group pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The six centrality measures averaged per month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralityKind {
    Degree,
    Closeness,
    Betweenness,
    CurrentFlowBetweenness,
    Load,
    Harmonic,
}

impl CentralityKind {
    pub const ALL: [CentralityKind; 6] = [
        CentralityKind::Degree,
        CentralityKind::Closeness,
        CentralityKind::Betweenness,
        CentralityKind::CurrentFlowBetweenness,
        CentralityKind::Load,
        CentralityKind::Harmonic,
    ];

    /// Output column name
    pub fn column_name(&self) -> &'static str {
        match self {
            CentralityKind::Degree => "degrees_centrality",
            CentralityKind::Closeness => "closeness_centrality",
            CentralityKind::Betweenness => "betweenness_centrality",
            CentralityKind::CurrentFlowBetweenness => "current_flow_betweenness_centrality",
            CentralityKind::Load => "load_centrality",
            CentralityKind::Harmonic => "harmonic_centrality",
        }
    }

    /// Per-node values on a connected graph, `None` when undefined
    pub fn compute(&self, graph: &CompressedGraph) -> Option<Vec<f64>> {
        match self {
            CentralityKind::Degree => centrality::degree_centrality(graph),
            CentralityKind::Closeness => centrality::closeness_centrality(graph),
            CentralityKind::Betweenness => centrality::betweenness_centrality(graph),
            CentralityKind::CurrentFlowBetweenness => {
                centrality::current_flow_betweenness_centrality(graph)
            }
            CentralityKind::Load => centrality::load_centrality(graph),
            CentralityKind::Harmonic => centrality::harmonic_centrality(graph),
        }
    }
}

/// One month's rows, graph and summary
#[derive(Debug, Clone)]
pub struct MonthlyNetwork<'a> {
    pub month: YearMonth,
    pub events: Vec<&'a TransmissionEvent>,
    pub graph: CompressedGraph,
    pub summary: CentralitySummary,
}

/// Row counts of an aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub input_rows: usize,
    pub undated_rows: usize,
    pub months: usize,
}

/// Result of the network aggregator, months ascending
#[derive(Debug, Clone)]
pub struct NetworkReport<'a> {
    pub months: Vec<MonthlyNetwork<'a>>,
    pub stats: AggregationStats,
}

impl NetworkReport<'_> {
    /// Month summaries in ascending month order
    pub fn summaries(&self) -> Vec<&CentralitySummary> {
        self.months.iter().map(|m| &m.summary).collect()
    }
}

/// Group labeled pairs by month, build one graph per month and summarise
/// its centralities. Months are processed in parallel.
pub fn aggregate<'a>(
    pairs: &'a LabeledPairs,
    metadata: &MetadataTable,
    config: &NetworkConfig,
) -> Result<NetworkReport<'a>> {
    let label = pairs.resolve_label(&config.label)?;
    let (partitions, undated_rows) = partition_by_month(pairs, metadata, config.date_convention);

    log::info!(
        "Building {} monthly networks on label '{}'",
        partitions.len(),
        config.label
    );

    let months: Vec<MonthlyNetwork<'a>> = partitions
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(month, events)| {
            let graph = build_month_graph(&events, metadata, label, config.edge_weight);
            let summary = summarize_month(month, &graph);
            log::debug!(
                "{}: {} rows, {} nodes, {} edges",
                month,
                events.len(),
                graph.node_count,
                graph.edge_count()
            );
            MonthlyNetwork {
                month,
                events,
                graph,
                summary,
            }
        })
        .collect();

    let stats = AggregationStats {
        input_rows: pairs.len(),
        undated_rows,
        months: months.len(),
    };
    log::info!(
        "Summarised {} months ({} of {} rows lacked a sampling date)",
        stats.months,
        stats.undated_rows,
        stats.input_rows
    );

    Ok(NetworkReport { months, stats })
}
