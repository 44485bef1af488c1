//! Monthly grouping of labeled pairs and per-month graph construction

use std::collections::BTreeMap;

use crate::config::{DateConvention, EdgeWeight};
use crate::data::{LabelColumn, LabeledPairs, MetadataTable, TransmissionEvent};
use crate::graph::{CompressedGraph, GraphBuilder, NodeAttributes};
use crate::network::YearMonth;

/// Group pairs by the month of `sample1`'s sampling date.
///
/// Pairs where either sample lacks a parseable date are left out; their
/// count is returned next to the partition.
pub fn partition_by_month<'a>(
    pairs: &'a LabeledPairs,
    metadata: &MetadataTable,
    convention: DateConvention,
) -> (BTreeMap<YearMonth, Vec<&'a TransmissionEvent>>, usize) {
    let date_of = |sample: &str| {
        metadata
            .get(sample)
            .and_then(|m| m.sampling_date.as_deref())
            .and_then(|raw| convention.parse(raw))
    };

    let mut months: BTreeMap<YearMonth, Vec<&TransmissionEvent>> = BTreeMap::new();
    let mut undated = 0;

    for event in &pairs.events {
        match (date_of(&event.sample1), date_of(&event.sample2)) {
            (Some(date1), Some(_)) => months.entry(date1.into()).or_default().push(event),
            _ => {
                log::debug!(
                    "Skipping {}/{}: missing sampling date",
                    event.sample1,
                    event.sample2
                );
                undated += 1;
            }
        }
    }

    (months, undated)
}

/// Build the undirected graph of one month.
///
/// Every endpoint becomes a node carrying its metadata snapshot; an edge is
/// added only where `label` is positive.
pub fn build_month_graph(
    events: &[&TransmissionEvent],
    metadata: &MetadataTable,
    label: LabelColumn,
    weight: EdgeWeight,
) -> CompressedGraph {
    let mut builder = GraphBuilder::with_capacity(events.len() * 2);
    let attributes = |sample: &str| {
        metadata
            .get(sample)
            .map(NodeAttributes::from)
            .unwrap_or_default()
    };

    for event in events {
        let a = builder.add_node(&event.sample1, attributes(&event.sample1));
        let b = builder.add_node(&event.sample2, attributes(&event.sample2));

        if label.value(event) {
            let w = match weight {
                EdgeWeight::Label => 1.0,
                EdgeWeight::Snps => event.snps as f64,
            };
            builder.add_edge(a, b, w);
        }
    }

    builder.build()
}
