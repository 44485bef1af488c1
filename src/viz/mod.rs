//! GraphML export of the monthly transmission networks

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::EdgeWeight;
use crate::data::{LabelColumn, MetadataTable};
use crate::graph::CompressedGraph;
use crate::network::{build_month_graph, NetworkReport, YearMonth};

/// Node attribute keys: (id, attr.name, attr.type)
const NODE_KEYS: [(&str, &str, &str); 6] = [
    ("d0", "ST", "string"),
    ("d1", "hospital_loc", "string"),
    ("d2", "collection", "string"),
    ("d3", "resistance_score", "double"),
    ("d4", "virulence_score", "double"),
    ("d5", "isolation_source_categ", "string"),
];

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialise one graph as undirected GraphML
pub fn write_graphml<W: Write>(graph: &CompressedGraph, out: &mut W) -> Result<()> {
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    for (id, name, ty) in NODE_KEYS {
        writeln!(
            out,
            "  <key id=\"{}\" for=\"node\" attr.name=\"{}\" attr.type=\"{}\"/>",
            id, name, ty
        )?;
    }
    writeln!(
        out,
        "  <key id=\"d6\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>"
    )?;
    writeln!(out, "  <graph edgedefault=\"undirected\">")?;

    for (node_id, attrs) in graph.node_ids.iter().zip(&graph.attributes) {
        let values = [
            attrs.sequence_type.clone(),
            attrs.location.clone(),
            attrs.collection.clone(),
            attrs.resistance.map(|v| format!("{:?}", v)),
            attrs.virulence.map(|v| format!("{:?}", v)),
            attrs.isolation_source.clone(),
        ];

        writeln!(out, "    <node id=\"{}\">", escape(node_id))?;
        for ((key, _, _), value) in NODE_KEYS.iter().zip(values) {
            if let Some(value) = value {
                writeln!(out, "      <data key=\"{}\">{}</data>", key, escape(&value))?;
            }
        }
        writeln!(out, "    </node>")?;
    }

    for src in 0..graph.node_count {
        for (dst, weight) in graph.weighted_neighbors(src) {
            // Each undirected edge is stored twice
            if (dst as usize) < src {
                continue;
            }
            writeln!(
                out,
                "    <edge source=\"{}\" target=\"{}\">\n      <data key=\"d6\">{:?}</data>\n    </edge>",
                escape(&graph.node_ids[src]),
                escape(&graph.node_ids[dst as usize]),
                weight
            )?;
        }
    }

    writeln!(out, "  </graph>")?;
    writeln!(out, "</graphml>")?;
    Ok(())
}

/// `<dir>/<prefix>_<YYYY-MM>.graphml`
pub fn month_graph_path(dir: &Path, prefix: &str, month: YearMonth) -> PathBuf {
    dir.join(format!("{}_{}.graphml", prefix, month))
}

/// Write every month of `report` as GraphML with SNP counts as edge weights.
///
/// Returns the written paths in month order.
pub fn export_month_graphs(
    report: &NetworkReport<'_>,
    metadata: &MetadataTable,
    label: LabelColumn,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    log::info!("Exporting {} monthly graphs to {}", report.months.len(), dir.display());
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create graph directory '{}'", dir.display()))?;

    let mut written = Vec::with_capacity(report.months.len());
    for month in &report.months {
        let graph = build_month_graph(&month.events, metadata, label, EdgeWeight::Snps);
        let path = month_graph_path(dir, prefix, month.month);

        let file = File::create(&path)
            .with_context(|| format!("Failed to create '{}'", path.display()))?;
        let mut out = BufWriter::new(file);
        write_graphml(&graph, &mut out)?;
        out.flush()?;

        log::debug!(
            "{}: wrote {} nodes and {} edges",
            month.month,
            graph.node_count,
            graph.edge_count()
        );
        written.push(path);
    }

    Ok(written)
}
