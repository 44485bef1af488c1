//! Results persistence module

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data::LabeledPairs;
use crate::network::{AggregationStats, CentralityKind, CentralitySummary, NetworkReport};
use crate::transmission::PreparationStats;

pub const LABELED_PAIRS_SUFFIX: &str = "_te.tsv";
pub const NETWORK_SUFFIX: &str = "_network_p.tsv";
pub const MONTH_COUNTS_SUFFIX: &str = "_month_counts.tsv";
pub const SUMMARY_SUFFIX: &str = "_summary.json";

/// `<dir>/<stem><suffix>` next to `input`
pub fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, suffix))
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(file))
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Write the classifier table: fixed columns, then every secondary label
pub fn write_labeled_pairs(pairs: &LabeledPairs, path: &Path) -> Result<()> {
    log::info!("Writing {} labeled pairs to {}", pairs.len(), path.display());

    let mut writer = tsv_writer(path)?;
    writer.write_record(pairs.header())?;

    for event in &pairs.events {
        let mut row = vec![
            event.sample1.clone(),
            event.sample2.clone(),
            flag(event.transmission).to_string(),
            event.snps.to_string(),
            format!("{:?}", event.expected_snps),
            event.ci_string(),
            event.date_diff.to_string(),
        ];
        row.extend(event.labels.iter().map(|&l| flag(l).to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write one row per month with the six averaged centralities
pub fn write_network_summary<'a, I>(summaries: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a CentralitySummary>,
{
    let mut writer = tsv_writer(path)?;
    let header: Vec<&str> = std::iter::once("month")
        .chain(CentralityKind::ALL.iter().map(|k| k.column_name()))
        .collect();
    writer.write_record(&header)?;

    let mut rows = 0;
    for summary in summaries {
        let mut row = vec![summary.month.to_string()];
        row.extend(summary.values.iter().map(|v| format!("{:?}", v)));
        writer.write_record(&row)?;
        rows += 1;
    }

    writer.flush()?;
    log::info!("Wrote {} monthly summaries to {}", rows, path.display());
    Ok(())
}

/// Pairs, nodes and edges of one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub pairs: usize,
    pub nodes: usize,
    pub edges: usize,
}

pub fn month_counts(report: &NetworkReport<'_>) -> Vec<MonthCount> {
    report
        .months
        .iter()
        .map(|m| MonthCount {
            month: m.month.to_string(),
            pairs: m.events.len(),
            nodes: m.graph.node_count,
            edges: m.graph.edge_count(),
        })
        .collect()
}

pub fn write_month_counts(counts: &[MonthCount], path: &Path) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    for count in counts {
        writer.serialize(count)?;
    }
    writer.flush()?;
    log::debug!("Wrote month counts to {}", path.display());
    Ok(())
}

/// Inputs, outputs and row counts of a `classify` run
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRunSummary {
    pub snp_dists: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
    pub preparation: PreparationStats,
    pub positive_pairs: usize,
    pub labels: Vec<String>,
}

/// Inputs, outputs and row counts of a `network` run
#[derive(Debug, Clone, Serialize)]
pub struct NetworkRunSummary {
    pub labeled_pairs: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
    pub label: String,
    pub aggregation: AggregationStats,
    pub months: Vec<MonthCount>,
    pub graphs: Vec<PathBuf>,
}

pub fn write_run_summary<T: Serialize>(summary: &T, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    file.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;
    log::info!("Run summary saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransmissionEvent;
    use crate::network::YearMonth;

    #[test]
    fn test_derived_path() {
        let path = derived_path(Path::new("out/cluster1/snp-dists.tsv"), LABELED_PAIRS_SUFFIX);
        assert_eq!(path, PathBuf::from("out/cluster1/snp-dists_te.tsv"));

        let network = derived_path(&path, NETWORK_SUFFIX);
        assert_eq!(network, PathBuf::from("out/cluster1/snp-dists_te_network_p.tsv"));
    }

    #[test]
    fn test_write_labeled_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs_te.tsv");
        let pairs = LabeledPairs {
            label_names: vec!["transmission_10SNP".into()],
            events: vec![TransmissionEvent {
                sample1: "A".into(),
                sample2: "B".into(),
                transmission: true,
                snps: 3,
                date_diff: 10,
                expected_snps: 0.5,
                ci_lower: 0.475,
                ci_upper: 0.525,
                labels: vec![true],
            }],
        };

        write_labeled_pairs(&pairs, &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "sample1\tsample2\ttransmission\tsnps\texpected_snps\tCI\tdate_diff\ttransmission_10SNP\n\
             A\tB\t1\t3\t0.5\t0.475-0.525\t10\t1\n"
        );

        let reread = LabeledPairs::from_tsv(&path).unwrap();
        assert_eq!(reread, pairs);
    }

    #[test]
    fn test_write_network_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.tsv");
        let summary = CentralitySummary {
            month: YearMonth::new(2021, 3),
            node_count: 2,
            edge_count: 1,
            component_count: 1,
            values: [1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        };

        write_network_summary([&summary], &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0].split('\t').count(), 7);
        assert_eq!(lines[1], "2021-03\t1.0\t1.0\t0.0\t0.0\t0.0\t1.0");
    }

    #[test]
    fn test_write_month_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.tsv");
        let counts = vec![MonthCount {
            month: "2021-01".into(),
            pairs: 4,
            nodes: 5,
            edges: 2,
        }];

        write_month_counts(&counts, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "month\tpairs\tnodes\tedges\n2021-01\t4\t5\t2\n"
        );
    }
}
