//! Labeled transmission pairs, the classifier output and aggregator input

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::tsv_reader;
use crate::error::TenetError;

/// Fixed leading columns of a labeled pair table
pub const FIXED_COLUMNS: [&str; 7] = [
    "sample1",
    "sample2",
    "transmission",
    "snps",
    "expected_snps",
    "CI",
    "date_diff",
];

/// A canonical sample pair with its transmission labels
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionEvent {
    pub sample1: String,
    pub sample2: String,
    /// Primary policy label
    pub transmission: bool,
    pub snps: u32,
    /// Days between both sampling dates, never negative
    pub date_diff: i64,
    pub expected_snps: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Secondary labels, aligned with `LabeledPairs::label_names`
    pub labels: Vec<bool>,
}

impl TransmissionEvent {
    /// The interval rendered as `lower-upper`
    pub fn ci_string(&self) -> String {
        format!("{:?}-{:?}", self.ci_lower, self.ci_upper)
    }
}

/// A label column selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColumn {
    Primary,
    Secondary(usize),
}

impl LabelColumn {
    pub fn value(&self, event: &TransmissionEvent) -> bool {
        match *self {
            LabelColumn::Primary => event.transmission,
            LabelColumn::Secondary(idx) => event.labels.get(idx).copied().unwrap_or(false),
        }
    }
}

/// A table of labeled pairs sharing one set of secondary label columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledPairs {
    pub label_names: Vec<String>,
    pub events: Vec<TransmissionEvent>,
}

impl LabeledPairs {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Header of the table as written to disk
    pub fn header(&self) -> Vec<&str> {
        FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.label_names.iter().map(String::as_str))
            .collect()
    }

    /// Look up a label column; `transmission` selects the primary label
    pub fn resolve_label(&self, name: &str) -> Result<LabelColumn, TenetError> {
        if name == "transmission" {
            return Ok(LabelColumn::Primary);
        }
        self.label_names
            .iter()
            .position(|n| n == name)
            .map(LabelColumn::Secondary)
            .ok_or_else(|| TenetError::MissingLabel(name.to_string()))
    }

    /// Load a labeled pair table from disk
    pub fn from_tsv(path: &Path) -> Result<Self> {
        log::info!("Reading labeled pairs: {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open labeled pairs '{}'", path.display()))?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Read labeled pairs; every column after the fixed ones is a label
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = tsv_reader(reader, true);
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of '{}'", source))?
            .clone();

        let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
        let mut fixed = [0usize; FIXED_COLUMNS.len()];
        for (slot, column) in fixed.iter_mut().zip(FIXED_COLUMNS) {
            *slot = *index.get(column).ok_or_else(|| TenetError::MissingColumn {
                column: column.to_string(),
                path: source.to_string(),
            })?;
        }

        let label_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !FIXED_COLUMNS.contains(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut pairs = LabeledPairs {
            label_names: label_columns.iter().map(|(_, name)| name.clone()).collect(),
            events: Vec::new(),
        };

        for (line_num, record) in reader.records().enumerate() {
            let line = line_num + 2;
            let record =
                record.with_context(|| format!("Failed to read line {} of '{}'", line, source))?;
            let field = |i: usize| record.get(i).unwrap_or("");

            let (ci_lower, ci_upper) = parse_interval(field(fixed[5]))
                .ok_or_else(|| anyhow!("Invalid CI '{}' at line {}", field(fixed[5]), line))?;

            let labels = label_columns
                .iter()
                .map(|(i, name)| {
                    parse_flag(field(*i))
                        .ok_or_else(|| anyhow!("Invalid {} value '{}' at line {}", name, field(*i), line))
                })
                .collect::<Result<Vec<bool>>>()?;

            pairs.events.push(TransmissionEvent {
                sample1: field(fixed[0]).to_string(),
                sample2: field(fixed[1]).to_string(),
                transmission: parse_flag(field(fixed[2]))
                    .ok_or_else(|| anyhow!("Invalid transmission value at line {}", line))?,
                snps: field(fixed[3])
                    .parse()
                    .with_context(|| format!("Invalid snps at line {}", line))?,
                expected_snps: field(fixed[4])
                    .parse()
                    .with_context(|| format!("Invalid expected_snps at line {}", line))?,
                ci_lower,
                ci_upper,
                date_diff: field(fixed[6])
                    .parse()
                    .with_context(|| format!("Invalid date_diff at line {}", line))?,
                labels,
            });
        }

        if pairs.is_empty() {
            return Err(TenetError::EmptyInput(source.to_string()).into());
        }

        log::info!(
            "Loaded {} labeled pairs with {} secondary labels",
            pairs.len(),
            pairs.label_names.len()
        );
        Ok(pairs)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "True" | "true" => Some(true),
        "0" | "False" | "false" => Some(false),
        _ => None,
    }
}

/// Split `lower-upper`, skipping the minus sign of an exponent
fn parse_interval(raw: &str) -> Option<(f64, f64)> {
    let bytes = raw.as_bytes();
    let split = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E'))?;
    let lower = raw[..split].parse().ok()?;
    let upper = raw[split + 1..].parse().ok()?;
    Some((lower, upper))
}
