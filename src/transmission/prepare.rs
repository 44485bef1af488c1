//! Join, clean and canonicalise SNP distance rows before labeling

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::config::DateConvention;
use crate::data::{MetadataTable, SnpDistance};
use crate::error::TenetError;

/// A cleaned, canonical pair ready for classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPair {
    pub sample1: String,
    pub sample2: String,
    pub snps: u32,
    pub date_diff: i64,
}

/// How many rows each cleaning step removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreparationStats {
    pub input_rows: usize,
    pub incomplete: usize,
    pub same_patient: usize,
    pub self_pairs: usize,
    pub duplicates: usize,
    pub retained: usize,
}

/// Attach both sampling dates and compute the absolute date difference
fn date_difference(
    row: &SnpDistance,
    metadata: &MetadataTable,
    convention: DateConvention,
) -> Result<i64, TenetError> {
    let incomplete = |reason: String| TenetError::IncompleteRecord {
        sample1: row.sample1.clone(),
        sample2: row.sample2.clone(),
        reason,
    };

    let date_of = |sample: &str| -> Result<NaiveDate, TenetError> {
        let raw = metadata
            .get(sample)
            .ok_or_else(|| incomplete(format!("{} has no metadata", sample)))?
            .sampling_date
            .as_deref()
            .ok_or_else(|| incomplete(format!("{} has no sampling date", sample)))?;
        convention
            .parse(raw)
            .ok_or_else(|| incomplete(format!("cannot parse date '{}' of {}", raw, sample)))
    };

    let date1 = date_of(&row.sample1)?;
    let date2 = date_of(&row.sample2)?;
    Ok((date2 - date1).num_days().abs())
}

fn same_patient(row: &SnpDistance, metadata: &MetadataTable) -> bool {
    let patient = |sample: &str| metadata.get(sample).and_then(|m| m.patient_id.as_deref());
    matches!(
        (patient(&row.sample1), patient(&row.sample2)),
        (Some(p1), Some(p2)) if p1 == p2
    )
}

/// Clean raw distance rows into canonical pairs.
///
/// Rows without two parseable dates are skipped, as are pairs from the same
/// patient (when the metadata carries patient ids), self pairs and repeated
/// unordered pairs. Emitted pairs have `sample1 < sample2`.
pub fn prepare_pairs(
    distances: &[SnpDistance],
    metadata: &MetadataTable,
    convention: DateConvention,
) -> Result<(Vec<PreparedPair>, PreparationStats)> {
    if distances.is_empty() {
        return Err(TenetError::EmptyInput("SNP distances".to_string()).into());
    }
    if !distances.iter().any(|row| metadata.contains(&row.sample1)) {
        return Err(TenetError::NoMetadataOverlap {
            pairs: distances.len(),
        }
        .into());
    }

    let mut stats = PreparationStats {
        input_rows: distances.len(),
        ..Default::default()
    };
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(distances.len());
    let mut pairs = Vec::with_capacity(distances.len());

    for row in distances {
        let date_diff = match date_difference(row, metadata, convention) {
            Ok(days) => days,
            Err(e) => {
                log::debug!("Skipping row: {}", e);
                stats.incomplete += 1;
                continue;
            }
        };

        if metadata.has_patient_ids && same_patient(row, metadata) {
            stats.same_patient += 1;
            continue;
        }

        if row.sample1 == row.sample2 {
            stats.self_pairs += 1;
            continue;
        }

        let (first, second) = if row.sample1 <= row.sample2 {
            (&row.sample1, &row.sample2)
        } else {
            (&row.sample2, &row.sample1)
        };
        if !seen.insert((first.clone(), second.clone())) {
            stats.duplicates += 1;
            continue;
        }

        pairs.push(PreparedPair {
            sample1: first.clone(),
            sample2: second.clone(),
            snps: row.snps,
            date_diff,
        });
    }

    stats.retained = pairs.len();
    log::info!(
        "Prepared {} pairs from {} rows ({} incomplete, {} same patient, {} self, {} duplicate)",
        stats.retained,
        stats.input_rows,
        stats.incomplete,
        stats.same_patient,
        stats.self_pairs,
        stats.duplicates
    );

    Ok((pairs, stats))
}
