//! Per-sample metadata loader

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::{non_missing, tsv_reader};
use crate::error::TenetError;

/// Raw metadata row as it appears in the TSV
#[derive(Debug, Deserialize)]
struct MetadataRow {
    sampleid: String,
    #[serde(default)]
    samplingdate: Option<String>,
    #[serde(default)]
    pat_id: Option<String>,
    #[serde(rename = "ST", default)]
    st: Option<String>,
    #[serde(default)]
    hospital_loc: Option<String>,
    #[serde(default)]
    collection: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    resistance_score: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    virulence_score: Option<f64>,
    #[serde(default)]
    isolation_source_categ: Option<String>,
}

/// Metadata of a single sample, validated at load time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleMetadata {
    pub sample_id: String,
    /// Raw sampling date; parsed with the configured convention where needed
    pub sampling_date: Option<String>,
    pub patient_id: Option<String>,
    pub sequence_type: Option<String>,
    pub location: Option<String>,
    pub collection: Option<String>,
    pub resistance_score: Option<f64>,
    pub virulence_score: Option<f64>,
    pub isolation_source: Option<String>,
}

/// Collection implied by a hospital location, overriding the column value
pub fn collection_for_location(location: &str) -> Option<&'static str> {
    match location {
        "Germany" => Some("MHH"),
        "Denmark" => Some("CPH"),
        _ => None,
    }
}

impl From<MetadataRow> for SampleMetadata {
    fn from(row: MetadataRow) -> Self {
        let location = non_missing(row.hospital_loc);
        let collection = location
            .as_deref()
            .and_then(collection_for_location)
            .map(str::to_string)
            .or_else(|| non_missing(row.collection));

        Self {
            sample_id: row.sampleid,
            sampling_date: non_missing(row.samplingdate),
            patient_id: non_missing(row.pat_id),
            sequence_type: non_missing(row.st),
            location,
            collection,
            resistance_score: row.resistance_score,
            virulence_score: row.virulence_score,
            isolation_source: non_missing(row.isolation_source_categ),
        }
    }
}

/// Metadata keyed by sample identifier
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    samples: HashMap<String, SampleMetadata>,

    /// Whether the table carried a `pat_id` column
    pub has_patient_ids: bool,

    /// Rows dropped because their identifier was already present
    pub duplicates: usize,
}

impl MetadataTable {
    /// Load a metadata TSV from disk
    pub fn from_tsv(path: &Path) -> Result<Self> {
        log::info!("Reading metadata: {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open metadata file '{}'", path.display()))?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Load metadata from any reader; `source` names the input in errors
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = tsv_reader(reader, true);
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of '{}'", source))?
            .clone();

        for required in ["sampleid", "samplingdate"] {
            if !headers.iter().any(|h| h == required) {
                return Err(TenetError::MissingColumn {
                    column: required.to_string(),
                    path: source.to_string(),
                }
                .into());
            }
        }

        let mut table = Self {
            has_patient_ids: headers.iter().any(|h| h == "pat_id"),
            ..Default::default()
        };

        for (line_num, row) in reader.deserialize::<MetadataRow>().enumerate() {
            let row = row.with_context(|| {
                format!("Invalid metadata row at line {} of '{}'", line_num + 2, source)
            })?;
            table.insert(row.into());
        }

        if table.is_empty() {
            return Err(TenetError::EmptyInput(source.to_string()).into());
        }

        if table.duplicates > 0 {
            log::warn!(
                "Ignored {} duplicated sample identifiers in '{}'",
                table.duplicates,
                source
            );
        }
        log::info!("Loaded metadata for {} samples", table.len());

        Ok(table)
    }

    /// Insert a sample; the first record of an identifier wins
    pub fn insert(&mut self, sample: SampleMetadata) {
        if self.samples.contains_key(&sample.sample_id) {
            self.duplicates += 1;
            return;
        }
        self.samples.insert(sample.sample_id.clone(), sample);
    }

    pub fn get(&self, sample_id: &str) -> Option<&SampleMetadata> {
        self.samples.get(sample_id)
    }

    pub fn contains(&self, sample_id: &str) -> bool {
        self.samples.contains_key(sample_id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl FromIterator<SampleMetadata> for MetadataTable {
    fn from_iter<I: IntoIterator<Item = SampleMetadata>>(iter: I) -> Self {
        let mut table = Self::default();
        for sample in iter {
            table.insert(sample);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "sampleid\tsamplingdate\tpat_id\tST\thospital_loc\tcollection\tresistance_score\tvirulence_score\tisolation_source_categ\n\
        S1\t2021-01-05\tP1\tST307\tGermany\t\t2\t1\tblood\n\
        S2\t2021-01-20\t\tST147\tDenmark\tSRA\tNA\t3\turine\n\
        S3\t\tP3\tST307\tItaly\tSRA\t1.5\t\t\n\
        S1\t2022-01-01\tP9\tST1\tItaly\tSRA\t0\t0\tother\n";

    #[test]
    fn test_load_full_metadata() {
        let table = MetadataTable::from_reader(FULL.as_bytes(), "test").unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.has_patient_ids);
        assert_eq!(table.duplicates, 1);

        let s1 = table.get("S1").unwrap();
        assert_eq!(s1.sampling_date.as_deref(), Some("2021-01-05"));
        assert_eq!(s1.patient_id.as_deref(), Some("P1"));
        assert_eq!(s1.collection.as_deref(), Some("MHH"));
        assert_eq!(s1.resistance_score, Some(2.0));

        let s2 = table.get("S2").unwrap();
        assert_eq!(s2.patient_id, None);
        assert_eq!(s2.collection.as_deref(), Some("CPH"));
        assert_eq!(s2.resistance_score, None);

        let s3 = table.get("S3").unwrap();
        assert_eq!(s3.sampling_date, None);
        assert_eq!(s3.collection.as_deref(), Some("SRA"));
        assert_eq!(s3.isolation_source, None);
    }

    #[test]
    fn test_minimal_metadata_has_no_patient_ids() {
        let data = "sampleid\tsamplingdate\nA\t2020-01-01\n";
        let table = MetadataTable::from_reader(data.as_bytes(), "minimal").unwrap();
        assert!(!table.has_patient_ids);
        assert_eq!(table.get("A").unwrap().sequence_type, None);
    }

    #[test]
    fn test_missing_required_column() {
        let data = "sampleid\tdate\nA\t2020-01-01\n";
        let err = MetadataTable::from_reader(data.as_bytes(), "bad").unwrap_err();
        match err.downcast_ref::<TenetError>() {
            Some(TenetError::MissingColumn { column, .. }) => assert_eq!(column, "samplingdate"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_metadata_is_an_error() {
        let data = "sampleid\tsamplingdate\n";
        let err = MetadataTable::from_reader(data.as_bytes(), "empty").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TenetError>(),
            Some(TenetError::EmptyInput(_))
        ));
    }
}
