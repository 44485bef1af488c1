//! Loader for headerless snp-dists pair tables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::tsv_reader;
use crate::error::TenetError;

/// One `sample1 \t sample2 \t snps` row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnpDistance {
    pub sample1: String,
    pub sample2: String,
    pub snps: u32,
}

impl SnpDistance {
    pub fn new(sample1: &str, sample2: &str, snps: u32) -> Self {
        Self {
            sample1: sample1.to_string(),
            sample2: sample2.to_string(),
            snps,
        }
    }
}

/// Load a SNP distance table from disk
pub fn load_snp_distances(path: &Path) -> Result<Vec<SnpDistance>> {
    log::info!("Reading SNP distances: {}", path.display());
    let file = File::open(path)
        .with_context(|| format!("Failed to open SNP distance file '{}'", path.display()))?;
    read_snp_distances(file, &path.display().to_string())
}

/// Read SNP distances from any reader; an empty table is an error
pub fn read_snp_distances<R: Read>(reader: R, source: &str) -> Result<Vec<SnpDistance>> {
    let mut reader = tsv_reader(reader, false);
    let mut distances = Vec::new();

    for (line_num, row) in reader.deserialize::<SnpDistance>().enumerate() {
        let row = row.with_context(|| {
            format!("Invalid SNP distance row at line {} of '{}'", line_num + 1, source)
        })?;
        distances.push(row);
    }

    if distances.is_empty() {
        return Err(TenetError::EmptyInput(source.to_string()).into());
    }

    log::info!("Loaded {} SNP distance rows", distances.len());
    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_distances() {
        let data = "A\tB\t5\nB\tA\t5\nA\tC\t120\n";
        let rows = read_snp_distances(data.as_bytes(), "test").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], SnpDistance::new("A", "B", 5));
        assert_eq!(rows[2].snps, 120);
    }

    #[test]
    fn test_empty_distances() {
        let err = read_snp_distances("".as_bytes(), "empty.tsv").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TenetError>(),
            Some(TenetError::EmptyInput(path)) if path == "empty.tsv"
        ));
    }

    #[test]
    fn test_non_numeric_snps_rejected() {
        assert!(read_snp_distances("A\tB\tmany\n".as_bytes(), "bad").is_err());
    }
}
