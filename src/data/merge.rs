//! Concatenation of per-cluster tables into one workflow-wide table

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TenetError;

/// Concatenate `inputs` into `output`.
///
/// With `has_header` the first file's header is kept and every other
/// file's first line is skipped. Returns the number of data lines written.
pub fn merge_tables(inputs: &[PathBuf], output: &Path, has_header: bool) -> Result<usize> {
    if inputs.is_empty() {
        return Err(TenetError::EmptyInput("merge inputs".to_string()).into());
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create '{}'", output.display()))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;

    for (file_idx, path) in inputs.iter().enumerate() {
        let file =
            File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;

        for (line_idx, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.with_context(|| format!("Failed to read '{}'", path.display()))?;

            if has_header && line_idx == 0 {
                if file_idx == 0 {
                    writeln!(writer, "{}", line)?;
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            writeln!(writer, "{}", line)?;
            written += 1;
        }
        log::debug!("Merged {}", path.display());
    }

    writer.flush()?;
    log::info!(
        "Merged {} files ({} rows) into {}",
        inputs.len(),
        written,
        output.display()
    );
    Ok(written)
}

/// Every `<dir>/<cluster>/<file_name>` that exists, sorted by path
pub fn find_cluster_tables(dir: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    let mut tables = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to list cluster directory '{}'", dir.display()))?
    {
        let cluster_dir = entry?.path();
        let candidate = cluster_dir.join(file_name);
        if cluster_dir.is_dir() && candidate.is_file() {
            tables.push(candidate);
        }
    }
    tables.sort();

    log::info!(
        "Found {} '{}' tables under {}",
        tables.len(),
        file_name,
        dir.display()
    );
    Ok(tables)
}
