//! Domain errors raised by the classifier and the network aggregator

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenetError {
    /// A required input had no data rows
    #[error("input '{0}' contains no rows")]
    EmptyInput(String),

    /// None of the distance table identifiers appear in the metadata
    #[error("none of the {pairs} distance rows share a sample identifier with the metadata")]
    NoMetadataOverlap { pairs: usize },

    /// A required column is missing from a table header
    #[error("column '{column}' not found in '{path}'")]
    MissingColumn { column: String, path: String },

    /// The label column chosen for network edges does not exist
    #[error("label column '{0}' not found in labeled pairs")]
    MissingLabel(String),

    /// A row that cannot take part in date-dependent computations
    #[error("incomplete record {sample1}/{sample2}: {reason}")]
    IncompleteRecord {
        sample1: String,
        sample2: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
