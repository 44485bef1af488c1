//! Tabular inputs: sample metadata, SNP distances and labeled pairs

pub mod distances;
pub mod merge;
pub mod metadata;
pub mod pairs;

pub use distances::SnpDistance;
pub use metadata::{MetadataTable, SampleMetadata};
pub use pairs::{LabelColumn, LabeledPairs, TransmissionEvent};

/// Tab-separated reader shared by every loader
pub(crate) fn tsv_reader<R: std::io::Read>(reader: R, has_headers: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader)
}

/// Pandas-style missing markers count as absent values
pub(crate) fn non_missing(value: Option<String>) -> Option<String> {
    value.filter(|v| !matches!(v.as_str(), "" | "NA" | "NaN" | "nan" | "None"))
}
