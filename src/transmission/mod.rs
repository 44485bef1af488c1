//! Transmission classifier: SNP distances + sampling dates -> labeled pairs

pub mod policy;
pub mod prepare;

use anyhow::Result;

use crate::config::ClassifierConfig;
use crate::data::{LabeledPairs, MetadataTable, SnpDistance};

pub use policy::{Classifier, PrimaryPolicy, SecondaryLabel};
pub use prepare::{prepare_pairs, PreparationStats, PreparedPair};

/// Clean the distance rows and label every remaining pair
pub fn classify_distances(
    distances: &[SnpDistance],
    metadata: &MetadataTable,
    config: &ClassifierConfig,
) -> Result<(LabeledPairs, PreparationStats)> {
    let (pairs, stats) = prepare_pairs(distances, metadata, config.date_convention)?;
    let labeled = Classifier::new(config).classify_all(pairs);
    Ok((labeled, stats))
}
