//! Configuration management for the transmission network analyzer

use anyhow::{Context, Result};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::TenetError;

/// How sampling dates are written in the metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DateConvention {
    /// `2021-03-14`
    Iso,
    /// `14.03.2021`
    DayFirst,
}

impl DateConvention {
    pub fn format(&self) -> &'static str {
        match self {
            DateConvention::Iso => "%Y-%m-%d",
            DateConvention::DayFirst => "%d.%m.%Y",
        }
    }

    /// Parse a raw date cell, `None` when empty or malformed
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, self.format()).ok()
    }
}

/// Which value an edge of the monthly graph carries as its weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeWeight {
    /// The binary label value (always 1 on an existing edge)
    Label,
    /// The raw SNP count of the pair
    Snps,
}

/// A combined SNP ceiling and date window label (`te_{snps}_{days}d`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowThreshold {
    pub snps: u32,
    pub days: i64,
}

/// Parameters of the transmission classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// SNPs accumulated per day
    pub snps_per_day: f64,

    /// Pairs below this SNP count are transmissions regardless of timing
    pub min_snps: u32,

    /// Half-width of the interval around the expected SNP count, as a fraction
    pub ci_half_width: f64,

    pub date_convention: DateConvention,

    /// Ceilings for `transmission_{N}SNP` labels (strict)
    pub snp_thresholds: Vec<u32>,

    /// Windows for `transmission_{D}d` labels (strict, primary label required)
    pub day_thresholds: Vec<i64>,

    /// Ceilings for `te_{N}_{D}d` labels (inclusive)
    pub window_thresholds: Vec<WindowThreshold>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let window_thresholds = [5, 10, 30, 50, 100]
            .into_iter()
            .cartesian_product([30, 60])
            .map(|(snps, days)| WindowThreshold { snps, days })
            .collect();

        Self {
            snps_per_day: 0.05,
            min_snps: 5,
            ci_half_width: 0.05,
            date_convention: DateConvention::Iso,
            snp_thresholds: vec![10, 20, 30, 100],
            day_thresholds: vec![90, 180, 270, 365],
            window_thresholds,
        }
    }
}

/// Parameters of the monthly network aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Label column whose positive rows become edges
    pub label: String,

    pub edge_weight: EdgeWeight,

    pub date_convention: DateConvention,

    /// Write one GraphML file per month next to the summary table
    pub export_graphs: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            label: "te_10_60d".to_string(),
            edge_weight: EdgeWeight::Label,
            date_convention: DateConvention::Iso,
            export_graphs: false,
        }
    }
}

/// Top-level configuration, optionally loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub network: NetworkConfig,
}

impl Config {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TenetError> {
        let c = &self.classifier;
        if !c.snps_per_day.is_finite() || c.snps_per_day < 0.0 {
            return Err(TenetError::InvalidConfig(format!(
                "snps_per_day must be a non-negative number, got {}",
                c.snps_per_day
            )));
        }
        if !(0.0..=1.0).contains(&c.ci_half_width) {
            return Err(TenetError::InvalidConfig(format!(
                "ci_half_width must lie in [0, 1], got {}",
                c.ci_half_width
            )));
        }
        if self.network.label.trim().is_empty() {
            return Err(TenetError::InvalidConfig("network label must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows_cover_all_combinations() {
        let config = ClassifierConfig::default();
        assert_eq!(config.window_thresholds.len(), 10);
        assert!(config
            .window_thresholds
            .contains(&WindowThreshold { snps: 10, days: 60 }));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [classifier]
            min_snps = 3
            ci_half_width = 0.9
            date_convention = "day-first"

            [network]
            edge_weight = "snps"
            "#,
        )
        .unwrap();

        assert_eq!(config.classifier.min_snps, 3);
        assert_eq!(config.classifier.ci_half_width, 0.9);
        assert_eq!(config.classifier.snps_per_day, 0.05);
        assert_eq!(config.classifier.date_convention, DateConvention::DayFirst);
        assert_eq!(config.network.edge_weight, EdgeWeight::Snps);
        assert_eq!(config.network.label, "te_10_60d");
    }

    #[test]
    fn test_validation_rejects_bad_half_width() {
        let mut config = Config::default();
        config.classifier.ci_half_width = 1.5;
        assert!(config.validate().is_err());

        config.classifier.ci_half_width = 0.9;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_date_conventions() {
        let iso = DateConvention::Iso;
        let day_first = DateConvention::DayFirst;

        assert_eq!(
            iso.parse("2021-03-14"),
            NaiveDate::from_ymd_opt(2021, 3, 14)
        );
        assert_eq!(iso.parse("14.03.2021"), None);
        assert_eq!(
            day_first.parse("14.03.2021"),
            NaiveDate::from_ymd_opt(2021, 3, 14)
        );
        assert_eq!(day_first.parse(""), None);
    }
}
