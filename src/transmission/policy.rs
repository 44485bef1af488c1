//! Transmission labeling policies

use crate::config::{ClassifierConfig, WindowThreshold};
use crate::data::{LabeledPairs, TransmissionEvent};
use crate::transmission::PreparedPair;

/// Molecular-clock policy producing the primary `transmission` label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryPolicy {
    pub snps_per_day: f64,
    pub min_snps: u32,
    pub ci_half_width: f64,
}

impl PrimaryPolicy {
    pub fn expected_snps(&self, date_diff: i64) -> f64 {
        date_diff as f64 * self.snps_per_day
    }

    /// Interval around the expected SNP count
    pub fn interval(&self, expected: f64) -> (f64, f64) {
        (
            expected * (1.0 - self.ci_half_width),
            expected * (1.0 + self.ci_half_width),
        )
    }

    /// A pair is a transmission when it carries no more SNPs than expected,
    /// falls within the interval, or sits below the noise floor
    pub fn is_transmission(&self, snps: u32, date_diff: i64) -> bool {
        let observed = snps as f64;
        let expected = self.expected_snps(date_diff);
        let (lower, upper) = self.interval(expected);

        observed <= expected || (observed >= lower && observed <= upper) || snps < self.min_snps
    }
}

impl From<&ClassifierConfig> for PrimaryPolicy {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            snps_per_day: config.snps_per_day,
            min_snps: config.min_snps,
            ci_half_width: config.ci_half_width,
        }
    }
}

/// Fixed-threshold labels computed next to the primary one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryLabel {
    /// `snps < N`
    SnpCeiling(u32),
    /// Primary label and `date_diff < D`
    DayWindow(i64),
    /// `snps <= N` and `date_diff <= D`
    Window(WindowThreshold),
}

impl SecondaryLabel {
    pub fn column_name(&self) -> String {
        match self {
            SecondaryLabel::SnpCeiling(n) => format!("transmission_{}SNP", n),
            SecondaryLabel::DayWindow(d) => format!("transmission_{}d", d),
            SecondaryLabel::Window(w) => format!("te_{}_{}d", w.snps, w.days),
        }
    }

    pub fn evaluate(&self, snps: u32, date_diff: i64, primary: bool) -> bool {
        match *self {
            SecondaryLabel::SnpCeiling(n) => snps < n,
            SecondaryLabel::DayWindow(d) => primary && date_diff < d,
            SecondaryLabel::Window(w) => snps <= w.snps && date_diff <= w.days,
        }
    }
}

/// Applies the primary and every configured secondary policy to each pair
#[derive(Debug, Clone)]
pub struct Classifier {
    primary: PrimaryPolicy,
    secondary: Vec<SecondaryLabel>,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let secondary = config
            .snp_thresholds
            .iter()
            .map(|&n| SecondaryLabel::SnpCeiling(n))
            .chain(config.day_thresholds.iter().map(|&d| SecondaryLabel::DayWindow(d)))
            .chain(config.window_thresholds.iter().map(|&w| SecondaryLabel::Window(w)))
            .collect();

        Self {
            primary: PrimaryPolicy::from(config),
            secondary,
        }
    }

    pub fn label_names(&self) -> Vec<String> {
        self.secondary.iter().map(SecondaryLabel::column_name).collect()
    }

    pub fn classify(&self, pair: PreparedPair) -> TransmissionEvent {
        let expected_snps = self.primary.expected_snps(pair.date_diff);
        let (ci_lower, ci_upper) = self.primary.interval(expected_snps);
        let transmission = self.primary.is_transmission(pair.snps, pair.date_diff);

        let labels = self
            .secondary
            .iter()
            .map(|label| label.evaluate(pair.snps, pair.date_diff, transmission))
            .collect();

        TransmissionEvent {
            sample1: pair.sample1,
            sample2: pair.sample2,
            transmission,
            snps: pair.snps,
            date_diff: pair.date_diff,
            expected_snps,
            ci_lower,
            ci_upper,
            labels,
        }
    }

    pub fn classify_all(&self, pairs: Vec<PreparedPair>) -> LabeledPairs {
        let events: Vec<TransmissionEvent> =
            pairs.into_iter().map(|pair| self.classify(pair)).collect();

        let positives = events.iter().filter(|e| e.transmission).count();
        log::info!(
            "Labeled {} pairs, {} transmission events under the primary policy",
            events.len(),
            positives
        );

        LabeledPairs {
            label_names: self.label_names(),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(min_snps: u32) -> PrimaryPolicy {
        PrimaryPolicy {
            snps_per_day: 0.05,
            min_snps,
            ci_half_width: 0.05,
        }
    }

    fn pair(snps: u32, date_diff: i64) -> PreparedPair {
        PreparedPair {
            sample1: "A".into(),
            sample2: "B".into(),
            snps,
            date_diff,
        }
    }

    #[test]
    fn test_noise_floor_boundary() {
        // 10 days at 0.05 SNPs/day -> 0.5 expected, interval 0.475-0.525
        let p = policy(5);
        assert_eq!(p.expected_snps(10), 0.5);
        assert!(!p.is_transmission(5, 10));
        assert!(p.is_transmission(4, 10));
        assert!(policy(6).is_transmission(5, 10));
    }

    #[test]
    fn test_expected_and_interval() {
        let p = policy(0);
        // 200 days -> 10 expected, interval 9.5-10.5
        assert!(p.is_transmission(10, 200));
        assert!(p.is_transmission(9, 200));
        assert!(!p.is_transmission(11, 200));

        let wide = PrimaryPolicy {
            ci_half_width: 0.9,
            ..p
        };
        assert!(wide.is_transmission(18, 200));
        assert!(!wide.is_transmission(20, 200));
    }

    #[test]
    fn test_same_day_pairs() {
        let p = policy(5);
        assert!(p.is_transmission(0, 0));
        assert!(!p.is_transmission(5, 0));
    }

    #[test]
    fn test_secondary_labels() {
        let w = WindowThreshold { snps: 10, days: 60 };
        assert_eq!(SecondaryLabel::Window(w).column_name(), "te_10_60d");
        assert_eq!(SecondaryLabel::SnpCeiling(10).column_name(), "transmission_10SNP");
        assert_eq!(SecondaryLabel::DayWindow(90).column_name(), "transmission_90d");

        assert!(SecondaryLabel::Window(w).evaluate(10, 60, false));
        assert!(!SecondaryLabel::Window(w).evaluate(11, 60, true));
        assert!(!SecondaryLabel::Window(w).evaluate(10, 61, true));
        assert!(!SecondaryLabel::SnpCeiling(10).evaluate(10, 0, true));
        assert!(SecondaryLabel::DayWindow(90).evaluate(3, 89, true));
        assert!(!SecondaryLabel::DayWindow(90).evaluate(3, 89, false));
    }

    #[test]
    fn test_labels_monotonic_in_ceiling() {
        for date_diff in [0, 30, 45, 60, 61, 400] {
            for snps in 0..120 {
                let mut previous = false;
                for ceiling in [5, 10, 30, 50, 100] {
                    let w = WindowThreshold {
                        snps: ceiling,
                        days: 60,
                    };
                    let current = SecondaryLabel::Window(w).evaluate(snps, date_diff, false);
                    assert!(!previous || current);
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn test_classify_uses_configured_columns() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let names = classifier.label_names();
        assert_eq!(names.len(), 4 + 4 + 10);
        assert_eq!(names[0], "transmission_10SNP");
        assert_eq!(names[4], "transmission_90d");
        assert!(names.contains(&"te_10_60d".to_string()));

        let event = classifier.classify(pair(3, 10));
        assert!(event.transmission);
        assert_eq!(event.labels.len(), names.len());
        assert_eq!(event.ci_string(), "0.475-0.525");

        let idx = names.iter().position(|n| n == "te_10_60d").unwrap();
        assert!(event.labels[idx]);
    }
}
