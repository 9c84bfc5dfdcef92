//! Consistency sampling and agreement reporting.

use rand::Rng;
use serde::Serialize;

use super::error::LabelError;
use super::label::Label;
use crate::table::{RowId, Value};

/// Default fraction of hand-labeled rows re-checked blind.
pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.3;

/// A row whose re-collected label differs from the recorded one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disagreement {
    pub row: RowId,
    pub original: String,
    pub relabeled: String,
}

/// Outcome of one blind re-labeling check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    /// Sampled rows whose new label matched the recorded label.
    pub agreement_count: usize,
    /// Number of rows re-labeled.
    pub sample_size: usize,
    /// `agreement_count / sample_size`, within `[0, 1]`.
    pub agreement_ratio: f64,
    /// Rows that did not agree.
    pub disagreements: Vec<Disagreement>,
}

impl ConsistencyReport {
    /// Compare re-collected labels with the recorded values at the same rows.
    ///
    /// `sample`, `recorded` and `relabeled` are positionally aligned.
    pub(crate) fn compare(
        sample: &[RowId],
        recorded: &[Value],
        relabeled: &[Label],
    ) -> Result<Self, LabelError> {
        if sample.is_empty() {
            return Err(LabelError::ZeroSampleSize {
                labeled: 0,
                fraction: 0.0,
            });
        }
        if recorded.len() != sample.len() || relabeled.len() != sample.len() {
            return Err(LabelError::LabelCountMismatch {
                rows: sample.len(),
                labels: relabeled.len(),
            });
        }
        let mut disagreements = Vec::new();
        for ((row, original), label) in sample.iter().zip(recorded).zip(relabeled) {
            if !label.agrees_with(original) {
                disagreements.push(Disagreement {
                    row: *row,
                    original: original.to_string(),
                    relabeled: label.to_string(),
                });
            }
        }
        let sample_size = sample.len();
        let agreement_count = sample_size - disagreements.len();
        Ok(Self {
            agreement_count,
            sample_size,
            agreement_ratio: agreement_count as f64 / sample_size as f64,
            disagreements,
        })
    }

    /// Whether every sampled row agreed.
    pub fn is_consistent(&self) -> bool {
        self.agreement_count == self.sample_size
    }
}

/// Validate a sample fraction, which must be finite and within `(0, 1]`.
pub fn validate_fraction(fraction: f64) -> Result<f64, LabelError> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(fraction)
    } else {
        Err(LabelError::InvalidSampleFraction(fraction))
    }
}

/// Number of rows checked for `labeled` rows at `fraction`, rounding half to even.
pub fn sample_size(labeled: usize, fraction: f64) -> Result<usize, LabelError> {
    let fraction = validate_fraction(fraction)?;
    let size = (fraction * labeled as f64).round_ties_even() as usize;
    if size == 0 {
        return Err(LabelError::ZeroSampleSize { labeled, fraction });
    }
    Ok(size.min(labeled))
}

/// Draw a uniform sample of `labeled` rows without replacement, returned in row order.
pub fn draw_sample<R: Rng + ?Sized>(
    rng: &mut R,
    labeled: &[RowId],
    fraction: f64,
) -> Result<Vec<RowId>, LabelError> {
    let amount = sample_size(labeled.len(), fraction)?;
    let mut sample: Vec<RowId> = rand::seq::index::sample(rng, labeled.len(), amount)
        .into_iter()
        .map(|idx| labeled[idx])
        .collect();
    sample.sort_unstable();
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sample_size_rounds_half_to_even() {
        assert_eq!(sample_size(10, 0.3).unwrap(), 3);
        assert_eq!(sample_size(5, 0.5).unwrap(), 2);
        assert_eq!(sample_size(7, 0.5).unwrap(), 4);
        assert_eq!(sample_size(4, 1.0).unwrap(), 4);
    }

    #[test]
    fn sample_size_zero_is_an_error() {
        assert!(matches!(
            sample_size(1, 0.3),
            Err(LabelError::ZeroSampleSize { labeled: 1, .. })
        ));
        assert!(matches!(
            sample_size(0, 1.0),
            Err(LabelError::ZeroSampleSize { labeled: 0, .. })
        ));
    }

    #[test]
    fn rejects_fractions_outside_unit_interval() {
        for fraction in [0.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                sample_size(10, fraction),
                Err(LabelError::InvalidSampleFraction(_))
            ));
        }
    }

    #[test]
    fn draws_distinct_rows_from_labeled_set() {
        let labeled: Vec<RowId> = (100..110).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = draw_sample(&mut rng, &labeled, 0.3).unwrap();
        assert_eq!(sample.len(), 3);
        assert!(sample.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(sample.iter().all(|row| labeled.contains(row)));
    }

    #[test]
    fn compare_counts_agreement_and_lists_disagreements() {
        let report = ConsistencyReport::compare(
            &[2, 5, 8],
            &[Value::Integer(1), Value::Integer(2), Value::Float(3.0)],
            &[Label::Integer(1), Label::Integer(4), Label::Integer(3)],
        )
        .unwrap();
        assert_eq!(report.agreement_count, 2);
        assert_eq!(report.sample_size, 3);
        assert!((report.agreement_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            report.disagreements,
            vec![Disagreement {
                row: 5,
                original: "2".into(),
                relabeled: "4".into(),
            }]
        );
        assert!(!report.is_consistent());
    }
}
