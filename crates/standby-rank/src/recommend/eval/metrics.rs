use serde::{Deserialize, Serialize};

/// Reasons a metric cannot be computed over the given labels and predictions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("got {labels} labels but {predictions} predictions")]
    LengthMismatch { labels: usize, predictions: usize },
    #[error("at least one labelled example is required")]
    Empty,
    #[error("calibration needs at least one bin")]
    ZeroBins,
    #[error("decision threshold must lie within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Threshold-based classification quality. Undefined ratios are reported as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// One bucket of a calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub mean_predicted: f64,
    pub mean_actual: f64,
    pub count: usize,
}

/// Summary metrics for a set of probability predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub brier_score: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mean_prediction: f64,
    pub mean_label: f64,
    pub num_examples: usize,
}

impl EvalMetrics {
    pub fn compute(
        labels: &[bool],
        predictions: &[f64],
        threshold: f64,
    ) -> Result<Self, EvalError> {
        let brier_score = brier_score(labels, predictions)?;
        let accuracy = accuracy(labels, predictions, threshold)?;
        let Classification {
            precision,
            recall,
            f1,
        } = precision_recall_f1(labels, predictions, threshold)?;
        let count = labels.len() as f64;

        Ok(Self {
            brier_score,
            accuracy,
            precision,
            recall,
            f1,
            mean_prediction: predictions.iter().sum::<f64>() / count,
            mean_label: labels.iter().filter(|&&label| label).count() as f64 / count,
            num_examples: labels.len(),
        })
    }
}

fn check_inputs(labels: &[bool], predictions: &[f64]) -> Result<(), EvalError> {
    if labels.len() != predictions.len() {
        return Err(EvalError::LengthMismatch {
            labels: labels.len(),
            predictions: predictions.len(),
        });
    }
    if labels.is_empty() {
        return Err(EvalError::Empty);
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> Result<(), EvalError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EvalError::InvalidThreshold(threshold));
    }
    Ok(())
}

fn outcome(label: bool) -> f64 {
    if label {
        1.0
    } else {
        0.0
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Mean squared error between predicted probabilities and 0/1 outcomes. Lower is better.
pub fn brier_score(labels: &[bool], predictions: &[f64]) -> Result<f64, EvalError> {
    check_inputs(labels, predictions)?;
    let total: f64 = labels
        .iter()
        .zip(predictions)
        .map(|(&label, &p)| (outcome(label) - p).powi(2))
        .sum();
    Ok(total / labels.len() as f64)
}

/// Share of examples where `p >= threshold` agrees with the label.
pub fn accuracy(labels: &[bool], predictions: &[f64], threshold: f64) -> Result<f64, EvalError> {
    check_inputs(labels, predictions)?;
    check_threshold(threshold)?;
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|&(&label, &p)| (p >= threshold) == label)
        .count();
    Ok(ratio(correct, labels.len()))
}

pub fn precision_recall_f1(
    labels: &[bool],
    predictions: &[f64],
    threshold: f64,
) -> Result<Classification, EvalError> {
    check_inputs(labels, predictions)?;
    check_threshold(threshold)?;

    let (mut true_positives, mut false_positives, mut false_negatives) = (0, 0, 0);
    for (&label, &p) in labels.iter().zip(predictions) {
        match (label, p >= threshold) {
            (true, true) => true_positives += 1,
            (false, true) => false_positives += 1,
            (true, false) => false_negatives += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(true_positives, true_positives + false_positives);
    let recall = ratio(true_positives, true_positives + false_negatives);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Ok(Classification {
        precision,
        recall,
        f1,
    })
}

/// Equal-count bins over the examples sorted by prediction. The last bin absorbs the
/// remainder and empty bins are skipped.
pub fn calibration_curve(
    labels: &[bool],
    predictions: &[f64],
    bins: usize,
) -> Result<Vec<CalibrationBin>, EvalError> {
    check_inputs(labels, predictions)?;
    if bins == 0 {
        return Err(EvalError::ZeroBins);
    }

    let mut pairs: Vec<(f64, bool)> = predictions
        .iter()
        .copied()
        .zip(labels.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let bin_size = pairs.len() / bins;
    let curve = (0..bins)
        .filter_map(|index| {
            let start = index * bin_size;
            let end = if index + 1 < bins {
                start + bin_size
            } else {
                pairs.len()
            };
            let members = &pairs[start..end];
            if members.is_empty() {
                return None;
            }

            let count = members.len();
            let predicted: f64 = members.iter().map(|(p, _)| p).sum();
            let cleared = members.iter().filter(|(_, label)| *label).count();
            Some(CalibrationBin {
                mean_predicted: predicted / count as f64,
                mean_actual: ratio(cleared, count),
                count,
            })
        })
        .collect();

    Ok(curve)
}
