//! Offline evaluation of the baseline heuristic against labelled standby outcomes.

mod dataset;
mod metrics;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::probability::baseline_return_probability;

pub use dataset::{generate_dataset, EvalExample, Scenario};
pub use metrics::{
    accuracy, brier_score, calibration_curve, precision_recall_f1, CalibrationBin,
    Classification, EvalError, EvalMetrics,
};

pub const DEFAULT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CALIBRATION_BINS: usize = 5;

/// Overall, per-scenario and calibration results of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub threshold: f64,
    pub overall: EvalMetrics,
    pub by_scenario: BTreeMap<Scenario, EvalMetrics>,
    pub calibration: Vec<CalibrationBin>,
}

/// Baseline estimate for one labelled example.
pub fn baseline_prediction(example: &EvalExample) -> f64 {
    baseline_return_probability(
        example.seats_required,
        Some(example.capacity),
        Some(example.hours_to_departure),
    )
}

fn labelled_predictions<'a, I>(examples: I) -> (Vec<bool>, Vec<f64>)
where
    I: IntoIterator<Item = &'a EvalExample>,
{
    examples
        .into_iter()
        .map(|example| (example.cleared, baseline_prediction(example)))
        .unzip()
}

pub fn evaluate_baseline(
    examples: &[EvalExample],
    threshold: f64,
    bins: usize,
) -> Result<EvaluationReport, EvalError> {
    let (labels, predictions) = labelled_predictions(examples);
    let overall = EvalMetrics::compute(&labels, &predictions, threshold)?;
    let calibration = calibration_curve(&labels, &predictions, bins)?;

    let mut by_scenario = BTreeMap::new();
    for scenario in Scenario::ALL {
        let (labels, predictions) = labelled_predictions(
            examples
                .iter()
                .filter(|example| example.scenario == scenario),
        );
        if labels.is_empty() {
            continue;
        }
        let metrics = EvalMetrics::compute(&labels, &predictions, threshold)?;
        by_scenario.insert(scenario, metrics);
    }

    info!(
        examples = overall.num_examples,
        brier_score = overall.brier_score,
        accuracy = overall.accuracy,
        f1 = overall.f1,
        "baseline evaluation complete"
    );

    Ok(EvaluationReport {
        threshold,
        overall,
        by_scenario,
        calibration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(scenario: Scenario, seats_required: u32, cleared: bool) -> EvalExample {
        EvalExample {
            example_id: format!("{}-{seats_required}", scenario.label()),
            scenario,
            seats_required,
            capacity: 150,
            hours_to_departure: 6.0,
            cleared,
        }
    }

    #[test]
    fn predictions_come_from_the_baseline_heuristic() {
        // 0.5 - 0.05 + 0.1 (large aircraft) + 0.1 (early) = 0.65
        let prediction = baseline_prediction(&example(Scenario::Easy, 1, true));
        assert!((prediction - 0.65).abs() < 1e-12);
    }

    #[test]
    fn hand_built_examples_score_as_expected() {
        let examples = [
            example(Scenario::Easy, 1, true),
            example(Scenario::Easy, 1, false),
            example(Scenario::Hard, 7, false),
        ];

        let report = evaluate_baseline(&examples, 0.5, 2).expect("evaluates");

        // Predictions are 0.65, 0.65 and 0.5 - 0.35 + 0.2 = 0.35.
        let expected_brier = (0.35_f64.powi(2) + 0.65_f64.powi(2) + 0.35_f64.powi(2)) / 3.0;
        assert!((report.overall.brier_score - expected_brier).abs() < 1e-9);
        assert!((report.overall.accuracy - 2.0 / 3.0).abs() < 1e-9);
        assert!((report.overall.precision - 0.5).abs() < 1e-9);
        assert!((report.overall.recall - 1.0).abs() < 1e-9);
        assert_eq!(report.overall.num_examples, 3);
        assert_eq!(
            report.by_scenario.keys().copied().collect::<Vec<_>>(),
            vec![Scenario::Easy, Scenario::Hard]
        );
        assert_eq!(report.by_scenario[&Scenario::Hard].accuracy, 1.0);
        assert_eq!(report.calibration.len(), 2);
        assert_eq!(report.calibration[0].count, 1);
        assert_eq!(report.calibration[1].count, 2);
    }

    #[test]
    fn synthetic_run_orders_scenarios_by_difficulty() {
        let examples = generate_dataset(300, 42);

        let report = evaluate_baseline(&examples, DEFAULT_THRESHOLD, DEFAULT_CALIBRATION_BINS)
            .expect("evaluates");

        assert_eq!(report.overall.num_examples, 300);
        assert_eq!(report.by_scenario.len(), 3);
        let mean = |scenario: Scenario| report.by_scenario[&scenario].mean_prediction;
        assert!(mean(Scenario::Easy) > mean(Scenario::Medium));
        assert!(mean(Scenario::Medium) > mean(Scenario::Hard));
        let binned: usize = report.calibration.iter().map(|bin| bin.count).sum();
        assert_eq!(binned, 300);
        assert!((0.0..=1.0).contains(&report.overall.brier_score));
    }

    #[test]
    fn empty_dataset_is_an_error() {
        assert_eq!(
            evaluate_baseline(&[], DEFAULT_THRESHOLD, DEFAULT_CALIBRATION_BINS),
            Err(EvalError::Empty)
        );
    }
}
