use clap::Args;
use standby_rank::error::AppError;
use standby_rank::recommend::eval::{
    evaluate_baseline, generate_dataset, EvalExample, EvalMetrics, EvaluationReport,
    DEFAULT_CALIBRATION_BINS, DEFAULT_THRESHOLD,
};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding an array of labelled examples; a synthetic set is generated if omitted
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Number of synthetic examples to generate
    #[arg(long, default_value_t = 300)]
    pub(crate) examples: usize,
    /// Seed for the synthetic examples
    #[arg(long, default_value_t = 42)]
    pub(crate) seed: u64,
    /// Probability at or above which an example counts as a predicted clear
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub(crate) threshold: f64,
    /// Number of calibration bins
    #[arg(long, default_value_t = DEFAULT_CALIBRATION_BINS)]
    pub(crate) bins: usize,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let examples = load_examples(&args)?;
    let report = evaluate_baseline(&examples, args.threshold, args.bins)?;

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report unavailable as JSON: {err}"),
        }
        return Ok(());
    }

    render_report(&report, &args);
    Ok(())
}

fn load_examples(args: &EvaluateArgs) -> Result<Vec<EvalExample>, AppError> {
    match &args.dataset {
        Some(path) => read_examples(path),
        None => Ok(generate_dataset(args.examples, args.seed)),
    }
}

fn read_examples(path: &Path) -> Result<Vec<EvalExample>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let examples = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    Ok(examples)
}

fn render_report(report: &EvaluationReport, args: &EvaluateArgs) {
    match &args.dataset {
        Some(path) => println!("Baseline evaluation on {}", path.display()),
        None => println!(
            "Baseline evaluation on {} synthetic examples (seed {})",
            args.examples,
            args.seed
        ),
    }
    println!("- threshold {:.2}", report.threshold);

    println!("\nOverall");
    render_metrics(&report.overall);

    for (scenario, metrics) in &report.by_scenario {
        println!("\n{}", scenario.label().to_ascii_uppercase());
        render_metrics(metrics);
    }

    println!("\nCalibration (predicted vs actual)");
    for bin in &report.calibration {
        println!(
            "   predicted {:.1}% | actual {:.1}% | {} example(s)",
            bin.mean_predicted * 100.0,
            bin.mean_actual * 100.0,
            bin.count
        );
    }
}

fn render_metrics(metrics: &EvalMetrics) {
    println!(
        "   brier {:.4} | accuracy {:.1}% | {} example(s)",
        metrics.brier_score,
        metrics.accuracy * 100.0,
        metrics.num_examples
    );
    println!(
        "   precision {:.1}% | recall {:.1}% | f1 {:.1}%",
        metrics.precision * 100.0,
        metrics.recall * 100.0,
        metrics.f1 * 100.0
    );
    println!(
        "   mean prediction {:.1}% | mean label {:.1}%",
        metrics.mean_prediction * 100.0,
        metrics.mean_label * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dataset: Option<PathBuf>) -> EvaluateArgs {
        EvaluateArgs {
            dataset,
            examples: 30,
            seed: 5,
            threshold: DEFAULT_THRESHOLD,
            bins: DEFAULT_CALIBRATION_BINS,
            json: false,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("standby-eval-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn synthetic_examples_follow_size_and_seed() {
        let examples = load_examples(&args(None)).expect("generates");
        assert_eq!(examples, generate_dataset(30, 5));
    }

    #[test]
    fn dataset_file_is_read_as_json() {
        let path = temp_path("good");
        let written = generate_dataset(9, 3);
        std::fs::write(&path, serde_json::to_string(&written).expect("serializes"))
            .expect("write dataset");

        let loaded = load_examples(&args(Some(path.clone())));
        std::fs::remove_file(&path).ok();

        let loaded = loaded.expect("reads");
        assert_eq!(loaded.len(), written.len());
        for (read, original) in loaded.iter().zip(&written) {
            assert_eq!(read.example_id, original.example_id);
            assert_eq!(read.scenario, original.scenario);
            assert_eq!(read.cleared, original.cleared);
            assert!(
                (read.hours_to_departure - original.hours_to_departure).abs() < 1e-9
            );
        }
    }

    #[test]
    fn malformed_dataset_is_an_io_error() {
        let path = temp_path("bad");
        std::fs::write(&path, "{ not json").expect("write dataset");

        let loaded = load_examples(&args(Some(path.clone())));
        std::fs::remove_file(&path).ok();

        assert!(matches!(loaded, Err(AppError::Io(_))));
    }

    #[test]
    fn evaluation_errors_surface_through_app_error() {
        let mut args = args(None);
        args.examples = 0;
        assert!(matches!(run_evaluate(args), Err(AppError::Evaluation(_))));
    }
}
