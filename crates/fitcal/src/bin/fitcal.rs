//! Terminal front-end for the calorie estimator.
//!
//! Usage:
//!   fitcal [--calories PATH] [--exercise PATH] [-v] predict --age 25 --bmi 24.69 \
//!       --duration 30 --heart-rate 120 --body-temp 39.5 --gender male
//!   fitcal interactive
//!   fitcal report [--json]
//!
//! The model is fit once at startup; `RUST_LOG` overrides the log filter.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitcal::data::JoinPolicy;
use fitcal::inference::RequestForm;
use fitcal::training::Verbosity;
use fitcal::{
    FitOptions, ForestConfig, Gender, InferenceRequest, InputRanges, ModelMeta, PipelineConfig,
    TrainedModel, initialize,
};

#[derive(Debug, Parser)]
#[command(name = "fitcal", version, about = "Estimate calories burned during exercise")]
struct Cli {
    /// Calories table (User_ID, Calories).
    #[arg(long, default_value = "data/calories.csv")]
    calories: PathBuf,

    /// Exercise table (User_ID, Gender, Age, Height, Weight, Duration, Heart_Rate, Body_Temp).
    #[arg(long, default_value = "data/exercise.csv")]
    exercise: PathBuf,

    /// Fail if any row has no partner in the other table.
    #[arg(long, default_value_t = false)]
    exact_join: bool,

    /// Number of trees.
    #[arg(long, default_value_t = fitcal::model::N_TREES)]
    trees: u32,

    /// Thread count: 0 = auto, 1 = sequential.
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate one session.
    Predict {
        #[arg(long)]
        age: u32,
        #[arg(long)]
        bmi: f64,
        /// Minutes.
        #[arg(long)]
        duration: u32,
        /// Beats per minute.
        #[arg(long)]
        heart_rate: u32,
        /// Degrees Celsius.
        #[arg(long)]
        body_temp: f64,
        /// male or female.
        #[arg(long, value_parser = parse_gender)]
        gender: Gender,
    },
    /// Prompt for sessions until end of input.
    Interactive,
    /// Print holdout metrics and feature importance.
    Report {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    Gender::parse(s).ok_or_else(|| format!("unknown gender {s:?}, expected male or female"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let verbosity = match cli.verbose {
        0 => Verbosity::Warning,
        1 => Verbosity::Info,
        _ => Verbosity::Debug,
    };
    let forest = ForestConfig::builder()
        .n_trees(cli.trees)
        .n_threads(cli.threads)
        .verbosity(verbosity)
        .build()
        .context("invalid forest configuration")?;
    let config = PipelineConfig::builder()
        .calories_path(cli.calories)
        .exercise_path(cli.exercise)
        .join(if cli.exact_join {
            JoinPolicy::Exact
        } else {
            JoinPolicy::Inner
        })
        .fit(FitOptions::new(forest))
        .build()
        .context("invalid pipeline configuration")?;

    let model = initialize(&config).context("failed to initialize the calorie model")?;

    match cli.command {
        Command::Predict {
            age,
            bmi,
            duration,
            heart_rate,
            body_temp,
            gender,
        } => {
            let request = InferenceRequest {
                age,
                bmi,
                duration,
                heart_rate,
                body_temp,
                gender,
            };
            if let Err(e) = InputRanges::DEFAULT.check(&request) {
                tracing::warn!(error = %e, "input outside the usual range");
            }
            let calories = model.predict_rounded(&request)?;
            println!("{calories:.2}");
        }
        Command::Interactive => interactive(&model)?,
        Command::Report { json } => report(&model, json)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

// =============================================================================
// Interactive form
// =============================================================================

fn interactive(model: &TrainedModel) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = io::stdout();
    let ranges = InputRanges::DEFAULT;

    writeln!(out, "Enter session details (end of input to quit).")?;
    loop {
        let mut form = RequestForm::default();
        let fields: [(&str, &mut String); 6] = [
            ("Age (years)", &mut form.age),
            ("BMI", &mut form.bmi),
            ("Duration (min)", &mut form.duration),
            ("Heart rate (bpm)", &mut form.heart_rate),
            ("Body temperature (°C)", &mut form.body_temp),
            ("Gender (male/female)", &mut form.gender),
        ];
        for (label, slot) in fields {
            write!(out, "{label}: ")?;
            out.flush()?;
            match lines.next() {
                Some(line) => *slot = line?,
                None => return Ok(()),
            }
        }

        let result = form
            .parse()
            .and_then(|request| ranges.check(&request).map(|()| request))
            .and_then(|request| model.predict_rounded(&request));
        match result {
            Ok(calories) => writeln!(out, "Estimated calories burned: {calories:.2} kcal\n")?,
            Err(e) => writeln!(out, "Invalid input: {e}. Please try again.\n")?,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

#[derive(Serialize)]
struct Report<'a> {
    meta: &'a ModelMeta,
    feature_importance: Vec<(String, f64)>,
}

fn report(model: &TrainedModel, json: bool) -> anyhow::Result<()> {
    let report = Report {
        meta: model.meta(),
        feature_importance: model.feature_importance(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let meta = report.meta;
    let eval = &meta.evaluation;
    let config = model.config();
    println!(
        "forest: {} trees, max_depth {}, max_features {}, seed {}",
        config.n_trees, config.max_depth, config.max_features, config.seed
    );
    println!(
        "rows: {} (train {}, holdout {})",
        meta.n_samples, meta.n_train, meta.n_holdout
    );
    println!("train   rmse {:>8.3}  mae {:>8.3}", eval.train_rmse, eval.train_mae);
    if let (Some(rmse), Some(mae)) = (eval.holdout_rmse, eval.holdout_mae) {
        println!("holdout rmse {rmse:>8.3}  mae {mae:>8.3}");
    }
    println!("feature importance:");
    for (name, value) in &report.feature_importance {
        println!("  {name:<12} {value:.4}");
    }
    Ok(())
}
