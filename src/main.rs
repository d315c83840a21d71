//! biopsy: feature-ranked diagnostic classifier CLI
//!
//! Loads the diagnostic dataset, ranks features with a random forest,
//! refits a logistic regression on the top ten and reports how it does on
//! the held-out rows.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use biopsy::cli::Cli;
use biopsy::pipeline::{load_dataset, run_pipeline, PipelineConfig, BENIGN, MALIGNANT};
use biopsy::report::{display_and_plot, ConfusionPlot, TerminalHeatmap};
use biopsy::utils::{
    create_spinner, finish_with_success, hidden_spinner, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let source = cli.source();
    let config = PipelineConfig::default();
    let styled = !cli.json;

    let spinner = |message: &str| {
        if styled {
            create_spinner(message)
        } else {
            hidden_spinner()
        }
    };

    if styled {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            &source.to_string(),
            config.seed,
            config.test_fraction,
            config.top_k,
        );
    }

    // Step 1: Load
    if styled {
        print_step_header(1, "Load Dataset");
    }
    let step_start = Instant::now();
    let pb = spinner(&format!("Fetching {}...", source));
    let loaded = load_dataset(&source, &config.loader)
        .with_context(|| format!("Failed to load dataset from {}", source))?;
    finish_with_success(&pb, "Dataset loaded");

    if styled {
        println!("\n    {} Dataset Statistics:", style("✧").cyan());
        println!("      Raw shape: {} rows x {} columns", loaded.raw_rows, loaded.raw_columns);
        println!("      Rows: {} ({} dropped)", loaded.dataset.n_rows(), loaded.dropped_rows);
        println!("      Features: {}", loaded.dataset.n_features());
        println!(
            "      Diagnosis: {} {} / {} {}",
            loaded.malignant, MALIGNANT, loaded.benign, BENIGN
        );
        println!("      Estimated memory: {:.2} MB", loaded.memory_mb);
        print_step_time(step_start.elapsed());
    }

    // Step 2: Train
    if styled {
        print_step_header(2, "Train Models");
    }
    let step_start = Instant::now();
    let pb = spinner("Imputing, scaling and fitting the forest and logistic model...");
    let outcome = run_pipeline(&loaded.dataset, &config)?;
    finish_with_success(&pb, "Models trained");

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{}", json);
        return Ok(());
    }

    print_info(&format!(
        "Trained on {} rows, evaluated on {} rows",
        outcome.split.train_len(),
        outcome.split.test_len()
    ));
    print_step_time(step_start.elapsed());

    // Step 3: Evaluate and visualize
    print_step_header(3, "Evaluate");
    let mut heatmap = TerminalHeatmap::default();
    let plot: Option<&mut dyn ConfusionPlot> = if cli.no_plot { None } else { Some(&mut heatmap) };
    display_and_plot(&outcome, plot)?;

    if cli.no_plot {
        print_info("Heatmap skipped (--no-plot)");
    } else {
        print_success("Heatmap rendered");
    }

    print_completion();

    Ok(())
}
