//! Console summary of a pipeline run

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use super::heatmap::ConfusionPlot;
use crate::pipeline::{Evaluation, PipelineOutcome, SelectedFeature};

/// Axis labels of the binary confusion matrix, in label order
pub const CLASS_LABELS: [&str; 2] = ["0", "1"];

/// Indent every line of a rendered table
fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

/// Ranked table of the features kept for the reduced model
pub fn ranking_table(selected: &[SelectedFeature]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Index").add_attribute(Attribute::Bold),
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Importance").add_attribute(Attribute::Bold),
    ]);
    for (rank, feature) in selected.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(feature.index).set_alignment(CellAlignment::Right),
            Cell::new(&feature.name),
            Cell::new(format!("{:.4}", feature.importance)).fg(Color::Cyan),
        ]);
    }
    table
}

/// Headline numbers of the run
pub fn metrics_table(outcome: &PipelineOutcome) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    let accuracy = outcome.evaluation.accuracy;
    let color = if accuracy >= 0.95 {
        Color::Green
    } else if accuracy >= 0.85 {
        Color::Yellow
    } else {
        Color::Red
    };

    table.add_row(vec![Cell::new("Rows"), Cell::new(outcome.n_rows)]);
    table.add_row(vec![
        Cell::new("Train / Test"),
        Cell::new(format!("{} / {}", outcome.split.train_len(), outcome.split.test_len())),
    ]);
    table.add_row(vec![Cell::new("Features"), Cell::new(outcome.n_features)]);
    table.add_row(vec![Cell::new("Missing cells"), Cell::new(outcome.missing_cells)]);
    table.add_row(vec![Cell::new("Forest trees"), Cell::new(outcome.forest.n_trees())]);
    table.add_row(vec![
        Cell::new("Forest accuracy (all features)"),
        Cell::new(format!("{:.4}", outcome.forest_test_accuracy)),
    ]);
    table.add_row(vec![
        Cell::new("Selected features"),
        Cell::new(outcome.selected.len()),
    ]);
    table.add_row(vec![
        Cell::new("Solver iterations"),
        Cell::new(format!(
            "{} ({:?})",
            outcome.logistic.iterations(),
            outcome.logistic.status()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Accuracy (reduced model)"),
        Cell::new(format!("{:.4}", accuracy))
            .fg(color)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

/// Print the top feature indices, the metrics table and the classification
/// report
pub fn display_outcome(outcome: &PipelineOutcome) {
    section("🏆", "TOP FEATURES");
    println!("    Top {} features: {:?}", outcome.selected.len(), outcome.selected_indices());
    println!();
    print_indented(&ranking_table(&outcome.selected));

    section("📋", "RUN SUMMARY");
    print_indented(&metrics_table(outcome));

    display_evaluation(&outcome.evaluation);
}

/// Print the run summary, then hand the confusion matrix to `plot`.
///
/// `None` prints the summary only.
pub fn display_and_plot(outcome: &PipelineOutcome, plot: Option<&mut dyn ConfusionPlot>) -> Result<()> {
    display_outcome(outcome);
    if let Some(plot) = plot {
        plot.plot(&outcome.evaluation.confusion, &CLASS_LABELS)?;
    }
    Ok(())
}

/// Print accuracy, classification report and the raw confusion matrix
pub fn display_evaluation(evaluation: &Evaluation) {
    section("🎯", "EVALUATION");
    println!("    Accuracy: {:.4}", evaluation.accuracy);
    println!();
    println!("    Classification Report:");
    for line in evaluation.report.to_string().lines() {
        println!("    {}", line);
    }
    println!();
    println!("    Confusion Matrix:");
    for line in evaluation.confusion.to_string().lines() {
        println!("    {}", line);
    }
}
