//! Confusion matrix visualization.
//!
//! Rendering sits behind [`ConfusionPlot`] so the pipeline can be driven
//! with the terminal heatmap, with nothing, or with a recorder in tests.

use anyhow::Result;
use console::Style;

use crate::pipeline::ConfusionMatrix;

/// Light to dark blue steps of the xterm 256-colour palette
const BLUE_RAMP: [u8; 6] = [189, 153, 111, 69, 27, 19];

/// Width of a rendered cell, in characters
const CELL_WIDTH: usize = 8;

/// Something that can display a confusion matrix
pub trait ConfusionPlot {
    /// Show `matrix` with `class_labels` on both axes (label order matches
    /// the matrix rows and columns)
    fn plot(&mut self, matrix: &ConfusionMatrix, class_labels: &[&str]) -> Result<()>;
}

/// Annotated heatmap drawn with background colours in the terminal
#[derive(Debug, Clone)]
pub struct TerminalHeatmap {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for TerminalHeatmap {
    fn default() -> Self {
        Self {
            title: "Confusion Matrix".to_string(),
            x_label: "Predicted".to_string(),
            y_label: "Actual".to_string(),
        }
    }
}

impl TerminalHeatmap {
    /// Build the heatmap as text. Colours are emitted only when the
    /// terminal supports them.
    pub fn render(&self, matrix: &ConfusionMatrix, class_labels: &[&str]) -> String {
        let rows = matrix.as_rows();
        let max = rows.iter().flatten().copied().max().unwrap_or(0);
        let label_width = class_labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(1)
            .max(self.y_label.chars().count());

        let mut out = String::new();
        out.push_str(&format!("    {}\n", Style::new().bold().apply_to(&self.title)));

        let grid_width = CELL_WIDTH * rows.len();
        out.push_str(&format!(
            "    {:w$} {:^g$}\n",
            "",
            self.x_label,
            w = label_width + 2,
            g = grid_width
        ));

        out.push_str(&format!("    {:w$} ", "", w = label_width + 2));
        for (col, _) in rows.iter().enumerate() {
            let name = class_labels.get(col).copied().unwrap_or("?");
            out.push_str(&format!("{:^w$}", name, w = CELL_WIDTH));
        }
        out.push('\n');

        for (r, row) in rows.iter().enumerate() {
            let axis = if r == 0 { self.y_label.as_str() } else { "" };
            let name = class_labels.get(r).copied().unwrap_or("?");
            out.push_str(&format!("    {:>w$} {} ", axis, name, w = label_width));
            for &count in row {
                let cell = format!("{:^w$}", count, w = CELL_WIDTH);
                out.push_str(&shade(count, max).apply_to(cell).to_string());
            }
            out.push('\n');
        }
        out
    }
}

/// Index into the colour ramp for `count` relative to the largest cell
fn shade_level(count: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (count * (BLUE_RAMP.len() - 1) + max / 2) / max
    }
}

fn shade(count: usize, max: usize) -> Style {
    let level = shade_level(count, max);
    let fg = if level >= BLUE_RAMP.len() / 2 { 15 } else { 16 };
    Style::new().on_color256(BLUE_RAMP[level]).color256(fg).bold()
}

impl ConfusionPlot for TerminalHeatmap {
    fn plot(&mut self, matrix: &ConfusionMatrix, class_labels: &[&str]) -> Result<()> {
        println!();
        print!("{}", self.render(matrix, class_labels));
        Ok(())
    }
}
