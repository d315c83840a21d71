//! Command-line argument definitions using clap

use clap::Parser;

use crate::pipeline::DataSource;

/// biopsy - rank breast-cancer measurements with a random forest and
/// evaluate a logistic model on the most important ones
#[derive(Parser, Debug)]
#[command(name = "biopsy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dataset location: an http(s) URL or a local path to a headerless
    /// wdbc-style CSV. Defaults to the UCI repository copy.
    #[arg(short, long, value_parser = validate_source)]
    pub source: Option<String>,

    /// Skip the confusion matrix heatmap
    #[arg(long, default_value = "false")]
    pub no_plot: bool,

    /// Print the run outcome as JSON instead of the styled report
    #[arg(long, default_value = "false")]
    pub json: bool,
}

impl Cli {
    /// Where to read the dataset from
    pub fn source(&self) -> DataSource {
        self.source
            .as_deref()
            .map(DataSource::parse)
            .unwrap_or_default()
    }
}

/// Validator for the source argument
fn validate_source(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("source must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_uci_url() {
        let cli = Cli::parse_from(["biopsy"]);
        assert_eq!(cli.source(), DataSource::default());
        assert!(!cli.no_plot);
        assert!(!cli.json);
    }

    #[test]
    fn test_local_source() {
        let cli = Cli::parse_from(["biopsy", "--source", "data/wdbc.data", "--no-plot"]);
        assert!(matches!(cli.source(), DataSource::File(_)));
        assert!(cli.no_plot);
    }

    #[test]
    fn test_empty_source_rejected() {
        assert!(Cli::try_parse_from(["biopsy", "--source", " "]).is_err());
    }
}
