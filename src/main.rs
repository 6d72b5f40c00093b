use std::io::Write;

use anyhow::Result;
use basic_cleaning::data::filter::PriceRange;
use basic_cleaning::{CleanRequest, Cleaner, LocalRegistry};
use clap::Parser;

/// Registry root used when `ARTIFACT_REGISTRY_DIR` is unset.
const DEFAULT_REGISTRY_DIR: &str = "artifacts";

/// A very basic data cleaning
#[derive(Parser, Debug)]
#[command(name = "basic-cleaning", version, about)]
struct Args {
    /// Raw data artifact as input
    #[arg(long = "input_artifact")]
    input_artifact: String,

    /// Resulting artifact which is a preprocessed version of the input artifact
    #[arg(long = "output_artifact")]
    output_artifact: String,

    /// Type of the output artifact
    #[arg(long = "output_type")]
    output_type: String,

    /// Description of the output artifact
    #[arg(long = "output_description")]
    output_description: String,

    /// Min price to be considered in the dataset
    #[arg(long = "min_price", allow_negative_numbers = true)]
    min_price: f64,

    /// Max price to be considered in the dataset
    #[arg(long = "max_price", allow_negative_numbers = true)]
    max_price: f64,
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {}",
                buf.timestamp_millis(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let registry_dir = std::env::var("ARTIFACT_REGISTRY_DIR")
        .unwrap_or_else(|_| DEFAULT_REGISTRY_DIR.to_string());
    log::debug!("using artifact registry at {registry_dir}");

    let request = CleanRequest {
        input_artifact: args.input_artifact,
        output_artifact: args.output_artifact,
        output_type: args.output_type,
        output_description: args.output_description,
        price_range: PriceRange::new(args.min_price, args.max_price),
    };

    let cleaner = Cleaner::new(LocalRegistry::new(registry_dir));
    let report = cleaner.clean(&request)?;
    log::info!(
        "{} rows in, {} rows out, published as {}",
        report.input_rows,
        report.output_rows,
        report.published
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn all_six_flags_are_required() {
        let err = Args::try_parse_from(["basic-cleaning", "--input_artifact", "a"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_underscore_flags() {
        let args = Args::try_parse_from([
            "basic-cleaning",
            "--input_artifact",
            "sample.csv:latest",
            "--output_artifact",
            "clean_sample.csv",
            "--output_type",
            "clean_sample",
            "--output_description",
            "Data with outliers removed",
            "--min_price",
            "10",
            "--max_price",
            "350.5",
        ])
        .unwrap();
        assert_eq!(args.input_artifact, "sample.csv:latest");
        assert_eq!(args.min_price, 10.0);
        assert_eq!(args.max_price, 350.5);
    }
}
