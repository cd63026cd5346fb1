//! Platemap CLI - qPCR result annotation tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use platemap::prelude::*;
use platemap::{ConversionReport, DEFAULT_OUTPUT};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "platemap")]
#[command(
    author,
    version,
    about = "Annotate qPCR measurements with targets and content from a plate map"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a measurement table and write the result
    Convert {
        /// Measurements (.json document tables, or .csv/.tsv/.txt)
        measurements: PathBuf,

        /// Plate-map workbook (.xlsx)
        plate_map: PathBuf,

        /// Output file (.xlsx or .csv)
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Measurement layout (default: from the file extension)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Leave annotations empty for wells outside the plate map
        #[arg(long, env = "PLATEMAP_LENIENT")]
        lenient: bool,

        /// Stop at the first row that cannot be annotated
        #[arg(long)]
        fail_fast: bool,

        /// Drop an input column from the output (repeatable)
        #[arg(long = "drop-column", value_name = "COLUMN")]
        drop_columns: Vec<String>,

        /// Keep every input column, including ones dropped by default
        #[arg(long, conflicts_with = "drop_columns")]
        keep_all_columns: bool,

        /// Drop rows whose Cq is Undetermined
        #[arg(long)]
        drop_undetermined: bool,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,
    },

    /// Show what a plate map resolves to
    Inspect {
        /// Plate-map workbook (.xlsx)
        plate_map: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Tables extracted from a multi-page report (JSON)
    Documents,
    /// One delimited table with a header row
    Flat,
}

impl From<FormatArg> for MeasurementFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Documents => MeasurementFormat::Documents,
            FormatArg::Flat => MeasurementFormat::Flat,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            measurements,
            plate_map,
            output,
            format,
            lenient,
            fail_fast,
            drop_columns,
            keep_all_columns,
            drop_undetermined,
            force,
        } => {
            let format = match format {
                Some(format) => format.into(),
                None => infer_format(&measurements)?,
            };

            let mut options = ConversionOptions::for_format(format);
            if lenient {
                options.annotate.policy = LookupPolicy::Lenient;
            }
            options.annotate.fail_fast = fail_fast;
            if keep_all_columns {
                options.annotate.drop_columns.clear();
            } else if !drop_columns.is_empty() {
                options.annotate.drop_columns = drop_columns;
            }
            options.drop_undetermined = drop_undetermined;
            options.overwrite = force;

            run_convert(&measurements, format, &plate_map, &output, &options)
        }
        Commands::Inspect { plate_map, json } => inspect(&plate_map, json),
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn infer_format(measurements: &Path) -> Result<MeasurementFormat> {
    match MeasurementFormat::from_path(measurements) {
        Some(format) => Ok(format),
        None => bail!(
            "Cannot tell the layout of '{}' from its extension; pass --format",
            measurements.display()
        ),
    }
}

fn run_convert(
    measurements: &Path,
    format: MeasurementFormat,
    plate_map: &Path,
    output: &Path,
    options: &ConversionOptions,
) -> Result<()> {
    debug!(?format, ?options, "starting conversion");

    let ConversionReport {
        rows_read,
        rows_written,
        output,
        ..
    } = convert(measurements, format, plate_map, output, options).with_context(|| {
        format!(
            "Failed to annotate '{}' with '{}'",
            measurements.display(),
            plate_map.display()
        )
    })?;

    if rows_written < rows_read {
        eprintln!(
            "Wrote {} of {} rows to '{}'",
            rows_written,
            rows_read,
            output.display()
        );
    } else {
        eprintln!("Wrote {} rows to '{}'", rows_written, output.display());
    }
    Ok(())
}

fn inspect(plate_map: &Path, json: bool) -> Result<()> {
    let map = XlsxReader::read_plate_map_file(plate_map)
        .with_context(|| format!("Failed to read plate map '{}'", plate_map.display()))?;
    let summary = PlateMapSummary::new(&map);

    if json {
        let text = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{}", text);
    } else {
        println!("File: {}", plate_map.display());
        print!("{}", summary);
    }
    Ok(())
}
