//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use touchsheet::{SpecSheetSettings, generate_touch_sheet};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "touchsheet")]
#[command(version)]
#[command(about = "Render practice-night touches to an XLSX sheet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug details to stderr (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Sheet settings that override the input's `[sheet]` section.
#[derive(clap::Args, Debug, Clone, Default)]
struct SheetArgs {
    /// Worksheet name
    #[arg(long, value_name = "NAME")]
    sheet_name: Option<String>,

    /// Title row text
    #[arg(long)]
    title: Option<String>,

    /// Footer row text
    #[arg(long)]
    footer: Option<String>,

    /// Sort touches by length, then by runs descending
    #[arg(long, overrides_with = "no_sort")]
    sort: bool,

    /// Keep input order even when the input sets `sort_by_length`
    #[arg(long = "no-sort", overrides_with = "sort")]
    no_sort: bool,

    /// Widen the ringer and details columns to fit their text
    #[arg(long = "fit-columns", overrides_with = "no_fit_columns")]
    fit_columns: bool,

    /// Use the fixed column widths even when the input sets `fit_columns`
    #[arg(long = "no-fit-columns", overrides_with = "fit_columns")]
    no_fit_columns: bool,
}

/// `Some(true)` for `--flag`, `Some(false)` for `--no-flag`, `None` when neither is given.
fn derive_flag_override(if_on: bool, if_off: bool) -> Option<bool> {
    match (if_on, if_off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

impl From<&SheetArgs> for SpecSheetSettings {
    fn from(args: &SheetArgs) -> Self {
        SpecSheetSettings {
            sheet_name: args.sheet_name.clone(),
            title: args.title.clone(),
            footer: args.footer.clone(),
            sort_by_length: derive_flag_override(args.sort, args.no_sort),
            fit_columns: derive_flag_override(args.fit_columns, args.no_fit_columns),
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Build the sheet from a TOML file or directory and save it
    Run {
        /// Input TOML file, or a directory of TOML files
        input: PathBuf,

        /// Output .xlsx path
        output: PathBuf,

        #[command(flatten)]
        sheet_args: SheetArgs,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            output,
            sheet_args,
        } => {
            let report = generate_touch_sheet(&input, &output, &(&sheet_args).into())
                .with_context(|| {
                    format!(
                        "Failed to build {} from {}",
                        output.display(),
                        input.display()
                    )
                })?;
            println!("{report}");
            Ok(())
        }
    }
}

fn init_logging(if_verbose: bool) {
    let c_level = if if_verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(c_level));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct SheetArgsCli {
        #[command(flatten)]
        sheet_args: SheetArgs,
    }

    fn parse_settings(l_args: &[&str]) -> SpecSheetSettings {
        let cli = SheetArgsCli::try_parse_from(
            std::iter::once("touchsheet").chain(l_args.iter().copied()),
        )
        .expect("parse args");
        (&cli.sheet_args).into()
    }

    #[test]
    fn test_flag_pairs_override_input_settings_both_ways() {
        let settings_file = SpecSheetSettings {
            sort_by_length: Some(true),
            fit_columns: Some(false),
            ..Default::default()
        };

        let settings = parse_settings(&[]);
        assert_eq!(settings.sort_by_length, None);
        assert_eq!(settings.fit_columns, None);
        assert_eq!(
            settings.merge_missing(settings_file.clone()).sort_by_length,
            Some(true)
        );

        let settings = parse_settings(&["--no-sort", "--fit-columns"]);
        assert_eq!(settings.sort_by_length, Some(false));
        assert_eq!(settings.fit_columns, Some(true));
        let settings = settings.merge_missing(settings_file);
        assert_eq!(settings.sort_by_length, Some(false));
        assert_eq!(settings.fit_columns, Some(true));

        // The last of a pair wins.
        let settings =
            parse_settings(&["--sort", "--no-sort", "--no-fit-columns", "--fit-columns"]);
        assert_eq!(settings.sort_by_length, Some(false));
        assert_eq!(settings.fit_columns, Some(true));
    }
}
