use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use cluster_viz_prep::config::{Config, Overrides, Settings};
use cluster_viz_prep::constants;
use cluster_viz_prep::logging;
use cluster_viz_prep::normalize::Normalizer;
use cluster_viz_prep::palette::{ColorPalette, HueStrategy};
use cluster_viz_prep::{Pipeline, PipelineOptions};

#[derive(Parser)]
#[command(name = "cluster_viz_prep")]
#[command(about = "Prepare clustered paper records for the topic map")]
#[command(version = "0.1.0")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// TOML config file (defaults to ./cluster_viz.toml when present)
    #[arg(long, global = true, env = constants::ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Also write JSON logs to a daily rotating file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for `build` when no subcommand is given
    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the cluster files and write the visualization JSON (default)
    Build(BuildArgs),
    /// Print the palette for a cluster count, one color per line
    Palette {
        /// Number of clusters
        #[arg(long)]
        count: usize,
        #[arg(long)]
        hue_strategy: Option<HueStrategy>,
    },
    /// Show how an institution/country pair is normalized
    Normalize {
        #[arg(long)]
        institution: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Normalization table (TOML); defaults to the built-in table
        #[arg(long, env = constants::ENV_NORMALIZATION)]
        normalization: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Directory containing cluster_<id>.jsonl files
    #[arg(long, env = constants::ENV_INPUT_DIR)]
    input_dir: Option<PathBuf>,

    /// Output JSON file (overwritten)
    #[arg(long, env = constants::ENV_OUTPUT)]
    output: Option<PathBuf>,

    /// Normalization table (TOML); defaults to the built-in table
    #[arg(long, env = constants::ENV_NORMALIZATION)]
    normalization: Option<PathBuf>,

    /// Hue spacing: even or golden-angle
    #[arg(long)]
    hue_strategy: Option<HueStrategy>,

    /// Abort on the first malformed line instead of reporting all of them
    #[arg(long)]
    strict: bool,
}

fn run_build(args: BuildArgs, config: Config) -> anyhow::Result<()> {
    let settings = Settings::resolve(
        Overrides {
            input_dir: args.input_dir,
            output_file: args.output,
            normalization: args.normalization,
            hue_strategy: args.hue_strategy,
        },
        config,
    );
    info!(?settings, "Resolved settings");

    let table = settings
        .normalization_table()
        .context("loading normalization table")?;
    let pipeline = Pipeline::new(
        PipelineOptions {
            input_dir: settings.input_dir,
            output_file: settings.output_file,
            hue_strategy: settings.hue_strategy,
            strict: args.strict,
        },
        Normalizer::new(table),
    );

    let result = pipeline.run().map_err(|e| {
        error!("Pipeline failed: {}", e);
        e
    })?;

    if !result.line_errors.is_empty() {
        warn!("{} lines could not be processed", result.line_errors.len());
        println!("\n⚠️  {} lines skipped:", result.line_errors.len());
        for line_error in &result.line_errors {
            println!("   - {}", line_error);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard =
        logging::init_logging(cli.log_dir.as_deref()).context("initializing logging")?;

    let config = Config::load(cli.config.as_deref()).context("loading config")?;

    match cli.command.unwrap_or(Commands::Build(cli.build)) {
        Commands::Build(args) => run_build(args, config)?,
        Commands::Palette {
            count,
            hue_strategy,
        } => {
            let strategy = hue_strategy
                .or(config.palette.hue_strategy)
                .unwrap_or_default();
            for color in ColorPalette::generate(count, strategy).iter() {
                println!("{}", color);
            }
        }
        Commands::Normalize {
            institution,
            country,
            normalization,
        } => {
            let settings = Settings::resolve(
                Overrides {
                    normalization,
                    ..Overrides::default()
                },
                config,
            );
            let normalizer = Normalizer::new(
                settings
                    .normalization_table()
                    .context("loading normalization table")?,
            );
            let normalized = normalizer.normalize(institution.as_deref(), country.as_deref());
            println!("{}", serde_json::to_string_pretty(&normalized)?);
        }
    }
    Ok(())
}
