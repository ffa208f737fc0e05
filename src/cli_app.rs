//! Top-level CLI definition and dispatch.

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::cli::{plan, run, simulate};
use crate::core::config::Config;
use crate::core::errors::{BeadsError, Result};
use crate::design::factors::DisplayMode;

/// Beads task: sequential-sampling probabilistic reasoning experiment.
#[derive(Debug, Parser)]
#[command(name = "beads", version, about)]
pub struct Cli {
    /// TOML configuration file (defaults reproduce the reference session).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for results and the event log.
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an interactive session in this terminal.
    Run(RunArgs),
    /// Run a headless session with a simulated participant.
    Simulate(SimulateArgs),
    /// Print the generated trial plan without running anything.
    Plan(PlanArgs),
    /// Print the effective configuration as TOML.
    Config(DesignOverrides),
    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Flags that override the `[design]` section.
#[derive(Debug, Clone, Default, Args)]
pub struct DesignOverrides {
    /// Fixed RNG seed for reproducible trial generation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Display mode order, e.g. `numeric,visual`.
    #[arg(long, value_delimiter = ',', value_parser = parse_display_mode)]
    pub display_order: Option<Vec<DisplayMode>>,

    /// Skip the practice trials.
    #[arg(long)]
    pub no_practice: bool,
}

/// Arguments for `beads run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Participant identifier; prompted for when omitted.
    #[arg(long)]
    pub subject: Option<String>,

    #[command(flatten)]
    pub design: DesignOverrides,
}

/// Arguments for `beads simulate`.
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Participant identifier used in file names.
    #[arg(long, default_value = "SIM")]
    pub subject: String,

    /// Abort after this many committed ratings.
    #[arg(long, value_name = "RATINGS")]
    pub abort_after: Option<usize>,

    /// Answer every rating with this probability instead of the ideal observer.
    #[arg(long, value_name = "P", value_parser = parse_probability)]
    pub fixed_rating: Option<f64>,

    /// Emit the session report as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub design: DesignOverrides,
}

/// Arguments for `beads plan`.
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Emit the plan as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub design: DesignOverrides,
}

fn parse_display_mode(raw: &str) -> std::result::Result<DisplayMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "visual" => Ok(DisplayMode::Visual),
        "numeric" => Ok(DisplayMode::Numeric),
        other => Err(format!("unknown display mode `{other}` (expected visual or numeric)")),
    }
}

fn parse_probability(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|e| format!("not a number: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside [0, 1]"))
    }
}

/// File config, then global flags, then per-command design flags; validated
/// again after every override.
pub fn effective_config(cli: &Cli, design: &DesignOverrides) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir.clone_from(dir);
    }
    if let Some(seed) = design.seed {
        config.design.seed = Some(seed);
    }
    if let Some(order) = &design.display_order {
        config.design.display_order.clone_from(order);
    }
    if design.no_practice {
        config.design.practice = false;
    }
    config.validate()?;
    Ok(config)
}

/// Dispatch CLI commands.
///
/// # Errors
/// Returns configuration, design, and I/O errors; an aborted session is not
/// an error.
pub fn run(cli: &Cli) -> std::result::Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Run(args) => {
            let config = effective_config(cli, &args.design)?;
            run::execute(&config, args.subject.as_deref())?;
        }
        Command::Simulate(args) => {
            let config = effective_config(cli, &args.design)?;
            simulate::execute(&config, args)?;
        }
        Command::Plan(args) => {
            let config = effective_config(cli, &args.design)?;
            plan::execute(&config, args.json)?;
        }
        Command::Config(overrides) => {
            let config = effective_config(cli, overrides)?;
            print!("{}", config.to_toml_string()?);
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "beads", &mut io::stdout());
        }
    }
    Ok(())
}

/// Wrap a stdout write failure.
pub(crate) fn stdout_error(err: io::Error) -> BeadsError {
    BeadsError::io("<stdout>", err)
}
