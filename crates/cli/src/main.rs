mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{SourceArgs, cmd_generate, cmd_inspect, cmd_plan};
use output::{OutputFormat, print_error};

/// restack - Replay the installation order of a software stack
#[derive(Parser)]
#[command(name = "restack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true, visible_alias = "debug", short_alias = 'd')]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write easystack files that replay the reference installation order
  Generate {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory to write the easystack files into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the easystack files that would be written
  Plan {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List every installation in replay order
  Inspect {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "info,restack=debug,restack_lib=debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Generate {
      source,
      output_dir,
      output,
    } => cmd_generate(&source, &output_dir, cli.verbose, output),
    Commands::Plan { source, output } => cmd_plan(&source, cli.verbose, output),
    Commands::Inspect { source, output } => cmd_inspect(&source, cli.verbose, output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
