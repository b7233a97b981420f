use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sedrun")]
#[command(about = "Run compiled stream-editor scripts over text")]
#[command(long_about = "sedrun executes a stream-editing script over its input, one line at a time.

Scripts are command lists written in TOML (or JSON with a .json extension).
Each cycle loads the next line into the pattern space, runs the commands,
prints the pattern space (unless -n) and starts over.

STDIN/STDOUT:
  When no files are specified, sedrun reads from stdin and writes to stdout.
  Several files are read as one continuous stream.

EXAMPLES:
  sedrun -f fix.toml input.txt           Print the transformed file
  cat log | sedrun -n -f errors.toml     Filter a pipeline
  sedrun -i -f fix.toml a.txt b.txt      Edit files in place
  sedrun --dump -f fix.toml              Show the compiled program")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Script file to run (TOML, or JSON with a .json extension)
    #[arg(short = 'f', long = "script", value_name = "SCRIPT")]
    script: Option<String>,

    /// Files to process
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Suppress automatic printing of the pattern space
    #[arg(short = 'n', long, alias = "silent")]
    quiet: bool,

    /// Edit files in place
    #[arg(short = 'i', long = "in-place")]
    #[arg(help = "Write output back to each file instead of stdout\nEach file is processed as a separate stream")]
    in_place: bool,

    /// Print the compiled program and exit
    #[arg(long)]
    dump: bool,

    /// Largest chunk read from input at once
    #[arg(long = "max-chunk", value_name = "BYTES")]
    max_chunk: Option<usize>,

    /// Write a debug log to ~/.sedrun/sedrun.log
    #[arg(long)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or reset the configuration file
    #[command(long_about = "Manage the sedrun configuration file (~/.sedrun/config.toml).

Without flags, prints the paths of the configuration file and debug log.

CONFIGURATION OPTIONS:
  [engine]
    max_chunk_bytes = 4096    # Largest chunk read at once (min 16)
    quiet = false             # Default for -n

  [logging]
    debug = false             # Write ~/.sedrun/sedrun.log
    level = \"sedrun=info\"     # tracing filter

EXAMPLES:
  sedrun config                   Show the config and log paths
  sedrun config --show            Show current configuration
  sedrun config --reset           Restore the default file")]
    Config {
        /// Show current configuration
        #[arg(long = "show")]
        show: bool,

        /// Overwrite the configuration with defaults
        #[arg(long = "reset", conflicts_with = "show")]
        reset: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, reset }) => Ok(Args::Config { show, reset }),
        None => {
            let script = cli
                .script
                .context("Missing script. Usage: sedrun -f script.toml [FILE]...")?;

            if cli.in_place && cli.files.is_empty() {
                anyhow::bail!("--in-place requires at least one file");
            }

            Ok(Args::Run {
                script,
                files: cli.files,
                quiet: cli.quiet,
                in_place: cli.in_place,
                dump: cli.dump,
                max_chunk: cli.max_chunk,
                debug: cli.debug,
            })
        }
    }
}

#[derive(Debug)]
pub enum Args {
    Run {
        script: String,
        files: Vec<String>,
        quiet: bool,
        in_place: bool,
        dump: bool,
        max_chunk: Option<usize>,
        debug: bool,
    },
    Config {
        show: bool,
        reset: bool,
    },
}
