mod cli;

use anyhow::{Context, Result};
use cli::{Args, parse_args};
use colored::Colorize;
use sedrun::config::{self, Config};
use sedrun::input::{BufLineSource, Concat};
use sedrun::{Engine, Program, logger, script};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tempfile::NamedTempFile;
use tracing::info;

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        process::exit(1);
    }
}

fn try_main() -> Result<()> {
    match parse_args()? {
        Args::Run {
            script,
            files,
            quiet,
            in_place,
            dump,
            max_chunk,
            debug,
        } => {
            let config = load_config_or_default();
            if let Some(path) = logger::init_debug_logging(debug || config.debug(), config.log_level()) {
                info!(log = %path.display(), "debug logging enabled");
            }

            let script = script::load_script(Path::new(&script))?;
            let program = script
                .compile(quiet || config.quiet())
                .context("Failed to compile script")?;

            if dump {
                print!("{}", program);
                return Ok(());
            }

            let max_chunk = max_chunk.unwrap_or_else(|| config.max_chunk_bytes());
            let file_paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();

            if in_place {
                for path in &file_paths {
                    edit_in_place(&program, path, max_chunk)?;
                }
            } else {
                run_to_stdout(&program, &file_paths, max_chunk)?;
            }
        }
        Args::Config { show, reset } => manage_config(show, reset)?,
    }

    Ok(())
}

/// Configuration problems fall back to defaults; they never block a run
fn load_config_or_default() -> Config {
    match config::load_config() {
        Ok(config) => match config::validate_config(&config) {
            Ok(()) => config,
            Err(e) => {
                eprintln!("Warning: {:#}; using defaults", e);
                Config::default()
            }
        },
        Err(e) => {
            eprintln!("Warning: could not load config: {:#}", e);
            Config::default()
        }
    }
}

/// Run all inputs as one stream to stdout (stdin when no files are given)
fn run_to_stdout(program: &Program, files: &[PathBuf], max_chunk: usize) -> Result<()> {
    let stdout = io::stdout();
    let output = BufWriter::new(stdout.lock());
    let mut program = program.clone();

    let summary = if files.is_empty() {
        let source = BufLineSource::with_max_chunk(io::stdin().lock(), max_chunk);
        Engine::new(source, output).run(&mut program)?
    } else {
        let mut sources = Vec::with_capacity(files.len());
        for path in files {
            let file = File::open(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            sources.push(BufLineSource::with_max_chunk(BufReader::new(file), max_chunk));
        }
        Engine::new(Concat::new(sources), output).run(&mut program)?
    };

    info!(lines = summary.lines, "processed input");
    Ok(())
}

/// Run one file through a fresh copy of the program and atomically replace it
fn edit_in_place(program: &Program, file_path: &Path, max_chunk: usize) -> Result<()> {
    let parent_dir = match file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // Create temp file in same directory as target (for atomic rename)
    let temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temp file in {}", parent_dir.display()))?;

    let input = File::open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let summary = {
        let source = BufLineSource::with_max_chunk(BufReader::new(input), max_chunk);
        let mut writer = BufWriter::new(temp_file.as_file());
        let mut program = program.clone();
        let summary = Engine::new(source, &mut writer)
            .run(&mut program)
            .with_context(|| format!("Failed to process {}", file_path.display()))?;
        writer
            .flush()
            .with_context(|| "Failed to flush temp file")?;
        summary
    }; // writer dropped here

    temp_file
        .persist(file_path)
        .with_context(|| format!("Failed to persist temp file to {}", file_path.display()))?;

    info!(file = %file_path.display(), lines = summary.lines, "edited in place");
    Ok(())
}

fn manage_config(show: bool, reset: bool) -> Result<()> {
    let path = config::config_file_path()?;

    if reset {
        config::save_default_config()?;
        println!("Configuration reset: {}", path.display());
        return Ok(());
    }

    if show {
        let config = config::load_config()?;
        config::validate_config(&config)?;
        let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        print!("{}", text);
        return Ok(());
    }

    println!("{}", path.display());
    println!("log: {}", logger::get_current_log_path().display());
    Ok(())
}
