//! CLI entry point for the pyramid solver.
//!
//! Usage:
//!   pyramid-solver solve <puzzle.json> [options]
//!   pyramid-solver solve --stdin [options]
//!   pyramid-solver example [options]
//!
//! Options:
//!   --max-solutions <n>      Stop after this many solutions (default: 10)
//!   --global-max-value <v>   Guess bound for cells with no known value above (default: 10000)
//!   --json                   Print a JSON report instead of the pyramids
//!   --log-level <level>      off, error, warn, info, debug or trace (default: warn)

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, Result, WrapErr};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;

use pyramid_solver::{search, Pyramid, PyramidPuzzle, SolverConfig, SolverResult, Value};

const EXAMPLE_PUZZLE: &str = include_str!("../puzzles/example.json");

#[derive(Parser)]
#[command(name = "pyramid-solver")]
#[command(about = "Constraint-propagating solver for number pyramid puzzles")]
#[command(version)]
struct Cli {
    /// Verbosity of the log written to stderr
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a pyramid read from a JSON file
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        #[command(flatten)]
        options: SolveOptions,
    },
    /// Solve the bundled five-layer example pyramid
    Example {
        #[command(flatten)]
        options: SolveOptions,
    },
}

#[derive(Args)]
struct SolveOptions {
    /// Stop searching once this many solutions have been found
    #[arg(long, default_value = "10")]
    max_solutions: usize,

    /// Guess bound for cells with no known value above them
    #[arg(long, default_value = "10000")]
    global_max_value: Value,

    /// Print a JSON report instead of the pretty-printed pyramids
    #[arg(long)]
    json: bool,
}

impl SolveOptions {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            max_solutions: self.max_solutions,
            global_max_value: self.global_max_value,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Output format for a solve run
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    solution_count: usize,
    search_exhausted: bool,
    candidates_tried: usize,
    branches_pruned: usize,
    dead_ends: usize,
    time_elapsed_ms: u64,
    solutions: Vec<Pyramid>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    simplelog::TermLogger::init(
        cli.log_level.into(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let (json_content, options) = match cli.command {
        Commands::Solve {
            file,
            stdin,
            options,
        } => {
            let json_content = if stdin {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .wrap_err("Failed to read from stdin")?;
                buffer
            } else if let Some(path) = file {
                fs::read_to_string(&path)
                    .wrap_err_with(|| format!("Failed to read file {:?}", path))?
            } else {
                bail!("Must provide either a file path or --stdin");
            };
            (json_content, options)
        }
        Commands::Example { options } => (EXAMPLE_PUZZLE.to_string(), options),
    };

    let puzzle = parse_puzzle(&json_content).wrap_err("Error parsing puzzle JSON")?;

    let result = search(&puzzle.layers, &options.config());

    if options.json {
        let output = format_result(puzzle.title, &result);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_solutions(puzzle.title.as_deref(), &result.solutions);
    }

    if result.solutions.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Accept either a bare array of layers or a `{ "title", "layers" }` object.
fn parse_puzzle(json_content: &str) -> Result<PyramidPuzzle> {
    let value: serde_json::Value = serde_json::from_str(json_content)?;

    if value.is_object() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(PyramidPuzzle {
            title: None,
            layers: Pyramid::from_json(&value)?,
        })
    }
}

fn format_result(title: Option<String>, result: &SolverResult) -> SolveOutput {
    SolveOutput {
        title,
        solution_count: result.solutions.len(),
        search_exhausted: result.search_exhausted,
        candidates_tried: result.candidates_tried,
        branches_pruned: result.branches_pruned,
        dead_ends: result.dead_ends,
        time_elapsed_ms: result.time_elapsed_ms,
        solutions: result.solutions.clone(),
    }
}

fn print_solutions(title: Option<&str>, solutions: &[Pyramid]) {
    if let Some(title) = title {
        println!("{}\n", title);
    }

    println!("Found {} Solution(s)", solutions.len());

    for (solution_id, solution) in solutions.iter().enumerate() {
        println!("\nSolution #{}:", solution_id + 1);
        println!("{}", solution);
    }
}
