//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::synthetic_adapter::SyntheticAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::builtins::{BuiltinDoc, Builtins, Category};
use crate::domain::config_validation::{
    log_level, validate_run_config, validate_source, InputSource, RunConfig, DEFAULT_LOG_LEVEL,
    MIN_LIMIT,
};
use crate::domain::docstrings::get_docstrings;
use crate::domain::error::{LangError, TradelangError};
use crate::domain::eval;
use crate::domain::input::InputSeries;
use crate::domain::metrics::AnnualizedMetrics;
use crate::domain::program;
use crate::ports::data_port::{DataPort, InputRequest};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradelang", about = "Time-series expression language and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a program over market data and backtest its output
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        program: PathBuf,
        #[arg(long)]
        instrument: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse and lower a program, printing its instruction listing
    Check {
        #[arg(short, long)]
        program: PathBuf,
    },
    /// List builtin names with their documentation
    Builtins {
        #[arg(long)]
        category: Option<Category>,
    },
    /// List instruments the configured input source can serve
    Instruments {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Cli {
    /// Fallback log filter for commands that take a config file: its
    /// `[logging] level`, else the default.
    pub fn log_level(&self) -> String {
        let config_path = match &self.command {
            Command::Run { config, .. } | Command::Instruments { config } => Some(config),
            Command::Check { .. } | Command::Builtins { .. } => None,
        };
        config_path
            .and_then(|p| FileConfigAdapter::from_file(p).ok())
            .map(|c| log_level(&c))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            program,
            instrument,
            output,
            dry_run,
        } => run_program(
            &config,
            &program,
            instrument.as_deref(),
            output.as_deref(),
            dry_run,
        ),
        Command::Check { program } => run_check(&program),
        Command::Builtins { category } => run_builtins(category),
        Command::Instruments { config } => run_instruments(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn read_program(path: &Path) -> Result<String, ExitCode> {
    fs::read_to_string(path).map_err(|e| {
        let err = TradelangError::Io(e);
        eprintln!("error: failed to read {}: {err}", path.display());
        ExitCode::from(&err)
    })
}

/// Print `err`, with a caret line under the offending source text when it
/// came from the language front end.
fn report_error(err: &TradelangError, source: &str) -> ExitCode {
    match err {
        TradelangError::Lang(e) => eprintln!("error: {}", e.display_with_context(source)),
        other => eprintln!("error: {other}"),
    }
    err.into()
}

fn data_port_for(source: &InputSource) -> Box<dyn DataPort> {
    match source {
        InputSource::Synthetic => Box::new(SyntheticAdapter::new()),
        InputSource::Csv { data_dir } => Box::new(CsvAdapter::new(data_dir.clone())),
    }
}

fn run_program(
    config_path: &Path,
    program_path: &Path,
    instrument_override: Option<&str>,
    output_path: Option<&Path>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate run config
    let mut config = match validate_run_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(instrument) = instrument_override {
        config.instrument = instrument.to_string();
    }

    // Stage 3: Read program
    eprintln!("Loading program from {}", program_path.display());
    let source = match read_program(program_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let docs = get_docstrings(&source);
    eprintln!("Program: {}", docs.name);

    let builtins = Builtins::standard();

    if dry_run {
        return match program::check(&source, &builtins) {
            Ok(ir) => {
                eprintln!("\nProgram lowered to {} instructions", ir.len());
                eprintln!("\nInput:");
                match &config.source {
                    InputSource::Synthetic => eprintln!("  source: synthetic"),
                    InputSource::Csv { data_dir } => {
                        eprintln!("  source: csv ({})", data_dir.display())
                    }
                }
                eprintln!("  instrument: {}", config.instrument);
                eprintln!("  limit: {}", config.limit);
                eprintln!("  frequency: {}", config.frequency);
                eprintln!("\nDry run complete: configuration and program are valid");
                ExitCode::SUCCESS
            }
            Err(e) => report_error(&TradelangError::from(e), &source),
        };
    }

    // Stages 4-7: fetch, evaluate, backtest, annualise
    let data_port = data_port_for(&config.source);
    let outcome = match run_pipeline(data_port.as_ref(), &source, &builtins, &config) {
        Ok(o) => o,
        Err(e) => return report_error(&e, &source),
    };

    eprint!("\n{}", format_summary(&outcome, &config));

    // Stage 8: Report
    if let Some(path) = output_path {
        if let Err(e) = CsvReportAdapter::new().write(&outcome.result, &outcome.input, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Report written to {}", path.display());
    }

    ExitCode::SUCCESS
}

/// Everything a `run` produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub input: InputSeries,
    pub result: BacktestResult,
    pub annualized: AnnualizedMetrics,
}

/// Check `source`, fetch the configured input, evaluate and backtest.
///
/// The program is checked before any data is fetched.
pub fn run_pipeline(
    data_port: &dyn DataPort,
    source: &str,
    builtins: &Builtins,
    config: &RunConfig,
) -> Result<RunOutcome, TradelangError> {
    let ir = program::check(source, builtins)?;

    let request = InputRequest {
        instrument: config.instrument.clone(),
        limit: config.limit,
        frequency: config.frequency,
    };
    let input = data_port.fetch_input(&request)?;
    if input.len() < MIN_LIMIT {
        return Err(TradelangError::InsufficientData {
            instrument: config.instrument.clone(),
            samples: input.len(),
            minimum: MIN_LIMIT,
        });
    }
    info!(instrument = %config.instrument, samples = input.len(), "input loaded");

    let bound = builtins.with_inputs(&input.values());
    let output = eval::eval(&ir, &bound).map_err(LangError::from)?;
    let result = run_backtest(&input, &output, config.cost_rate);
    let annualized =
        AnnualizedMetrics::compute(&result.metrics, input.len() - 1, config.frequency);
    info!(
        total_return = result.metrics.total_return,
        max_drawdown = result.metrics.max_drawdown,
        "backtest complete"
    );

    Ok(RunOutcome {
        input,
        result,
        annualized,
    })
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

fn ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

pub fn format_summary(outcome: &RunOutcome, config: &RunConfig) -> String {
    let m = &outcome.result.metrics;
    let a = &outcome.annualized;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Backtest: {} ({} samples at {})",
        config.instrument,
        outcome.input.len(),
        config.frequency
    );
    let _ = writeln!(out, "  Total return:      {}", percent(Some(m.total_return)));
    let _ = writeln!(out, "  Max drawdown:      {}", percent(Some(m.max_drawdown)));
    let _ = writeln!(out, "  Volatility:        {}", ratio(Some(m.volatility)));
    let _ = writeln!(out, "  Sharpe:            {}", ratio(m.sharpe));
    let _ = writeln!(out, "  Annualized return: {}", percent(a.annualized_return));
    let _ = writeln!(out, "  Annualized sharpe: {}", ratio(a.annualized_sharpe));
    out
}

fn run_check(program_path: &Path) -> ExitCode {
    eprintln!("Checking program: {}", program_path.display());
    let source = match read_program(program_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let docs = get_docstrings(&source);
    println!("Name: {}", docs.name);
    if let Some(description) = &docs.description {
        println!("Description: {description}");
    }

    match program::check(&source, &Builtins::standard()) {
        Ok(ir) => {
            println!("\n{ir}");
            eprintln!("Program is valid ({} instructions)", ir.len());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&TradelangError::from(e), &source),
    }
}

/// `name arg1 arg2`, or just the name for references.
pub fn signature(doc: &BuiltinDoc) -> String {
    std::iter::once(doc.name)
        .chain(doc.arg_names.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builtin help grouped by category, optionally restricted to one.
pub fn format_builtins(builtins: &Builtins, only: Option<Category>) -> String {
    let docs = builtins.docs();
    let mut out = String::new();
    for category in Category::ALL {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        let group: Vec<&BuiltinDoc> = docs.iter().filter(|d| d.category == category).collect();
        if group.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{category}:");
        for doc in group {
            let _ = writeln!(out, "  {:<24} {}", signature(doc), doc.doc);
        }
    }
    out
}

fn run_builtins(category: Option<Category>) -> ExitCode {
    print!("{}", format_builtins(&Builtins::standard(), category));
    ExitCode::SUCCESS
}

fn run_instruments(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let source = match validate_source(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let instruments = match data_port_for(&source).list_instruments() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match source {
        InputSource::Synthetic => {
            eprintln!("Synthetic source: any instrument id is accepted");
        }
        InputSource::Csv { data_dir } if instruments.is_empty() => {
            eprintln!("No instruments found in {}", data_dir.display());
        }
        InputSource::Csv { .. } => {
            for instrument in &instruments {
                println!("{instrument}");
            }
            eprintln!("{} instruments found", instruments.len());
        }
    }
    ExitCode::SUCCESS
}
