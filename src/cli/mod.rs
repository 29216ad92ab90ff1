//! The paramset Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use crate::cases::{CaseQuery, Catalog, TestCase};
use crate::cli::args::{Command, ParamsetArgs};
use crate::discovery::MatrixDiscoverer;
use crate::errors::{print_error, ParamError};
use crate::matrix::MatrixFile;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_logging();
    let args = ParamsetArgs::parse();

    let result = match args.command {
        Command::Expand {
            file,
            json,
            limit,
            query,
        } => handle_expand(&file, json, limit, query.as_deref()),
        Command::Count { file } => handle_count(&file),
        Command::List { path } => handle_list(path),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

/// Installs the stderr log subscriber. `PARAMSET_LOG` holds the filter.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env("PARAMSET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact();
    let _ = subscriber.try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_expand(
    file: &Path,
    json: bool,
    limit: Option<usize>,
    query: Option<&str>,
) -> Result<(), ParamError> {
    let catalog = Catalog::from_matrix(&MatrixFile::load(file)?);
    let query = query
        .map(|text| CaseQuery::parse(&catalog.suite, text))
        .transpose()?;
    let cases: Box<dyn Iterator<Item = Result<TestCase, ParamError>> + '_> = match &query {
        Some(query) => Box::new(catalog.select(query)),
        None => Box::new(catalog.cases()),
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let write_err = |source| ParamError::Io {
        path: "<stdout>".to_string(),
        source,
    };

    for case in cases.take(limit.unwrap_or(usize::MAX)) {
        output::print_case(&mut out, &case?, json).map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

fn handle_count(file: &Path) -> Result<(), ParamError> {
    let catalog = Catalog::from_matrix(&MatrixFile::load(file)?);
    output::print_counts(&catalog.counts()?);
    Ok(())
}

fn handle_list(path: PathBuf) -> Result<(), ParamError> {
    let loaded = MatrixDiscoverer::load_all(&path)?;

    let mut passed = 0;
    let mut failed = 0;
    let mut total_cases = 0;
    for (file, result) in loaded {
        let label = file.display().to_string();
        let counted = result.and_then(|matrix| {
            let catalog = Catalog::from_matrix(&matrix);
            let counts = catalog.counts()?;
            Ok((matrix.suite, counts.iter().map(|(_, n)| n).sum::<usize>()))
        });
        match counted {
            Ok((suite, cases)) => {
                passed += 1;
                total_cases += cases;
                output::print_file_ok(&label, &suite, cases);
            }
            Err(e) => {
                failed += 1;
                output::print_file_failed(&label);
                print_error(e);
            }
        }
    }

    output::print_summary(passed, failed, total_cases);
    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}
