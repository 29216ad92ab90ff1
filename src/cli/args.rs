//! Defines the command-line arguments and subcommands for the paramset CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "paramset",
    version,
    about = "Expand parameterised test matrices into individual test cases."
)]
pub struct ParamsetArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every case of a matrix file, one per line.
    Expand {
        /// The matrix file to expand.
        #[arg(required = true)]
        file: PathBuf,
        /// Print JSON objects instead of case names.
        #[arg(long)]
        json: bool,
        /// Stop after this many cases.
        #[arg(long)]
        limit: Option<usize>,
        /// Only print cases matching a query such as `suite:test:k=v;*`.
        #[arg(long)]
        query: Option<String>,
    },
    /// Print the number of cases per test and in total.
    Count {
        /// The matrix file to count.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Discover matrix files in a directory and check that each expands.
    List {
        /// The directory to scan.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}
