//! Handles all user-facing output for the CLI.
//!
//! Case listings go to stdout uncolored so they can be piped; summaries use
//! `termcolor` and respect whether stdout is a terminal.

use std::io::{self, Write};

use serde_json::json;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cases::TestCase;

// ============================================================================
// CASE LISTINGS
// ============================================================================

pub fn print_case(out: &mut impl Write, case: &TestCase, as_json: bool) -> io::Result<()> {
    if as_json {
        let line = json!({ "case": case.id(), "params": case.params });
        writeln!(out, "{}", line)
    } else {
        writeln!(out, "{}", case)
    }
}

pub fn print_counts(counts: &[(String, usize)]) {
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, count) in counts {
        println!("  {:<width$}  {}", name, count, width = width);
    }
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    println!("Total: {} cases", total);
    let _ = stdout.reset();
}

// ============================================================================
// DISCOVERY REPORT
// ============================================================================

pub fn print_file_ok(label: &str, suite: &str, cases: usize) {
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    print!("✓");
    let _ = stdout.reset();
    println!(" {} ({}): {} cases", label, suite, cases);
}

pub fn print_file_failed(label: &str) {
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
    print!("✗");
    let _ = stdout.reset();
    println!(" {}", label);
}

pub fn print_summary(passed: usize, failed: usize, cases: usize) {
    let mut stdout = StandardStream::stdout(color_choice());
    println!();
    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    println!("Matrix Summary");
    let _ = stdout.reset();
    if passed > 0 {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
        println!("✓ Expanded: {} files, {} cases", passed, cases);
    }
    if failed > 0 {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
        println!("✗ Failed:   {} files", failed);
    }
    if passed == 0 && failed == 0 {
        println!("No matrix files found.");
    }
    let _ = stdout.reset();
}

fn color_choice() -> ColorChoice {
    if io::IsTerminal::is_terminal(&io::stdout()) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
