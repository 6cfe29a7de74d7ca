//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_qm_diagnostics::{Diagnostic, TransferError};
use serde::Serialize;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stderr().is_terminal()),
    }
}

/// Format an error for display.
///
/// Conversion and transfer errors render as their diagnostic, with code and
/// help text; anything else is shown with its context chain.
pub fn format_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<TransferError>() {
        Some(transfer) => {
            let context = error.to_string();
            let diagnostic = format_diagnostic(&transfer.to_diagnostic());
            if context == transfer.to_string() {
                diagnostic
            } else {
                format!("{}\n  {} {}", diagnostic, "while:".dimmed(), context)
            }
        }
        None => format!("{} {:#}", "Error:".red().bold(), error),
    }
}

/// Format a diagnostic as `error[QM0102]: message`, plus its help line
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = format!("error[{}]:", diagnostic.code);
    let label = label.as_str().red().bold();
    let mut line = format!("{} {}", label, diagnostic.message);
    if let Some(help) = &diagnostic.help {
        line.push_str(&format!("\n  {} {}", "help:".cyan(), help));
    }
    line
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!("{}", format_success(&format!("Output written to {}", path.display())));
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Serialize a value as JSON
pub fn format_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}
