//! Console reporting: stage banners, echoed commands and diagnostic classification.
//!
//! Classification is a pure function over the tool's stderr text; the
//! `Reporter` only decides what gets printed and in which colour.

use crossterm::style::{Stylize, style};

use crate::domain::{Outcome, PipelineResult};
use crate::error::AppError;
use crate::gdal::{Invocation, ToolOutput};

const TAG: &str = "[polygonize]";
const RULE: &str = "==============================";

/// Severity of a non-empty diagnostic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Classify diagnostic text. Blank text is no diagnostic at all.
///
/// Anything mentioning "warning" (any case) is benign; everything else is an error.
pub fn classify(diagnostic: &str) -> Option<Severity> {
    let text = diagnostic.trim();
    if text.is_empty() {
        None
    } else if text.to_lowercase().contains("warning") {
        Some(Severity::Warning)
    } else {
        Some(Severity::Error)
    }
}

/// Outcome of a stage that tolerates warnings but aborts on errors.
pub fn warning_tolerant(output: &ToolOutput) -> Outcome {
    match classify(&output.stderr) {
        None => Outcome::Success,
        Some(Severity::Warning) => Outcome::Warning(output.stderr.trim().to_string()),
        Some(Severity::Error) => Outcome::Fatal(output.stderr.trim().to_string()),
    }
}

/// Outcome of a stage where any diagnostic output aborts the run.
pub fn zero_tolerance(output: &ToolOutput) -> Outcome {
    match classify(&output.stderr) {
        None => Outcome::Success,
        Some(_) => Outcome::Fatal(output.stderr.trim().to_string()),
    }
}

/// Outcome of a stage whose diagnostics never abort the run.
pub fn advisory(output: &ToolOutput) -> Outcome {
    match classify(&output.stderr) {
        None => Outcome::Success,
        Some(_) => Outcome::Warning(output.stderr.trim().to_string()),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn start(&self) {
        if !self.quiet {
            println!("{RULE}");
        }
    }

    pub fn banner(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", style(TAG).green());
        }
    }

    pub fn command(&self, invocation: &Invocation) {
        if !self.quiet {
            println!("{invocation}\n");
        }
    }

    /// Echo whatever the tool wrote to stdout (progress output).
    pub fn tool_stdout(&self, output: &ToolOutput) {
        if !self.quiet && !output.stdout.trim().is_empty() {
            print!("{}", output.stdout);
        }
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{}", style(format!("\n  warning: {message} \n")).yellow());
    }

    pub fn finish(&self, result: &PipelineResult) {
        let warnings = result.warnings().count();
        if warnings > 0 {
            tracing::info!(warnings, "finished with warnings");
        }
        self.banner("All done!");
    }

    pub fn outcome(&self, outcome: &Outcome) {
        if let Outcome::Warning(text) = outcome {
            self.warning(text);
        }
    }
}

/// Print a fatal error in red on stderr.
pub fn print_error(err: &AppError) {
    eprintln!("{}", style(format!("\n  error: {err}\n")).red());
}
