//! GDAL command-line collaborators.
//!
//! Each tool gets a small builder that produces an [`Invocation`] (program +
//! argument vector). Nothing is ever routed through a shell, so paths and
//! SQL containing spaces or quotes reach the tool verbatim.
//!
//! - `calc`: `gdal_calc.py` (quantized temporary raster)
//! - `polygonize`: `gdal_polygonize.py` (region extraction)
//! - `ogr`: `ogrinfo -sql` (attribute rewrite)
//! - `version`: `gdalinfo --version` (capability check)

use std::fmt;
use std::process::{Command, Stdio};

use crate::error::AppError;

pub mod calc;
pub mod ogr;
pub mod polygonize;
pub mod version;

/// Executable names, overridable through the environment (or a `.env` file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub gdalinfo: String,
    pub gdal_calc: String,
    pub gdal_polygonize: String,
    pub ogrinfo: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            gdalinfo: "gdalinfo".to_string(),
            gdal_calc: "gdal_calc.py".to_string(),
            gdal_polygonize: "gdal_polygonize.py".to_string(),
            ogrinfo: "ogrinfo".to_string(),
        }
    }
}

impl ToolPaths {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let var = |key: &str, fallback: String| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            gdalinfo: var("GDALINFO", defaults.gdalinfo),
            gdal_calc: var("GDAL_CALC", defaults.gdal_calc),
            gdal_polygonize: var("GDAL_POLYGONIZE", defaults.gdal_polygonize),
            ogrinfo: var("OGRINFO", defaults.ogrinfo),
        }
    }
}

/// A fully-formed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Shell-like rendering, for echoing to the user only.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_for_display(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_for_display(arg))?;
        }
        Ok(())
    }
}

fn quote_for_display(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Captured result of one synchronous invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit status; `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external commands to completion.
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, AppError>;
}

/// Spawns real processes and blocks until they exit. There is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, AppError> {
        tracing::debug!(program = %invocation.program, args = ?invocation.args, "spawning");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AppError::io(format!("Failed to run '{}': {e}", invocation.program)))?;

        let result = ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            program = %invocation.program,
            status = ?result.status,
            stderr_len = result.stderr.len(),
            "finished"
        );
        Ok(result)
    }
}
