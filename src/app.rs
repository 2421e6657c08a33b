//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads tool configuration and sets up logging
//! - parses and validates CLI arguments (including the GDAL version check)
//! - derives the quantization plan and the run context
//! - runs the polygonize pipeline

use std::ffi::OsString;

use crate::cli::validate::validate;
use crate::context::RunContext;
use crate::error::AppError;
use crate::gdal::{SystemRunner, ToolPaths, ToolRunner};
use crate::quantize::QuantizationPlan;
use crate::report::Reporter;

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineState};

/// Entry point for the `polygonize` binary.
pub fn run() -> Result<(), AppError> {
    let tools = ToolPaths::from_env();
    crate::logging::init();
    run_with(std::env::args_os(), &tools, &SystemRunner)
}

/// Run with explicit argv, tool names and process runner.
pub fn run_with<I, T>(argv: I, tools: &ToolPaths, runner: &dyn ToolRunner) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let Some(cli) = crate::cli::parse_from(argv)? else {
        return Ok(());
    };
    let options = validate(&cli, runner, tools)?;

    let plan = QuantizationPlan::new(options.round, options.precision);
    let ctx = RunContext::new(&options);
    tracing::info!(
        input = %options.input.display(),
        output = %options.output.display(),
        round = options.round,
        precision = options.precision,
        field_type = ?plan.field_type(),
        token = ctx.token(),
        "starting run"
    );

    let reporter = Reporter::new(options.quiet);
    Pipeline::new(&options, plan, &ctx, tools, runner, reporter).execute()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::ErrorKind;
    use crate::gdal::ToolOutput;
    use crate::gdal::testing::ScriptedRunner;

    fn gdal_ok() -> ToolOutput {
        ToolOutput {
            status: Some(0),
            stdout: "GDAL 3.6.2, released 2023/01/02\n".to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn end_to_end_with_scripted_tools() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dem.tif");
        fs::write(&input, b"raster").unwrap();
        let output = dir.path().join("classes.shp");

        let runner = ScriptedRunner::new().then(gdal_ok());
        run_with(
            [
                "polygonize",
                "-i",
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "-r",
                "5",
                "-q",
            ],
            &ToolPaths::default(),
            &runner,
        )
        .unwrap();

        assert_eq!(
            runner.programs(),
            vec!["gdalinfo", "gdal_calc.py", "gdal_polygonize.py", "ogrinfo", "ogrinfo", "ogrinfo"]
        );
    }

    #[test]
    fn validation_failure_runs_no_tools() {
        let runner = ScriptedRunner::new();
        let err = run_with(
            ["polygonize", "-i", "/definitely/missing.tif", "-o", "out.shp"],
            &ToolPaths::default(),
            &runner,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.exit_code(), 1);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn help_is_not_an_error() {
        let runner = ScriptedRunner::new();
        run_with(["polygonize", "--version"], &ToolPaths::default(), &runner).unwrap();
        assert!(runner.calls.borrow().is_empty());
    }
}
