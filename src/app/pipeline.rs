//! The three-stage polygonize pipeline.
//!
//! quantize (`gdal_calc.py`) -> extract (`gdal_polygonize.py`) -> rewrite (`ogrinfo`)
//!
//! Every external call blocks until the tool exits. The first two stages are
//! fatal on error; the rewrite stage only reports its diagnostics unless
//! `--strict` is set. A failure leaves the destination layer as the tools left
//! it; there is no rollback.

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::domain::{MaskPolicy, Outcome, PipelineResult, RunOptions, Stage, StageResult};
use crate::error::AppError;
use crate::gdal::calc::RasterCalc;
use crate::gdal::ogr::AttributeEdit;
use crate::gdal::{Invocation, ToolOutput, ToolPaths, ToolRunner, polygonize};
use crate::quantize::QuantizationPlan;
use crate::report::{self, Reporter};

/// Position of the pipeline; `Failed` is carried by the `Err` path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Quantizing,
    Extracting,
    Rewriting,
    Done,
}

/// Temporary raster that is deleted when dropped unless already removed.
struct TempRaster {
    path: PathBuf,
    armed: bool,
}

impl TempRaster {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    fn remove(mut self) -> std::io::Result<()> {
        self.armed = false;
        fs::remove_file(&self.path)
    }
}

impl Drop for TempRaster {
    fn drop(&mut self) {
        if self.armed && fs::remove_file(&self.path).is_ok() {
            tracing::debug!(path = %self.path.display(), "removed temporary raster after failure");
        }
    }
}

pub struct Pipeline<'a> {
    options: &'a RunOptions,
    plan: QuantizationPlan,
    ctx: &'a RunContext,
    tools: &'a ToolPaths,
    runner: &'a dyn ToolRunner,
    reporter: Reporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        options: &'a RunOptions,
        plan: QuantizationPlan,
        ctx: &'a RunContext,
        tools: &'a ToolPaths,
        runner: &'a dyn ToolRunner,
        reporter: Reporter,
    ) -> Self {
        Self {
            options,
            plan,
            ctx,
            tools,
            runner,
            reporter,
        }
    }

    /// Run all stages in order.
    pub fn execute(&self) -> Result<PipelineResult, AppError> {
        let mut result = PipelineResult::default();
        self.reporter.start();

        enter(PipelineState::Quantizing);
        let raster = self.quantize(&mut result)?;

        enter(PipelineState::Extracting);
        self.extract(&mut result, raster)?;

        enter(PipelineState::Rewriting);
        self.rewrite(&mut result)?;

        enter(PipelineState::Done);
        self.reporter.finish(&result);
        Ok(result)
    }

    fn quantize(&self, result: &mut PipelineResult) -> Result<TempRaster, AppError> {
        self.reporter
            .banner("Creating the temporary raster with gdal_calc.py...");

        let temp = &self.ctx.temp().raster;
        let invocation = RasterCalc::new(&self.options.input, temp, self.plan.calc_expr())
            .band(self.options.band)
            .invocation(&self.tools.gdal_calc);
        self.reporter.command(&invocation);

        let raster = TempRaster::new(temp);
        let output = self.runner.run(&invocation)?;
        self.reporter.tool_stdout(&output);

        let outcome = with_status(report::warning_tolerant(&output), &invocation, &output);
        self.record(result, Stage::Quantizing, &output, outcome)?;
        Ok(raster)
    }

    fn extract(&self, result: &mut PipelineResult, raster: TempRaster) -> Result<(), AppError> {
        self.clear_output();

        self.reporter
            .banner("Creating the vector with gdal_polygonize.py...");
        let invocation = polygonize::invocation(
            &self.tools.gdal_polygonize,
            self.options,
            &raster.path,
            &self.ctx.temp().field,
        );
        self.reporter.command(&invocation);

        let output = self.runner.run(&invocation)?;
        self.reporter.tool_stdout(&output);

        let outcome = with_status(report::zero_tolerance(&output), &invocation, &output);
        self.record(result, Stage::Extracting, &output, outcome)?;

        let path = raster.path.clone();
        if let Err(e) = raster.remove() {
            self.reporter.warning(&format!(
                "could not remove temporary raster {}: {e}",
                path.display()
            ));
        }
        Ok(())
    }

    fn rewrite(&self, result: &mut PipelineResult) -> Result<(), AppError> {
        self.reporter
            .banner("Adjusting the values in the output layer with ogrinfo...");

        let layer = self.options.rewrite_layer();
        for edit in self.attribute_edits() {
            let invocation = edit.invocation(&self.tools.ogrinfo, &self.options.output, layer);
            self.reporter.command(&invocation);

            let output = match self.runner.run(&invocation) {
                Ok(output) => output,
                Err(e) if !self.options.strict => ToolOutput {
                    status: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                },
                Err(e) => return Err(e),
            };
            self.reporter.tool_stdout(&output);

            let outcome = if self.options.strict {
                with_status(report::zero_tolerance(&output), &invocation, &output)
            } else {
                report::advisory(&output)
            };
            if !matches!(outcome, Outcome::Success) {
                tracing::warn!(%edit, "attribute rewrite reported a problem");
            }
            self.record(result, Stage::Rewriting, &output, outcome)?;
        }
        Ok(())
    }

    /// Add the final column, fill it from the temporary one, drop the temporary one.
    pub fn attribute_edits(&self) -> [AttributeEdit; 3] {
        let temp_field = self.ctx.temp().field.clone();
        [
            AttributeEdit::AddColumn {
                field: self.options.field_name.clone(),
                field_type: self.plan.field_type(),
            },
            AttributeEdit::Rescale {
                target: self.options.field_name.clone(),
                source: temp_field.clone(),
                divisor: self.plan.rescale_divisor(),
            },
            AttributeEdit::DropColumn { field: temp_field },
        ]
    }

    /// Best-effort removal of a previous output: every sibling named `<stem>` or
    /// `<stem>.*` (a `<stem>` directory goes with its contents), except the
    /// input, the mask and the temporary raster.
    fn clear_output(&self) {
        let stem = self.options.output_stem();
        let dir = match self.options.output_dir() {
            d if d.as_os_str().is_empty() => Path::new("."),
            d => d,
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        let mut keep = vec![self.options.input.as_path(), self.ctx.temp().raster.as_path()];
        if let MaskPolicy::File(mask) = &self.options.mask {
            keep.push(mask.as_path());
        }

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let matches = name == stem || name.starts_with(&format!("{stem}."));
            if !matches || keep.iter().any(|k| covers(&path, k)) {
                continue;
            }
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match removed {
                Ok(()) => tracing::debug!(path = %path.display(), "removed previous output"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove previous output"),
            }
        }
    }

    fn record(
        &self,
        result: &mut PipelineResult,
        stage: Stage,
        output: &ToolOutput,
        outcome: Outcome,
    ) -> Result<(), AppError> {
        self.reporter.outcome(&outcome);
        result.stages.push(StageResult {
            stage,
            status: output.status,
            outcome: outcome.clone(),
        });
        match outcome {
            Outcome::Fatal(text) => {
                tracing::error!(stage = stage.display_name(), status = ?output.status, "stage failed");
                Err(AppError::external_tool(text))
            }
            Outcome::Success | Outcome::Warning(_) => Ok(()),
        }
    }
}

fn enter(state: PipelineState) {
    tracing::info!(?state, "pipeline state");
}

/// A silent non-zero exit is still a failure.
fn with_status(outcome: Outcome, invocation: &Invocation, output: &ToolOutput) -> Outcome {
    match outcome {
        Outcome::Success if !output.success() => Outcome::Fatal(match output.status {
            Some(code) => format!("{} exited with status {code}", invocation.program),
            None => format!("{} was terminated by a signal", invocation.program),
        }),
        other => other,
    }
}

/// `path` is `kept` itself or a directory holding it.
fn covers(path: &Path, kept: &Path) -> bool {
    match (fs::canonicalize(path), fs::canonicalize(kept)) {
        (Ok(path), Ok(kept)) => kept.starts_with(path),
        _ => kept.starts_with(path),
    }
}
