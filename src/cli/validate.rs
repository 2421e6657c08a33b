//! Argument validation: raw CLI values -> `RunOptions`.
//!
//! Checks run in a fixed order and stop at the first violation:
//!
//! 1. input and output are present
//! 2. input is an existing regular file
//! 3. the output file name has no dot besides its extension
//! 4. connectedness is 4 or 8
//! 5. round is a finite number `>= 0`
//! 6. precision is an integer in `1..=6`
//! 7. the mask file (if any) exists
//! 8. GDAL is installed and at least 1.10
//!
//! Only the last check touches anything outside the filesystem.

use std::path::Path;

use crate::cli::Cli;
use crate::domain::{Connectedness, MaskPolicy, RunOptions, file_stem};
use crate::error::AppError;
use crate::gdal::{ToolPaths, ToolRunner, version};

pub const PRECISION_RANGE: std::ops::RangeInclusive<u32> = 1..=6;

/// Validate everything that can be checked without GDAL.
pub fn validate_args(cli: &Cli) -> Result<RunOptions, AppError> {
    let input = cli
        .input
        .clone()
        .ok_or_else(|| AppError::validation("argument input is required"))?;
    let output = cli
        .output
        .clone()
        .ok_or_else(|| AppError::validation("argument output is required"))?;

    if !input.is_file() {
        return Err(AppError::validation(format!(
            "file {} does not exist",
            input.display()
        )));
    }

    let stem = file_stem(&output);
    if stem.is_empty() || stem.contains('.') {
        return Err(AppError::validation(
            "argument output can't have dots in the vector file name",
        ));
    }

    let connectedness = parse_connectedness(&cli.connectedness)?;
    let round = parse_round(&cli.round)?;
    let precision = parse_precision(&cli.precision)?;
    let mask = mask_policy(cli.nomask, cli.mask.as_deref())?;

    let layer = cli
        .layer
        .clone()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| stem.to_string());

    Ok(RunOptions {
        input,
        output,
        band: cli.band,
        connectedness,
        round,
        precision,
        mask,
        format: cli.format.clone(),
        layer,
        field_name: cli.field_name.clone(),
        quiet: cli.quiet,
        strict: cli.strict,
    })
}

/// Full validation, ending with the GDAL version check.
pub fn validate(cli: &Cli, runner: &dyn ToolRunner, tools: &ToolPaths) -> Result<RunOptions, AppError> {
    let options = validate_args(cli)?;
    version::require_supported(runner, &tools.gdalinfo)?;
    Ok(options)
}

fn parse_connectedness(raw: &str) -> Result<Connectedness, AppError> {
    match raw.trim() {
        "4" => Ok(Connectedness::Four),
        "8" => Ok(Connectedness::Eight),
        _ => Err(AppError::validation(
            "argument connectedness should be either 4 or 8",
        )),
    }
}

fn parse_round(raw: &str) -> Result<f64, AppError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.abs()),
        _ => Err(AppError::validation("argument round should be >= 0")),
    }
}

fn parse_precision(raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<u32>() {
        Ok(p) if PRECISION_RANGE.contains(&p) => Ok(p),
        _ => Err(AppError::validation(
            "argument precision should be an integer between 1 and 6",
        )),
    }
}

fn mask_policy(nomask: bool, mask: Option<&Path>) -> Result<MaskPolicy, AppError> {
    match (nomask, mask) {
        (true, Some(_)) => Err(AppError::validation(
            "arguments nomask and mask can't be used together",
        )),
        (true, None) => Ok(MaskPolicy::Disabled),
        (false, Some(path)) if !path.is_file() => Err(AppError::validation(format!(
            "mask file {} does not exist",
            path.display()
        ))),
        (false, Some(path)) => Ok(MaskPolicy::File(path.to_path_buf())),
        (false, None) => Ok(MaskPolicy::Default),
    }
}
