//! Command-line parsing.
//!
//! clap only collects raw values here. Range and existence checks live in
//! [`validate`] so every violation produces the same single-line error and
//! exit code 1.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;

use crate::error::AppError;

pub mod validate;

const AFTER_HELP: &str = "\
This utility creates vector polygons for all connected regions of pixels in the
raster sharing a common pixel value. Each polygon is created with an attribute
indicating the pixel value of that polygon. A raster mask may also be provided
to determine which pixels are eligible for processing.

The utility will create the output vector datasource if it does not already exist,
using the default format of gdal_polygonize.py unless --format is given.

It wraps gdal_polygonize.py and adds the --round option: pixel values are grouped
into multiples of the round value before polygonizing, and the output attribute
is rescaled back to real values afterwards (keeping --precision decimal places
when the round value is below 1).

Environment: GDALINFO, GDAL_CALC, GDAL_POLYGONIZE and OGRINFO override the tool
executables (a .env file in the working directory is honoured). RUST_LOG controls
diagnostic logging.";

/// Top-level CLI.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "polygonize",
    version,
    about = "Polygonize a raster after rounding its pixel values",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// The source raster file from which polygons are derived.
    #[arg(short = 'i', long, value_name = "RASTER_FILE")]
    pub input: Option<PathBuf>,

    /// The destination vector file to which the polygons will be written.
    #[arg(short = 'o', long, value_name = "VECTOR_FILE")]
    pub output: Option<PathBuf>,

    /// Connectedness (either 4 or 8).
    #[arg(short = 'c', long, default_value = "4")]
    pub connectedness: String,

    /// Do not use the default validity mask for the input band (nodata, alpha masks).
    #[arg(short = 'n', long, conflicts_with = "mask")]
    pub nomask: bool,

    /// Use the first band of the specified file as a validity mask (zero is invalid).
    #[arg(short = 'm', long, value_name = "FILENAME")]
    pub mask: Option<PathBuf>,

    /// The band of the input raster to build the polygons from.
    #[arg(short = 'b', long, value_name = "BAND_INDEX", value_parser = clap::value_parser!(u32).range(1..))]
    pub band: Option<u32>,

    /// OGR driver for the output file.
    #[arg(short = 'f', long, value_name = "OGR_FORMAT")]
    pub format: Option<String>,

    /// Name of the layer holding the polygon features (defaults to the output file name).
    #[arg(short = 'l', long, value_name = "LAYER_NAME")]
    pub layer: Option<String>,

    /// Name of the output attribute field.
    #[arg(long = "fieldname", value_name = "FIELD_NAME", default_value = "DN")]
    pub field_name: String,

    /// Round value: pixel values are grouped into multiples of it (0 disables rounding).
    #[arg(short = 'r', long, value_name = "ROUND_VALUE", default_value = "1", allow_hyphen_values = true)]
    pub round: String,

    /// Decimal places kept when the round value is below 1 (1 to 6).
    #[arg(short = 'p', long, value_name = "PRECISION", default_value = "3", allow_hyphen_values = true)]
    pub precision: String,

    /// Suppress the progress monitor and routine messages.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Abort when the attribute rewrite reports errors (otherwise they are warnings).
    #[arg(long)]
    pub strict: bool,
}

/// Parse argv. `Ok(None)` means help or version was printed and the run is over.
pub fn parse_from<I, T>(argv: I) -> Result<Option<Cli>, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) if matches!(err.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            err.print()
                .map_err(|e| AppError::io(format!("Failed to print help: {e}")))?;
            Ok(None)
        }
        Err(err) => {
            let rendered = err.to_string();
            let first = rendered
                .lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("invalid arguments");
            Err(AppError::validation(
                first.trim().trim_start_matches("error:").trim().to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults() {
        let cli = parse_from(["polygonize", "-i", "dem.tif", "-o", "classes.shp"])
            .unwrap()
            .unwrap();
        assert_eq!(cli.connectedness, "4");
        assert_eq!(cli.round, "1");
        assert_eq!(cli.precision, "3");
        assert_eq!(cli.field_name, "DN");
        assert!(!cli.nomask);
        assert!(cli.mask.is_none());
        assert!(cli.layer.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn short_and_long_flags() {
        let cli = parse_from([
            "polygonize", "-i", "dem.tif", "-o", "classes.shp", "-c", "8", "-b", "2", "-f",
            "ESRI Shapefile", "-l", "bands", "--fieldname", "height", "-r", "0.5", "-p", "2", "-q",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cli.connectedness, "8");
        assert_eq!(cli.band, Some(2));
        assert_eq!(cli.format.as_deref(), Some("ESRI Shapefile"));
        assert_eq!(cli.layer.as_deref(), Some("bands"));
        assert_eq!(cli.field_name, "height");
        assert_eq!(cli.round, "0.5");
        assert_eq!(cli.precision, "2");
        assert!(cli.quiet);
    }

    #[test]
    fn negative_round_reaches_the_validator() {
        let cli = parse_from(["polygonize", "-i", "a.tif", "-o", "b.shp", "-r", "-1"])
            .unwrap()
            .unwrap();
        assert_eq!(cli.round, "-1");
    }

    #[test]
    fn mask_flags_conflict() {
        let err = parse_from(["polygonize", "-i", "a.tif", "-o", "b.shp", "-n", "-m", "mask.tif"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.exit_code(), 1);
        assert!(!err.message().contains('\n'));
    }

    #[test]
    fn unknown_flag_is_exit_one() {
        let err = parse_from(["polygonize", "--bogus"]).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
