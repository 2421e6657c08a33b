//! `gdal_calc.py` invocation: writes the quantized temporary raster.

use std::path::{Path, PathBuf};

use crate::gdal::Invocation;
use crate::quantize::CalcExpr;

/// Arguments for one raster-calculator run over a single band.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterCalc {
    pub input: PathBuf,
    pub band: Option<u32>,
    pub outfile: PathBuf,
    pub expr: CalcExpr,
}

impl RasterCalc {
    pub fn new(input: &Path, outfile: &Path, expr: CalcExpr) -> Self {
        Self {
            input: input.to_path_buf(),
            band: None,
            outfile: outfile.to_path_buf(),
            expr,
        }
    }

    pub fn band(mut self, band: Option<u32>) -> Self {
        self.band = band;
        self
    }

    pub fn invocation(&self, program: &str) -> Invocation {
        let mut inv = Invocation::new(program)
            .arg("--overwrite")
            .arg("--creation-option=COMPRESS=LZW")
            .arg("-A")
            .arg(self.input.to_string_lossy());
        if let Some(band) = self.band {
            inv = inv.arg(format!("--A_band={band}"));
        }
        inv.arg(format!("--outfile={}", self.outfile.to_string_lossy()))
            .arg(format!("--calc={}", self.expr))
    }
}
