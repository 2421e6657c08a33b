//! Shared domain types.
//!
//! `RunOptions` is built once by the validator and never mutated afterwards;
//! everything else in the pipeline borrows it.

use std::path::{Path, PathBuf};

/// Pixel adjacency rule used when merging equal-valued pixels into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectedness {
    Four,
    Eight,
}

/// Which validity mask the polygon extractor applies.
///
/// Exactly one policy is active per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskPolicy {
    /// The band's own nodata / alpha mask.
    Default,
    /// No mask at all (`-nomask`).
    Disabled,
    /// First band of an external raster; zero is invalid (`-mask <file>`).
    File(PathBuf),
}

/// Semantic type of the final output attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Real,
}

impl FieldType {
    /// Column type keyword understood by OGR SQL.
    pub fn sql_keyword(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Real => "float",
        }
    }
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// 1-based source band; `None` reads the first band.
    pub band: Option<u32>,
    pub connectedness: Connectedness,
    /// Quantization granularity (`>= 0`).
    pub round: f64,
    /// Decimal places kept when `0 < round < 1` (`1..=6`).
    pub precision: u32,
    pub mask: MaskPolicy,
    /// OGR driver name; `None` lets `gdal_polygonize.py` pick its default.
    pub format: Option<String>,
    pub layer: String,
    pub field_name: String,
    pub quiet: bool,
    /// Treat attribute-rewrite diagnostics as fatal.
    pub strict: bool,
}

impl RunOptions {
    /// File stem of the destination vector (`classes` for `out/classes.shp`).
    pub fn output_stem(&self) -> &str {
        file_stem(&self.output)
    }

    pub fn output_dir(&self) -> &Path {
        parent_dir(&self.output)
    }

    /// Table the attribute rewrite targets. The shapefile driver ignores the
    /// requested layer name and always names the layer after the file stem.
    pub fn rewrite_layer(&self) -> &str {
        if self.writes_shapefile() {
            self.output_stem()
        } else {
            &self.layer
        }
    }

    fn writes_shapefile(&self) -> bool {
        match &self.format {
            Some(format) => format.eq_ignore_ascii_case("ESRI Shapefile"),
            None => self
                .output
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("shp")),
        }
    }
}

pub(crate) fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Pipeline stage identifiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Quantizing,
    Extracting,
    Rewriting,
}

impl Stage {
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::Quantizing => "quantize",
            Stage::Extracting => "extract",
            Stage::Rewriting => "rewrite",
        }
    }
}

/// Classification of one external invocation's diagnostic stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Diagnostic text judged benign; execution continues.
    Warning(String),
    /// Diagnostic text that aborts a fatal stage.
    Fatal(String),
}

impl Outcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal(_))
    }
}

/// Per-stage record collected by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    pub status: Option<i32>,
    pub outcome: Outcome,
}

/// Everything the orchestrator observed during a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineResult {
    pub stages: Vec<StageResult>,
}

impl PipelineResult {
    pub fn warnings(&self) -> impl Iterator<Item = &StageResult> {
        self.stages
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::Warning(_)))
    }
}
