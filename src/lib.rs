//! `polygonize-round` library crate.
//!
//! Converts a raster into polygons (one per connected region of equal,
//! optionally rounded, pixel value) by driving the GDAL command-line tools:
//!
//! 1. `gdal_calc.py` quantizes the source into a temporary raster
//! 2. `gdal_polygonize.py` extracts regions into the destination layer
//! 3. `ogrinfo` rewrites the region attribute to its final name, type and scale
//!
//! The binary (`polygonize`) is a thin wrapper around this library so the
//! arithmetic, naming and orchestration are testable without spawning GDAL.

pub mod app;
pub mod cli;
pub mod context;
pub mod domain;
pub mod error;
pub mod gdal;
pub mod logging;
pub mod quantize;
pub mod report;
