//! `gdal_polygonize.py` invocation.

use std::path::Path;

use crate::domain::{Connectedness, MaskPolicy, RunOptions};
use crate::gdal::Invocation;

/// Build the extractor call for the quantized raster `source`, writing regions
/// into the destination layer under the attribute `field`.
///
/// Band selection is not forwarded: `source` is the single-band calculator
/// output, so the extractor always reads its first band.
pub fn invocation(program: &str, options: &RunOptions, source: &Path, field: &str) -> Invocation {
    let mut inv = Invocation::new(program);

    if options.connectedness == Connectedness::Eight {
        inv = inv.arg("-8");
    }
    match &options.mask {
        MaskPolicy::Default => {}
        MaskPolicy::Disabled => inv = inv.arg("-nomask"),
        MaskPolicy::File(path) => inv = inv.arg("-mask").arg(path.to_string_lossy()),
    }
    if let Some(format) = &options.format {
        inv = inv.arg("-f").arg(format.as_str());
    }
    if options.quiet {
        inv = inv.arg("-q");
    }

    inv.arg(source.to_string_lossy())
        .arg(options.output.to_string_lossy())
        .arg(options.layer.as_str())
        .arg(field)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn options() -> RunOptions {
        RunOptions {
            input: PathBuf::from("dem.tif"),
            output: PathBuf::from("out/classes.shp"),
            band: Some(2),
            connectedness: Connectedness::Four,
            round: 5.0,
            precision: 3,
            mask: MaskPolicy::Default,
            format: None,
            layer: "classes".to_string(),
            field_name: "DN".to_string(),
            quiet: false,
            strict: false,
        }
    }

    #[test]
    fn minimal_invocation() {
        let inv = invocation("gdal_polygonize.py", &options(), Path::new("dem-abc.tif"), "temp_abc");
        assert_eq!(
            inv.args,
            vec!["dem-abc.tif", "out/classes.shp", "classes", "temp_abc"]
        );
    }

    #[test]
    fn pass_through_flags() {
        let mut opts = options();
        opts.connectedness = Connectedness::Eight;
        opts.mask = MaskPolicy::File(PathBuf::from("mask file.tif"));
        opts.format = Some("ESRI Shapefile".to_string());
        opts.quiet = true;

        let inv = invocation("gdal_polygonize.py", &opts, Path::new("dem-abc.tif"), "temp_abc");
        assert_eq!(
            inv.args,
            vec![
                "-8",
                "-mask",
                "mask file.tif",
                "-f",
                "ESRI Shapefile",
                "-q",
                "dem-abc.tif",
                "out/classes.shp",
                "classes",
                "temp_abc",
            ]
        );
        assert!(!inv.args.contains(&"-b".to_string()));
    }

    #[test]
    fn nomask_flag() {
        let mut opts = options();
        opts.mask = MaskPolicy::Disabled;
        let inv = invocation("gdal_polygonize.py", &opts, Path::new("t.tif"), "temp_000");
        assert_eq!(inv.args[0], "-nomask");
    }
}
