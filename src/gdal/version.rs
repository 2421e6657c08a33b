//! GDAL capability check (`gdalinfo --version`).

use crate::error::AppError;
use crate::gdal::{Invocation, ToolRunner};

/// Oldest GDAL release whose Python utilities we rely on.
pub const MIN_VERSION: GdalVersion = GdalVersion { major: 1, minor: 10 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GdalVersion {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for GdalVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parse `GDAL 3.8.4, released 2024/02/08` into `3.8`.
pub fn parse_version(banner: &str) -> Option<GdalVersion> {
    let token = banner.split_whitespace().nth(1)?;
    let token = token.trim_end_matches(',');
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()
        .map(|m| m.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
        .filter(|m| !m.is_empty())?
        .parse()
        .ok()?;
    Some(GdalVersion { major, minor })
}

/// Run `gdalinfo --version` and check it against [`MIN_VERSION`].
pub fn require_supported(runner: &dyn ToolRunner, program: &str) -> Result<GdalVersion, AppError> {
    let output = runner
        .run(&Invocation::new(program).arg("--version"))
        .map_err(|e| AppError::validation(format!("GDAL not found: {e}")))?;

    if !output.stderr.trim().is_empty() {
        return Err(AppError::validation(output.stderr.trim().to_string()));
    }

    let version = parse_version(&output.stdout).ok_or_else(|| {
        AppError::validation(format!(
            "Could not read GDAL version from '{}'",
            output.stdout.trim()
        ))
    })?;

    if version < MIN_VERSION {
        return Err(AppError::validation(format!(
            "GDAL version {MIN_VERSION} or higher is required (found {version})"
        )));
    }

    tracing::debug!(%version, "GDAL version check passed");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gdal::ToolOutput;
    use crate::gdal::testing::ScriptedRunner;

    fn stdout(text: &str) -> ToolOutput {
        ToolOutput {
            status: Some(0),
            stdout: text.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn parses_release_banner() {
        assert_eq!(
            parse_version("GDAL 3.8.4, released 2024/02/08\n"),
            Some(GdalVersion { major: 3, minor: 8 })
        );
        assert_eq!(
            parse_version("GDAL 1.10.1, released 2013/08/26"),
            Some(GdalVersion { major: 1, minor: 10 })
        );
        assert_eq!(
            parse_version("GDAL 3.9.0dev-abc, released 2024/01/01"),
            Some(GdalVersion { major: 3, minor: 9 })
        );
        assert_eq!(parse_version("gdalinfo: command not found"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn minor_versions_compare_numerically() {
        // 1.9 < 1.10 even though 1.9 > 1.1 as a decimal.
        assert!(GdalVersion { major: 1, minor: 9 } < MIN_VERSION);
        assert!(GdalVersion { major: 1, minor: 11 } > MIN_VERSION);
        assert!(GdalVersion { major: 2, minor: 0 } > MIN_VERSION);
    }

    #[test]
    fn accepts_modern_gdal() {
        let runner = ScriptedRunner::new().then(stdout("GDAL 3.4.1, released 2021/12/27\n"));
        let version = require_supported(&runner, "gdalinfo").unwrap();
        assert_eq!(version, GdalVersion { major: 3, minor: 4 });
        assert_eq!(runner.calls.borrow()[0].args, vec!["--version"]);
    }

    #[test]
    fn rejects_old_gdal() {
        let runner = ScriptedRunner::new().then(stdout("GDAL 1.9.2, released 2012/10/08\n"));
        let err = require_supported(&runner, "gdalinfo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("1.10"));
    }

    #[test]
    fn fails_on_stderr_or_spawn_error() {
        let runner = ScriptedRunner::new().then_stderr("ERROR 1: something broke");
        let err = require_supported(&runner, "gdalinfo").unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.message().contains("something broke"));

        let runner = ScriptedRunner::new().then_err(AppError::io("Failed to run 'gdalinfo'"));
        let err = require_supported(&runner, "gdalinfo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
