//! Run-scoped context: the random token and the temporary names derived from it.
//!
//! One `RunContext` is built per invocation and passed explicitly to the
//! pipeline. The token is a SHA-256 digest of the current timestamp, so two
//! concurrent runs are very unlikely to pick the same names; nothing stronger
//! than that is promised across processes.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::domain::{RunOptions, file_stem, parent_dir};

/// Prefix of the temporary attribute field.
const TEMP_FIELD_PREFIX: &str = "temp_";
/// Hex characters of the token used in the temporary field name.
///
/// Shapefile field names are limited to 10 characters.
const TEMP_FIELD_TOKEN_LEN: usize = 3;

/// Names of the artifacts that only live for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryResources {
    /// Quantized raster, next to the input: `<stem>-<token><ext>`.
    pub raster: PathBuf,
    /// Attribute written by the polygon extractor: `temp_<3 hex chars>`.
    pub field: String,
}

#[derive(Debug, Clone)]
pub struct RunContext {
    token: String,
    temp: TemporaryResources,
}

impl RunContext {
    /// Derive the run context from the current time.
    pub fn new(options: &RunOptions) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        Self::from_seed(options, &now)
    }

    /// Derive the run context from an explicit seed.
    ///
    /// If a derived name would clobber the input, the output, an existing file
    /// or the final field name, the digest is re-salted until it does not.
    pub fn from_seed(options: &RunOptions, seed: &str) -> Self {
        let mut salt = 0u32;
        loop {
            let token = digest_token(seed, salt);
            let temp = derive_names(&options.input, &token);
            if !collides(&temp, options) {
                tracing::debug!(token = %token, raster = %temp.raster.display(), field = %temp.field, "derived temporary names");
                return Self { token, temp };
            }
            tracing::debug!(salt, "temporary name collision, re-salting");
            salt += 1;
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn temp(&self) -> &TemporaryResources {
        &self.temp
    }
}

fn digest_token(seed: &str, salt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    if salt > 0 {
        hasher.update(salt.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

fn derive_names(input: &Path, token: &str) -> TemporaryResources {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let raster = parent_dir(input).join(format!("{}-{token}{ext}", file_stem(input)));
    let field = format!("{TEMP_FIELD_PREFIX}{}", &token[..TEMP_FIELD_TOKEN_LEN]);
    TemporaryResources { raster, field }
}

fn collides(temp: &TemporaryResources, options: &RunOptions) -> bool {
    temp.raster == options.input
        || temp.raster == options.output
        || temp.raster.exists()
        || temp.field.eq_ignore_ascii_case(&options.field_name)
}
