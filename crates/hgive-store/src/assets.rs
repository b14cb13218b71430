//! Image asset resolution with a default fallback.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolves campaign image names under an assets directory
#[derive(Debug, Clone)]
pub struct AssetResolver {
    dir: PathBuf,
    default_image: String,
}

impl AssetResolver {
    pub fn new(dir: impl Into<PathBuf>, default_image: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_image: default_image.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the named image, or of the default image when it is missing
    #[must_use]
    pub fn resolve(&self, name: &str) -> PathBuf {
        let candidate = self.dir.join(name);
        if !name.is_empty() && candidate.is_file() {
            debug!(path = %candidate.display(), "resolved image");
            return candidate;
        }
        let fallback = self.dir.join(&self.default_image);
        warn!(
            requested = %candidate.display(),
            fallback = %fallback.display(),
            "image not found, using default"
        );
        fallback
    }
}
