//! Seams to the external transcoding and scoring pipeline.

use std::path::{Path, PathBuf};

use crate::candidate::Variables;
use crate::error::Result;
use crate::model::AnalysisModel;
use crate::resolution::Resolution;

/// Produces a transcoded variant of the reference input.
#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `reference` towards `output`.
    ///
    /// Returns the path of the produced variant, which may differ from
    /// `output`. An error or an empty path means the transcode failed.
    async fn transcode(
        &self,
        reference: &Path,
        resolution: &Resolution,
        bitrate: u64,
        output: &Path,
        variables: &Variables,
    ) -> Result<PathBuf>;
}

/// Scores a variant against the reference with one model.
#[async_trait::async_trait]
pub trait QualityAnalyzer: Send + Sync {
    /// Write the score to `quality_file` and return the artifact's path.
    async fn analyze_quality(
        &self,
        reference: &Path,
        variant: &Path,
        quality_file: &Path,
        model: AnalysisModel,
    ) -> Result<PathBuf>;
}

/// Existence checks for reusable outputs.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool>;
}

/// Filesystem-backed [`ArtifactStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

#[async_trait::async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_store_sees_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("640x360_400000.mp4");

        let store = FsArtifactStore;
        assert!(!store.exists(&path).await.unwrap());

        std::fs::write(&path, b"variant").unwrap();
        assert!(store.exists(&path).await.unwrap());
    }
}
