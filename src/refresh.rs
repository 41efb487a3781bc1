//! Refresh capability.
//!
//! The actual fetching of dataset files is an injected collaborator, so
//! alternate implementations (local copy, cloud fetch, mocks) are swappable
//! by substitution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::Config;

/// A source of fresh dataset files.
///
/// Implementations must write the dataset/rate files atomically enough that a
/// concurrent read never observes a half-written file.
#[async_trait]
pub trait Refresher: Send + Sync {
    /// Fetches dataset files into the service's data directory.
    ///
    /// When `only_missing` is true, only files absent from the data directory
    /// need to be fetched, avoiding redundant large downloads when just one
    /// auxiliary file needs populating.
    async fn refresh(&self, only_missing: bool) -> Result<()>;
}

/// Placeholder used when no refresh source is configured.
///
/// Lookups work against whatever dataset is already on disk; an explicit
/// refresh fails instead of silently recording a successful run.
pub struct UnconfiguredRefresher;

#[async_trait]
impl Refresher for UnconfiguredRefresher {
    async fn refresh(&self, _only_missing: bool) -> Result<()> {
        anyhow::bail!("no refresh source configured")
    }
}

/// Copies dataset files from a local source directory.
///
/// Writes go to a temporary file first, then rename into place, so a
/// concurrent reader sees either the old or the new file.
pub struct LocalCopyRefresher {
    source_dir: PathBuf,
    dest_dir: PathBuf,
    files: Vec<String>,
}

impl LocalCopyRefresher {
    /// A refresher managing the configured ranges and rates files.
    pub fn from_config(config: &Config, source_dir: PathBuf) -> Self {
        LocalCopyRefresher {
            source_dir,
            dest_dir: config.data_dir.clone(),
            files: vec![config.ranges_file.clone(), config.rates_file.clone()],
        }
    }
}

#[async_trait]
impl Refresher for LocalCopyRefresher {
    async fn refresh(&self, only_missing: bool) -> Result<()> {
        tokio::fs::create_dir_all(&self.dest_dir)
            .await
            .with_context(|| format!("failed to create {}", self.dest_dir.display()))?;

        for file in &self.files {
            let dest = self.dest_dir.join(file);
            if only_missing && dest.exists() {
                log::debug!("{} already present, skipping", dest.display());
                continue;
            }

            let source = self.source_dir.join(file);
            let staging = self.dest_dir.join(format!("{file}.tmp"));
            tokio::fs::copy(&source, &staging)
                .await
                .with_context(|| format!("failed to copy {}", source.display()))?;
            tokio::fs::rename(&staging, &dest)
                .await
                .with_context(|| format!("failed to move {} into place", dest.display()))?;
            log::info!("refreshed {}", dest.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn refresher(source: &TempDir, dest: &TempDir) -> LocalCopyRefresher {
        let config = Config {
            data_dir: dest.path().to_path_buf(),
            ..Default::default()
        };
        LocalCopyRefresher::from_config(&config, source.path().to_path_buf())
    }

    #[tokio::test]
    async fn test_copies_managed_files() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        std::fs::write(source.path().join("ip-ranges.json"), "[]").unwrap();
        std::fs::write(source.path().join("exchange-rates.json"), r#"{"EUR":1}"#).unwrap();

        refresher(&source, &dest).refresh(false).await.unwrap();

        assert!(dest.path().join("ip-ranges.json").exists());
        assert!(dest.path().join("exchange-rates.json").exists());
    }

    #[tokio::test]
    async fn test_only_missing_skips_present_files() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        std::fs::write(source.path().join("ip-ranges.json"), "[]").unwrap();
        std::fs::write(source.path().join("exchange-rates.json"), r#"{"EUR":1}"#).unwrap();
        // Pre-existing dataset must not be overwritten in only-missing mode
        std::fs::write(dest.path().join("ip-ranges.json"), "[1]").unwrap();

        refresher(&source, &dest).refresh(true).await.unwrap();

        let kept = std::fs::read_to_string(dest.path().join("ip-ranges.json")).unwrap();
        assert_eq!(kept, "[1]");
        assert!(dest.path().join("exchange-rates.json").exists());
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let result = refresher(&source, &dest).refresh(false).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("failed to copy"));
    }
}
