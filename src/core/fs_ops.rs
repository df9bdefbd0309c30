// src/core/fs_ops.rs
//! File system helpers shared by the CSV stores

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    async fn ensure_parent_exists(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::ensure_dir_exists(parent).await,
            _ => Ok(()),
        }
    }

    /// Replace `path` with `content` by writing `<name>.tmp` and renaming it.
    pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
        Self::ensure_parent_exists(path).await?;

        let mut tmp_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?;
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).await.with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }

    /// Append `content` to `path`, creating the file if needed.
    pub async fn append(path: &Path, content: &[u8]) -> Result<()> {
        Self::ensure_parent_exists(path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        file.write_all(content)
            .await
            .with_context(|| format!("Failed to append to {}", path.display()))?;
        file.flush().await?;
        Ok(())
    }

    /// Whether `path` is missing or empty.
    pub async fn is_empty_or_missing(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }

    /// Read a whole file, treating a missing file as absent.
    pub async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read file: {}", path.display())),
        }
    }
}
