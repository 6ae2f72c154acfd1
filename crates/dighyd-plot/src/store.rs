//! Image store: a flat directory of generated PNGs with high-watermark eviction.
//!
//! Nothing happens until the store holds more than `max_images` files; a
//! cleanup pass then deletes the `delete_count` oldest by creation time.
//! Access recency plays no role. Cleanup runs in the request path, once per
//! plot request, so there is no background job.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dighyd_common::config::ImageStoreConfig;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

const IMAGE_EXTENSION: &str = "png";

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Images present when the pass started.
    pub scanned: usize,
    /// Images this pass deleted.
    pub removed: usize,
    /// Images selected for deletion that were already gone (concurrent pass).
    pub missing: usize,
    /// Images that could not be deleted.
    pub failed: usize,
}

/// A freshly allocated, not yet written, image location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_images: usize,
    delete_count: usize,
}

impl ImageStore {
    /// Open the store, creating the directory if it does not exist yet.
    pub async fn open<P: AsRef<Path>>(
        dir: P,
        max_images: usize,
        delete_count: usize,
    ) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        debug!(
            "Image store at {:?} (max {}, evict {})",
            dir, max_images, delete_count
        );
        Ok(Self { dir, max_images, delete_count })
    }

    pub async fn from_config(config: &ImageStoreConfig) -> io::Result<Self> {
        Self::open(&config.dir, config.max_images, config.delete_count).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_images(&self) -> usize {
        self.max_images
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count
    }

    /// Reserve a unique file name for a new image.
    pub fn allocate(&self) -> ImageSlot {
        let file_name = format!("{}.{}", Uuid::new_v4().simple(), IMAGE_EXTENSION);
        let path = self.dir.join(&file_name);
        ImageSlot { file_name, path }
    }

    /// List all images with their creation time, oldest first.
    ///
    /// Birth time is used where the filesystem records it, modification time
    /// otherwise; images are never rewritten so the two agree in practice.
    pub async fn list_images(&self) -> io::Result<Vec<(SystemTime, PathBuf)>> {
        let mut images = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(IMAGE_EXTENSION) {
                continue;
            }
            // A concurrent cleanup may remove the file between listing and stat.
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping {:?}: {}", path, e);
                    continue;
                }
            };
            let created = meta
                .created()
                .or_else(|_| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            images.push((created, path));
        }

        images.sort();
        Ok(images)
    }

    /// Run one eviction pass.
    pub async fn cleanup(&self) -> io::Result<CleanupReport> {
        let images = self.list_images().await?;
        let mut report = CleanupReport {
            scanned: images.len(),
            ..Default::default()
        };

        if images.len() <= self.max_images {
            return Ok(report);
        }

        info!(
            "Image store holds {} images (max {}), evicting {} oldest",
            images.len(),
            self.max_images,
            self.delete_count
        );

        for (_, path) in images.iter().take(self.delete_count) {
            match fs::remove_file(path).await {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("{:?} already removed", path);
                    report.missing += 1;
                }
                Err(e) => {
                    warn!("Failed to delete {:?}: {}", path, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
