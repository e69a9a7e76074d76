// storefront/src/services/asset_storage.rs

//! Flat on-disk storage for product images.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};

/// Public URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone)]
pub struct UploadedImage {
  pub file_name: Option<String>,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

#[async_trait]
pub trait AssetStorage: Send + Sync {
  /// Persists the image and returns its `/uploads/<file>` reference.
  async fn save_image(&self, image: &UploadedImage) -> Result<String>;
  /// Removes the asset behind a reference. A missing file is not an error.
  async fn remove(&self, reference: &str) -> std::io::Result<()>;
}

/// Removal that never fails the caller; errors are only logged.
pub async fn remove_best_effort(assets: &dyn AssetStorage, reference: &str) {
  match assets.remove(reference).await {
    Ok(()) => debug!(%reference, "Asset removed."),
    Err(e) => warn!(%reference, error = %e, "Failed to remove asset; leaving it behind."),
  }
}

/// Raster images only. SVG is refused by content type and by file extension.
pub fn is_accepted_image(content_type: &str, file_name: Option<&str>) -> bool {
  let svg_name = file_name
    .and_then(|name| Path::new(name).extension())
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("svgz"));
  content_type.starts_with("image/") && !content_type.eq_ignore_ascii_case("image/svg+xml") && !svg_name
}

/// `image-<unix-millis>-<random>.<ext>`, with the extension taken from the
/// upload name or, failing that, the content type.
pub fn stored_file_name(image: &UploadedImage) -> String {
  let ext = image
    .file_name
    .as_deref()
    .and_then(|name| Path::new(name).extension())
    .and_then(|ext| ext.to_str())
    .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    .map(|ext| ext.to_ascii_lowercase())
    .unwrap_or_else(|| extension_for(&image.content_type).to_string());
  format!(
    "image-{}-{}.{}",
    Utc::now().timestamp_millis(),
    Uuid::new_v4().simple(),
    ext
  )
}

fn extension_for(content_type: &str) -> &'static str {
  match content_type {
    "image/png" => "png",
    "image/gif" => "gif",
    "image/webp" => "webp",
    _ => "jpg",
  }
}

/// Maps a stored reference back to its bare file name. Only the last path
/// component is used, so references cannot escape the asset directory.
pub fn file_name_of(reference: &str) -> Option<&str> {
  Path::new(reference)
    .file_name()
    .and_then(|n| n.to_str())
    .filter(|n| !n.is_empty() && *n != "..")
}

pub struct LocalAssetStorage {
  root: PathBuf,
}

impl LocalAssetStorage {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub async fn ensure_root(&self) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&self.root).await
  }
}

#[async_trait]
impl AssetStorage for LocalAssetStorage {
  #[instrument(name = "assets::save_image", skip(self, image), fields(bytes = image.bytes.len()))]
  async fn save_image(&self, image: &UploadedImage) -> Result<String> {
    let file_name = stored_file_name(image);
    let path = self.root.join(&file_name);
    tokio::fs::write(&path, &image.bytes)
      .await
      .map_err(|e| AppError::Internal(format!("Failed to store image {}: {}", path.display(), e)))?;
    info!(file = %file_name, "Image stored.");
    Ok(format!("{}{}", PUBLIC_PREFIX, file_name))
  }

  async fn remove(&self, reference: &str) -> std::io::Result<()> {
    let Some(file_name) = file_name_of(reference) else {
      return Ok(());
    };
    match tokio::fs::remove_file(self.root.join(file_name)).await {
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }
}
