use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Storefront images larger than this are refused.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

const STORE_IMAGE_DIR: &str = "store-img";

/// Local disk storage for uploaded images, served back under `/uploads`.
///
/// Store images live at `{root}/store-img/{store_id}/{uuid}.{ext}`.
pub struct ImageStore {
    root: PathBuf,
    public_base_url: String,
}

/// A file written by [`ImageStore::save_store_image`].
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub path: PathBuf,
    pub url: String,
}

impl ImageStore {
    pub async fn new(root: PathBuf, public_base_url: &str) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("Image upload directory: {}", root.display());
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File extension for an accepted image content type.
    pub fn extension_for(content_type: &str) -> Option<&'static str> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }

    pub async fn save_store_image(&self, store_id: i64, ext: &str, data: &[u8]) -> Result<StoredImage> {
        let relative = format!("{STORE_IMAGE_DIR}/{store_id}/{}.{ext}", Uuid::new_v4());
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(StoredImage {
            url: format!("{}/uploads/{}", self.public_base_url, relative),
            path,
        })
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("Removed image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Image {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tukang-images-{}", Uuid::new_v4()))
    }

    #[test]
    fn only_web_image_types_are_accepted() {
        assert_eq!(ImageStore::extension_for("image/png"), Some("png"));
        assert_eq!(ImageStore::extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(ImageStore::extension_for("image/webp"), Some("webp"));
        assert_eq!(ImageStore::extension_for("image/gif"), None);
        assert_eq!(ImageStore::extension_for("application/pdf"), None);
    }

    #[tokio::test]
    async fn save_then_remove() {
        let dir = scratch_dir();
        let store = ImageStore::new(dir.clone(), "http://localhost:3000/").await.unwrap();

        let image = store.save_store_image(7, "png", b"\x89PNG fake").await.unwrap();
        assert!(image.path.starts_with(dir.join("store-img").join("7")));
        assert!(image.url.starts_with("http://localhost:3000/uploads/store-img/7/"));
        assert!(image.url.ends_with(".png"));
        assert_eq!(fs::read(&image.path).await.unwrap(), b"\x89PNG fake");

        store.remove(&image.path).await.unwrap();
        assert!(!image.path.exists());
        // Second removal is a no-op
        store.remove(&image.path).await.unwrap();

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
