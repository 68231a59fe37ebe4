use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::persistence::{Asset, DecodedImage, MediaError, MediaLibrary, PermissionStatus};

/// Directory-backed media store
///
/// New assets land in the root directory; a collection is a subdirectory and
/// assigning an asset moves its file there.
#[derive(Debug, Clone)]
pub struct FsMediaLibrary {
    root: PathBuf,
}

impl FsMediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn asset_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.png", id))
    }

    fn collection_dir(&self, name: &str) -> Result<PathBuf, MediaError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(MediaError(format!("invalid collection name '{}'", name)));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl MediaLibrary for FsMediaLibrary {
    /// Granted when the root directory exists (or can be created) and is writable
    async fn request_permission(&self) -> PermissionStatus {
        if let Err(e) = fs::create_dir_all(&self.root).await {
            tracing::warn!("cannot create media dir {:?}: {}", self.root, e);
            return PermissionStatus::Denied;
        }
        match fs::metadata(&self.root).await {
            Ok(meta) if !meta.permissions().readonly() => PermissionStatus::Granted,
            _ => PermissionStatus::Denied,
        }
    }

    async fn create_asset(&self, image: &DecodedImage) -> Result<Asset, MediaError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let path = self.asset_path(&id);
        fs::write(&path, image.bytes()).await?;
        tracing::debug!("wrote asset {:?}", path);

        Ok(Asset {
            id,
            uri: path.display().to_string(),
        })
    }

    async fn assign_to_collection(&self, asset: &Asset, name: &str) -> Result<(), MediaError> {
        let dir = self.collection_dir(name)?;
        if !fs::try_exists(&dir).await? {
            tracing::debug!("creating collection {:?}", dir);
            fs::create_dir_all(&dir).await?;
        }

        let target = dir.join(format!("{}.png", asset.id));
        fs::rename(self.asset_path(&asset.id), &target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ImagePayload;
    use crate::persistence::{ImagePersistence, SaveOutcome};
    use tempfile::TempDir;

    fn image(base64: &str) -> DecodedImage {
        DecodedImage::from_payload(&ImagePayload::new(base64)).unwrap()
    }

    #[tokio::test]
    async fn test_permission_creates_root() {
        let tmp = TempDir::new().unwrap();
        let media = FsMediaLibrary::new(tmp.path().join("gallery"));

        assert_eq!(media.request_permission().await, PermissionStatus::Granted);
        assert!(media.root().is_dir());
    }

    #[tokio::test]
    async fn test_permission_denied_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let media = FsMediaLibrary::new(file.join("gallery"));

        assert_eq!(media.request_permission().await, PermissionStatus::Denied);
    }

    #[tokio::test]
    async fn test_assign_appends_to_existing_collection() {
        let tmp = TempDir::new().unwrap();
        let media = FsMediaLibrary::new(tmp.path());

        let first = media.create_asset(&image("aGVsbG8=")).await.unwrap();
        media.assign_to_collection(&first, "LangChain").await.unwrap();
        let second = media.create_asset(&image("d29ybGQ=")).await.unwrap();
        media.assign_to_collection(&second, "LangChain").await.unwrap();

        let album = tmp.path().join("LangChain");
        assert_eq!(std::fs::read_dir(&album).unwrap().count(), 2);
        assert_eq!(
            std::fs::read(album.join(format!("{}.png", first.id))).unwrap(),
            b"hello"
        );
        assert!(!tmp.path().join(format!("{}.png", first.id)).exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_collection_names() {
        let tmp = TempDir::new().unwrap();
        let media = FsMediaLibrary::new(tmp.path());
        let asset = media.create_asset(&image("aGVsbG8=")).await.unwrap();

        assert!(media.assign_to_collection(&asset, "../escape").await.is_err());
        assert!(media.assign_to_collection(&asset, "").await.is_err());
    }

    #[tokio::test]
    async fn test_full_save_through_persistence() {
        let tmp = TempDir::new().unwrap();
        let saver = ImagePersistence::new(FsMediaLibrary::new(tmp.path()), "LangChain");

        let outcome = saver
            .save(Some(&ImagePayload::new("aGVsbG8=")))
            .await
            .unwrap();

        let SaveOutcome::Saved { asset, .. } = outcome else {
            panic!("expected image to be saved");
        };
        let saved = tmp.path().join("LangChain").join(format!("{}.png", asset.id));
        assert_eq!(std::fs::read(saved).unwrap(), b"hello");
    }
}
