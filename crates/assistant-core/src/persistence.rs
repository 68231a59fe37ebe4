//! Saving generated images to the device's media store
//!
//! The media store is a platform collaborator behind [`MediaLibrary`]. A save
//! asks for a storage grant, decodes the payload, creates one asset and adds
//! it to the named collection (creating the collection on first use).

use async_trait::async_trait;

use crate::dispatch::ImagePayload;

/// Collection generated images are filed under unless configured otherwise
pub const DEFAULT_COLLECTION: &str = "LangChain";
pub const SAVED_MESSAGE: &str = "Image saved to gallery.";
pub const PERMISSION_DENIED_MESSAGE: &str = "Cannot save image without permission";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// An item created in the media store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub uri: String,
}

/// Image bytes ready to hand to the media store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    uri: String,
}

impl DecodedImage {
    pub fn from_payload(payload: &ImagePayload) -> Result<Self, base64::DecodeError> {
        Ok(Self {
            bytes: payload.decode()?,
            uri: payload.data_uri(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:image/png;base64,...` form of the same image
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MediaError(pub String);

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("{}", PERMISSION_DENIED_MESSAGE)]
    PermissionDenied,

    #[error("image data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("media store error: {0}")]
    Media(#[from] MediaError),
}

/// Platform media store
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn create_asset(&self, image: &DecodedImage) -> Result<Asset, MediaError>;

    /// Add `asset` to collection `name`, creating the collection if absent.
    /// Existing members of the collection are left in place.
    async fn assign_to_collection(&self, asset: &Asset, name: &str) -> Result<(), MediaError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// There was no image to save
    Skipped,
    Saved { asset: Asset, collection: String },
}

pub struct ImagePersistence<M> {
    media: M,
    collection: String,
}

impl<M: MediaLibrary> ImagePersistence<M> {
    pub fn new(media: M, collection: impl Into<String>) -> Self {
        Self {
            media,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub async fn save(&self, payload: Option<&ImagePayload>) -> Result<SaveOutcome, PersistenceError> {
        let Some(payload) = payload else {
            return Ok(SaveOutcome::Skipped);
        };

        if self.media.request_permission().await == PermissionStatus::Denied {
            tracing::warn!("media permission denied, image not saved");
            return Err(PersistenceError::PermissionDenied);
        }

        let image = DecodedImage::from_payload(payload)?;
        let asset = self.media.create_asset(&image).await?;
        self.media
            .assign_to_collection(&asset, &self.collection)
            .await?;

        tracing::info!(asset = %asset.id, collection = %self.collection, bytes = image.bytes().len(), "image saved");
        Ok(SaveOutcome::Saved {
            asset,
            collection: self.collection.clone(),
        })
    }
}
