use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::api::UploadClient;
use crate::media::MediaUploadItem;

/// Transfers a single item: flip the status flags, read the source bytes,
/// hand them to the collaborator, record the outcome on the item. May run
/// concurrently for different items but must never be invoked twice at
/// once for the same one; the group fan-out guarantees that by visiting
/// each item exactly once.
#[derive(Clone)]
pub struct Uploader {
    client: Arc<dyn UploadClient>,
}

impl Uploader {
    pub fn new(client: Arc<dyn UploadClient>) -> Self {
        Self { client }
    }

    /// Upload `item` to `destination`, returning whether the transfer
    /// succeeded. The outcome also lands on the item itself; failures are
    /// never propagated as errors. Re-invoking this on a failed item is
    /// the retry affordance.
    pub async fn upload(&self, item: &MediaUploadItem, destination: &str) -> bool {
        item.begin_upload();

        debug!(name = item.name(), "reading media data");
        let bytes = match tokio::fs::read(item.source()).await {
            Ok(data) => Bytes::from(data),
            Err(err) => {
                // the attempt is over before any network traffic happens
                warn!(name = item.name(), %err, "read failed, upload terminated");
                item.complete_err(format!("failed to read source: {err}"));
                return false;
            }
        };

        debug!(name = item.name(), destination, "posting media");
        match self
            .client
            .post_multipart(bytes, item.name(), item.mime_type(), destination)
            .await
        {
            Ok(message) => {
                info!(name = item.name(), response = %message, "upload success");
                item.complete_ok();
                true
            }
            Err(err) => {
                warn!(name = item.name(), %err, "upload failed");
                item.complete_err(err.to_string());
                false
            }
        }
    }

    /// Convenience wrapper taking a bare path.
    pub async fn upload_path(&self, path: impl AsRef<Path>, destination: &str) -> bool {
        let item = MediaUploadItem::new(path.as_ref());
        self.upload(&item, destination).await
    }
}
