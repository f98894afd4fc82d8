use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{self, MediaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct MediaId(Uuid);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable upload status of one item. `uploading` and `failed` are never
/// both true, and `error_hint` is present exactly when `failed` is; the
/// transition methods on [`MediaUploadItem`] keep it that way.
#[derive(Debug, Clone, Default)]
pub struct ItemStatus {
    pub uploading: bool,
    pub failed: bool,
    pub error_hint: Option<String>,
}

/// One locally-identified media file queued for upload. Identity and
/// source location are fixed for the item's lifetime; the status block is
/// the only mutable surface and is written by the upload pipeline alone.
pub struct MediaUploadItem {
    id: MediaId,
    source: PathBuf,
    name: String,
    kind: MediaKind,
    mime: String,
    byte_size: OnceLock<Option<u64>>,
    status: RwLock<ItemStatus>,
}

impl MediaUploadItem {
    /// Build an item from a local path. No validation happens here beyond
    /// deriving the display name; an unreadable source surfaces later, when
    /// the upload attempt reads it.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());

        Self {
            id: MediaId::new(),
            name,
            kind: MediaKind::from_path(&source),
            mime: kind::mime_type(&source),
            source,
            byte_size: OnceLock::new(),
            status: RwLock::new(ItemStatus::default()),
        }
    }

    pub fn id(&self) -> MediaId {
        self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn mime_type(&self) -> &str {
        &self.mime
    }

    /// File size in bytes, resolved on first use and cached. `None` when
    /// the source can't be stat'ed; upload correctness doesn't depend on it.
    pub async fn byte_size(&self) -> Option<u64> {
        if let Some(size) = self.byte_size.get() {
            return *size;
        }
        let size = tokio::fs::metadata(&self.source).await.ok().map(|meta| meta.len());
        *self.byte_size.get_or_init(|| size)
    }

    pub fn status(&self) -> ItemStatus {
        self.read_status().clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.read_status().uploading
    }

    pub fn is_failed(&self) -> bool {
        self.read_status().failed
    }

    pub fn error_hint(&self) -> Option<String> {
        self.read_status().error_hint.clone()
    }

    /// A new attempt begins: the failure state of any previous attempt is
    /// wiped so observers see a clean `uploading` item.
    pub(crate) fn begin_upload(&self) {
        let mut status = self.write_status();
        status.uploading = true;
        status.failed = false;
        status.error_hint = None;
    }

    pub(crate) fn complete_ok(&self) {
        let mut status = self.write_status();
        status.uploading = false;
        status.failed = false;
        status.error_hint = None;
    }

    pub(crate) fn complete_err(&self, hint: impl Into<String>) {
        let mut status = self.write_status();
        status.uploading = false;
        status.failed = true;
        status.error_hint = Some(hint.into());
    }

    fn read_status(&self) -> RwLockReadGuard<'_, ItemStatus> {
        self.status.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_status(&self) -> RwLockWriteGuard<'_, ItemStatus> {
        self.status.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PartialEq for MediaUploadItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id || self.source == other.source
    }
}

impl Eq for MediaUploadItem {}

impl Hash for MediaUploadItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl std::fmt::Debug for MediaUploadItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUploadItem")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_path() {
        let item = MediaUploadItem::new("/workshop/clips/sunrise.mp4");
        assert_eq!(item.name(), "sunrise.mp4");
        assert_eq!(item.kind(), MediaKind::Video);
        assert_eq!(item.mime_type(), "video/mp4");
    }

    #[test]
    fn test_status_transitions_keep_invariant() {
        let item = MediaUploadItem::new("a.png");
        let check = |item: &MediaUploadItem| {
            let status = item.status();
            assert!(!(status.uploading && status.failed));
            assert_eq!(status.failed, status.error_hint.is_some());
        };

        check(&item);
        item.begin_upload();
        assert!(item.is_uploading());
        check(&item);
        item.complete_err("server said no");
        assert!(!item.is_uploading());
        assert!(item.is_failed());
        check(&item);

        // retry round-trip: failed -> uploading -> clean
        item.begin_upload();
        assert!(item.is_uploading());
        assert!(!item.is_failed());
        check(&item);
        item.complete_ok();
        assert!(!item.is_failed());
        assert_eq!(item.error_hint(), None);
        check(&item);
    }

    #[test]
    fn test_equality_by_id_or_source() {
        let a = MediaUploadItem::new("/media/a.mp4");
        let b = MediaUploadItem::new("/media/a.mp4");
        let c = MediaUploadItem::new("/media/c.mp4");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_byte_size_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let item = MediaUploadItem::new(&path);
        assert_eq!(item.byte_size().await, Some(2048));

        let missing = MediaUploadItem::new(dir.path().join("gone.mp4"));
        assert_eq!(missing.byte_size().await, None);
    }
}
