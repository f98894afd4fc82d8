use std::path::Path;

use serde::{Deserialize, Serialize};

/// Media classification, decided once when a file enters a pending
/// collection instead of being re-derived at every use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MediaKind {
    Video,
    Image,
    Other,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Self {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let top = mime.type_();
        if top == mime_guess::mime::VIDEO {
            MediaKind::Video
        } else if top == mime_guess::mime::IMAGE {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image)
    }
}

/// MIME type for a path, falling back to `application/octet-stream` for
/// anything the extension registry doesn't know.
pub(crate) fn mime_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(MediaKind::from_path(Path::new("clip.mp4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("shot.jpeg")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), MediaKind::Other);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), MediaKind::Other);
    }

    #[test]
    fn test_mime_fallback() {
        assert_eq!(mime_type(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_type(Path::new("mystery.wat")), "application/octet-stream");
    }
}
