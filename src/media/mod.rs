mod item;
mod kind;

pub use item::{ItemStatus, MediaId, MediaUploadItem};
pub use kind::MediaKind;
