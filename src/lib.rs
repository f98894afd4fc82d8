pub mod api;
pub mod config;
pub mod logging;
pub mod media;
pub mod upload;

pub use api::{ApiError, HttpClient, UploadClient};
pub use config::{ClientConfig, ConfigError};
pub use media::{ItemStatus, MediaId, MediaKind, MediaUploadItem};
pub use upload::types::{GroupId, ManagerConfig, UploadEvent};
pub use upload::{
    Result,
    UploadError,
    UploadManager,
    UploadManagerHandle,
    UploadTaskGroup,
    Uploader,
};
