mod errors;
mod group;
mod manager;
mod manager_worker;
mod uploader;
pub mod types;

pub use errors::{Result, UploadError};
pub use group::UploadTaskGroup;
pub use manager::{UploadManager, UploadManagerHandle};
pub use uploader::Uploader;
