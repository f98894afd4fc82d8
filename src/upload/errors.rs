use thiserror::Error;

use super::types::GroupId;

/// Manager-side failures. Item upload failures never surface here; they
/// land in the item's own status fields and the group counters.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload manager shut down")]
    ManagerShutDown,

    #[error("no task group with id {0}")]
    GroupNotFound(GroupId),

    #[error("dispatcher panicked: {0}")]
    WorkerPanic(String),
}

/// Error alias
pub type Result<T, E = UploadError> = std::result::Result<T, E>;
