use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::media::MediaId;
use super::errors::Result;
use super::group::UploadTaskGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Policy knobs of the manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Drop a group from the managed collection as soon as its fan-out
    /// completes. When false a finished group stays visible until `remove`
    /// is called for it.
    pub retire_finished: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            retire_finished: false,
        }
    }
}

/// Commands a manager handle sends to its dispatcher task.
pub(crate) enum ManagerCommand {
    Enqueue {
        group: Arc<UploadTaskGroup>,
        reply: oneshot::Sender<GroupId>,
    },

    Remove {
        group_id: GroupId,
        reply: oneshot::Sender<bool>,
    },

    Pause {
        group_id: GroupId,
        reply: oneshot::Sender<Result<()>>,
    },

    Resume {
        group_id: GroupId,
        reply: oneshot::Sender<Result<()>>,
    },

    Halt {
        group_id: GroupId,
        reply: oneshot::Sender<Result<()>>,
    },

    GetGroup {
        group_id: GroupId,
        reply: oneshot::Sender<Option<Arc<UploadTaskGroup>>>,
    },

    GetGroups {
        reply: oneshot::Sender<Vec<Arc<UploadTaskGroup>>>,
    },
}

/// What observers see on the event stream.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Group appended to the managed collection
    GroupQueued { group_id: GroupId },

    /// Group claimed by the dispatcher; its fan-out is launching
    GroupStarted { group_id: GroupId },

    /// One item of a group reached a terminal state
    ItemFinished {
        group_id: GroupId,
        media_id: MediaId,
        success: bool,
    },

    /// Every item of the group has settled
    GroupFinished {
        group_id: GroupId,
        total: usize,
        failed: usize,
    },

    /// Group detached from the managed collection
    GroupRemoved { group_id: GroupId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_id_generation() {
        let a = GroupId::new();
        let b = GroupId::new();

        assert_ne!(a, b);
        assert_eq!(a, a);
        assert!(!a.to_string().is_empty());
    }
}
