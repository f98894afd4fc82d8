use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::api::UploadClient;
use crate::media::MediaUploadItem;
use super::errors::{Result, UploadError};
use super::group::UploadTaskGroup;
use super::manager_worker::GroupDispatcher;
use super::types::{GroupId, ManagerCommand, ManagerConfig, UploadEvent};

/// Handle to the upload manager. Cheap to clone; every clone talks to the
/// same dispatcher task, which owns the group collection and serializes
/// dispatch.
#[derive(Clone)]
pub struct UploadManager {
    command_tx: mpsc::Sender<ManagerCommand>,
    event_tx: broadcast::Sender<UploadEvent>,
}

/// Manager handle plus the dispatcher task driving it.
pub struct UploadManagerHandle {
    pub manager: UploadManager,
    pub worker_handle: JoinHandle<()>,
}

impl UploadManagerHandle {
    /// Drop the handle's manager and wait for the dispatcher to exit. Any
    /// other live manager clones keep the dispatcher running.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.manager);
        self.worker_handle
            .await
            .map_err(|err| UploadError::WorkerPanic(err.to_string()))
    }
}

impl UploadManager {
    pub fn new(client: Arc<dyn UploadClient>, config: ManagerConfig) -> UploadManagerHandle {
        let (command_tx, command_rx) = mpsc::channel(100);
        // keep up to 256 events buffered for slow subscribers
        let (event_tx, _) = broadcast::channel(256);

        let worker_handle = tokio::spawn(GroupDispatcher::run(
            client,
            config,
            command_rx,
            event_tx.clone(),
        ));

        let manager = Self {
            command_tx,
            event_tx,
        };

        UploadManagerHandle {
            manager,
            worker_handle,
        }
    }

    /// Queue a batch of items for upload to `destination`. The group is
    /// dispatched as soon as the worker gets to it; progress is observable
    /// through the returned group's counters or the event stream.
    pub async fn enqueue(
        &self,
        items: Vec<Arc<MediaUploadItem>>,
        destination: impl Into<String>,
    ) -> Result<GroupId> {
        self.enqueue_group(UploadTaskGroup::new(items, destination)).await
    }

    /// Queue a single item.
    pub async fn enqueue_one(
        &self,
        item: Arc<MediaUploadItem>,
        destination: impl Into<String>,
    ) -> Result<GroupId> {
        self.enqueue(vec![item], destination).await
    }

    /// Queue a batch under an explicit display name.
    pub async fn enqueue_named(
        &self,
        name: impl Into<String>,
        items: Vec<Arc<MediaUploadItem>>,
        destination: impl Into<String>,
    ) -> Result<GroupId> {
        self.enqueue_group(UploadTaskGroup::with_name(name, items, destination))
            .await
    }

    /// Append a prepared group to the managed collection and wake the
    /// dispatcher.
    pub async fn enqueue_group(&self, group: UploadTaskGroup) -> Result<GroupId> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ManagerCommand::Enqueue {
                group: Arc::new(group),
                reply: reply_tx,
            })
            .await
            .map_err(|_| UploadError::ManagerShutDown)?;

        reply_rx.await.map_err(|_| UploadError::ManagerShutDown)
    }

    /// Detach a group from the managed collection. Safe at any time: an
    /// in-flight fan-out keeps running to completion, only the bookkeeping
    /// goes away. Returns whether the group was present.
    pub async fn remove(&self, group_id: GroupId) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ManagerCommand::Remove {
                group_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| UploadError::ManagerShutDown)?;

        reply_rx.await.map_err(|_| UploadError::ManagerShutDown)
    }

    /// Keep the group out of dispatch until [`resume`](Self::resume).
    /// Transfers already in flight are not preempted.
    pub async fn pause(&self, group_id: GroupId) -> Result<()> {
        self.send_flag_command(group_id, FlagCommand::Pause).await
    }

    /// Make a paused group claimable again and re-trigger dispatch.
    pub async fn resume(&self, group_id: GroupId) -> Result<()> {
        self.send_flag_command(group_id, FlagCommand::Resume).await
    }

    /// Mark a group halted. Purely advisory; nothing is cancelled.
    pub async fn halt(&self, group_id: GroupId) -> Result<()> {
        self.send_flag_command(group_id, FlagCommand::Halt).await
    }

    /// Snapshot of the managed collection in enqueue order.
    pub async fn groups(&self) -> Result<Vec<Arc<UploadTaskGroup>>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ManagerCommand::GetGroups { reply: reply_tx })
            .await
            .map_err(|_| UploadError::ManagerShutDown)?;

        reply_rx.await.map_err(|_| UploadError::ManagerShutDown)
    }

    /// Look up one group by id.
    pub async fn group(&self, group_id: GroupId) -> Result<Option<Arc<UploadTaskGroup>>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ManagerCommand::GetGroup {
                group_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| UploadError::ManagerShutDown)?;

        reply_rx.await.map_err(|_| UploadError::ManagerShutDown)
    }

    /// Subscribe to the event stream. Every subscriber sees its own copy;
    /// a receiver that can't keep up may lag and lose events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<UploadEvent> {
        self.event_tx.subscribe()
    }

    async fn send_flag_command(&self, group_id: GroupId, flag: FlagCommand) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = match flag {
            FlagCommand::Pause => ManagerCommand::Pause {
                group_id,
                reply: reply_tx,
            },
            FlagCommand::Resume => ManagerCommand::Resume {
                group_id,
                reply: reply_tx,
            },
            FlagCommand::Halt => ManagerCommand::Halt {
                group_id,
                reply: reply_tx,
            },
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| UploadError::ManagerShutDown)?;

        reply_rx.await.map_err(|_| UploadError::ManagerShutDown)?
    }
}

enum FlagCommand {
    Pause,
    Resume,
    Halt,
}
