use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::api::UploadClient;
use super::errors::{Result, UploadError};
use super::group::UploadTaskGroup;
use super::types::{GroupId, ManagerCommand, ManagerConfig, UploadEvent};
use super::uploader::Uploader;

/// Owns the group collection and serializes dispatch. Claims only ever
/// happen on this task, so a group cannot be started twice even when
/// several callers enqueue at once. The loop blocks on its channels while
/// idle and runs for as long as a manager handle is alive.
pub(crate) struct GroupDispatcher {
    uploader: Uploader,
    config: ManagerConfig,
    groups: Vec<Arc<UploadTaskGroup>>,
    event_tx: broadcast::Sender<UploadEvent>,
    completion_tx: mpsc::UnboundedSender<GroupId>,
}

impl GroupDispatcher {
    pub(crate) async fn run(
        client: Arc<dyn UploadClient>,
        config: ManagerConfig,
        mut command_rx: mpsc::Receiver<ManagerCommand>,
        event_tx: broadcast::Sender<UploadEvent>,
    ) {
        let (completion_tx, mut completion_rx) = mpsc::unbounded_channel();
        let mut dispatcher = Self {
            uploader: Uploader::new(client),
            config,
            groups: Vec::new(),
            event_tx,
            completion_tx,
        };

        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => dispatcher.handle_command(command),
                    // every manager handle has been dropped
                    None => break,
                },
                Some(group_id) = completion_rx.recv() => {
                    dispatcher.handle_group_finished(group_id);
                }
            }

            dispatcher.dispatch_pending();
        }
    }

    /// Claim unstarted groups in enqueue order. Paused groups are skipped
    /// but stay claimable; resuming one lands back here. A claimed group
    /// fans out on its own tasks, so this never blocks on a transfer.
    fn dispatch_pending(&self) {
        for group in &self.groups {
            if group.is_paused() {
                continue;
            }
            if group.try_claim() {
                info!(group = group.name(), items = group.total_count(), "start group");
                let _ = self.event_tx.send(UploadEvent::GroupStarted {
                    group_id: group.id(),
                });
                Arc::clone(group).spawn_fanout(
                    self.uploader.clone(),
                    self.completion_tx.clone(),
                    self.event_tx.clone(),
                );
            }
        }
    }

    fn handle_group_finished(&mut self, group_id: GroupId) {
        // a group removed mid-flight still completes; nothing left to track
        let (name, total, failed) = match self.groups.iter().find(|g| g.id() == group_id) {
            Some(group) => (
                group.name().to_owned(),
                group.total_count(),
                group.failed_count(),
            ),
            None => return,
        };

        debug!(group = %name, total, failed, "group finished");
        let _ = self.event_tx.send(UploadEvent::GroupFinished {
            group_id,
            total,
            failed,
        });

        if self.config.retire_finished {
            self.groups.retain(|g| g.id() != group_id);
            let _ = self.event_tx.send(UploadEvent::GroupRemoved { group_id });
        }
    }

    fn handle_command(&mut self, command: ManagerCommand) {
        match command {
            ManagerCommand::Enqueue { group, reply } => {
                let group_id = group.id();
                debug!(group = group.name(), %group_id, "group queued");
                self.groups.push(group);
                let _ = self.event_tx.send(UploadEvent::GroupQueued { group_id });
                let _ = reply.send(group_id);
            }
            ManagerCommand::Remove { group_id, reply } => {
                let before = self.groups.len();
                self.groups.retain(|g| g.id() != group_id);
                let removed = self.groups.len() != before;
                if removed {
                    let _ = self.event_tx.send(UploadEvent::GroupRemoved { group_id });
                }
                let _ = reply.send(removed);
            }
            ManagerCommand::Pause { group_id, reply } => {
                let _ = reply.send(self.with_group(group_id, |group| group.pause()));
            }
            ManagerCommand::Resume { group_id, reply } => {
                let _ = reply.send(self.with_group(group_id, |group| group.resume()));
            }
            ManagerCommand::Halt { group_id, reply } => {
                let _ = reply.send(self.with_group(group_id, |group| group.halt()));
            }
            ManagerCommand::GetGroup { group_id, reply } => {
                let group = self.groups.iter().find(|g| g.id() == group_id).cloned();
                let _ = reply.send(group);
            }
            ManagerCommand::GetGroups { reply } => {
                let _ = reply.send(self.groups.clone());
            }
        }
    }

    fn with_group(&self, group_id: GroupId, apply: impl FnOnce(&UploadTaskGroup)) -> Result<()> {
        match self.groups.iter().find(|g| g.id() == group_id) {
            Some(group) => {
                apply(group);
                Ok(())
            }
            None => Err(UploadError::GroupNotFound(group_id)),
        }
    }
}
