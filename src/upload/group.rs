use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Local, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::debug;

use crate::media::MediaUploadItem;
use super::types::{GroupId, UploadEvent};
use super::uploader::Uploader;

/// A batch of media items submitted together against one destination, e.g.
/// a range selection uploaded in one go. Item order is submission order;
/// completion order is unspecified. Flags and counters are atomics so the
/// fan-out tasks and any observer can touch them without a lock.
pub struct UploadTaskGroup {
    id: GroupId,
    name: String,
    items: Vec<Arc<MediaUploadItem>>,
    destination: String,
    created_at: DateTime<Utc>,
    paused: AtomicBool,
    started: AtomicBool,
    finished: AtomicBool,
    halted: AtomicBool,
    finished_count: AtomicUsize,
    failed_count: AtomicUsize,
}

impl UploadTaskGroup {
    /// New group named after its creation time.
    pub fn new(items: Vec<Arc<MediaUploadItem>>, destination: impl Into<String>) -> Self {
        let name = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Self::with_name(name, items, destination)
    }

    /// New group with an explicit display name.
    pub fn with_name(
        name: impl Into<String>,
        items: Vec<Arc<MediaUploadItem>>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            items,
            destination: destination.into(),
            created_at: Utc::now(),
            paused: AtomicBool::new(false),
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            finished_count: AtomicUsize::new(0),
            failed_count: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Items in submission order.
    pub fn items(&self) -> &[Arc<MediaUploadItem>] {
        &self.items
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Items that reached a terminal state, no matter the outcome.
    pub fn finished_count(&self) -> usize {
        self.finished_count.load(Ordering::SeqCst)
    }

    pub fn failed_count(&self) -> usize {
        self.failed_count.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Flag only; in-flight transfers are not interrupted.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Atomically flip `started`, returning true for the one caller that
    /// actually claimed the group. The flip happens before this returns,
    /// so a dispatcher re-scanning the collection can never claim the same
    /// group twice.
    pub(crate) fn try_claim(&self) -> bool {
        !self.started.swap(true, Ordering::SeqCst)
    }

    /// Launch one upload task per item and, once all of them have settled,
    /// flip `finished` and notify the dispatcher. Returns as soon as the
    /// driver task is spawned; completion is observed through the counters,
    /// the flag, or the event stream.
    pub(crate) fn spawn_fanout(
        self: Arc<Self>,
        uploader: Uploader,
        completion_tx: mpsc::UnboundedSender<GroupId>,
        event_tx: broadcast::Sender<UploadEvent>,
    ) {
        let group = self;
        tokio::spawn(async move {
            let mut fanout = JoinSet::new();
            for item in group.items.iter().cloned() {
                let uploader = uploader.clone();
                let event_tx = event_tx.clone();
                let group = Arc::clone(&group);
                fanout.spawn(async move {
                    let success = uploader.upload(&item, group.destination()).await;
                    group.finished_count.fetch_add(1, Ordering::SeqCst);
                    if !success {
                        group.failed_count.fetch_add(1, Ordering::SeqCst);
                    }
                    let _ = event_tx.send(UploadEvent::ItemFinished {
                        group_id: group.id,
                        media_id: item.id(),
                        success,
                    });
                });
            }

            while fanout.join_next().await.is_some() {}

            group.finished.store(true, Ordering::SeqCst);
            debug!(group = group.name(), "fan-out complete");
            let _ = completion_tx.send(group.id);
        });
    }
}
