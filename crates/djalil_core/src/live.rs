//! In-process change notification for owner-scoped records.
//!
//! # Responsibility
//! - Fan committed writes out to subscribers filtered by owner and collection.
//! - Tie subscription lifetime to a guard value.
//!
//! # Invariants
//! - Publishing happens after commit, so a subscriber never sees a change
//!   that a fresh query would not show.
//! - Dropping a `Subscription` removes it from the hub.
//! - Subscribers whose receiver is gone are pruned on the next publish.

use crate::model::owner::OwnerId;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use uuid::Uuid;

/// Record collection a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tasks,
    Goals,
    Journal,
    Stats,
    Profile,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Goals => "goals",
            Self::Journal => "journal",
            Self::Stats => "stats",
            Self::Profile => "profile",
        }
    }
}

/// Kind of committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    /// Hub-assigned, strictly increasing per hub.
    pub sequence: u64,
    pub owner: OwnerId,
    pub collection: Collection,
    pub kind: ChangeKind,
    /// Record id; `None` for the per-owner profile.
    pub id: Option<Uuid>,
}

struct Subscriber {
    owner: OwnerId,
    collection: Option<Collection>,
    sender: Sender<RecordChange>,
}

impl Subscriber {
    fn wants(&self, owner: &OwnerId, collection: Collection) -> bool {
        &self.owner == owner && self.collection.map_or(true, |wanted| wanted == collection)
    }
}

#[derive(Default)]
struct HubState {
    next_subscriber: u64,
    next_sequence: u64,
    subscribers: HashMap<u64, Subscriber>,
}

fn lock(state: &Mutex<HubState>) -> MutexGuard<'_, HubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable, thread-safe change hub.
#[derive(Clone, Default)]
pub struct ChangeHub {
    state: Arc<Mutex<HubState>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to one owner's changes, optionally for a single collection.
    pub fn subscribe(&self, owner: OwnerId, collection: Option<Collection>) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let mut state = lock(&self.state);
        let id = state.next_subscriber;
        state.next_subscriber += 1;
        debug!(
            "event=live_subscribe module=live status=ok subscriber={} collection={}",
            id,
            collection.map_or("all", Collection::as_str)
        );
        state.subscribers.insert(
            id,
            Subscriber {
                owner,
                collection,
                sender,
            },
        );

        Subscription {
            id,
            hub: Arc::downgrade(&self.state),
            receiver,
        }
    }

    /// Delivers a change to matching subscribers and returns how many got it.
    pub fn publish(
        &self,
        owner: &OwnerId,
        collection: Collection,
        kind: ChangeKind,
        id: Option<Uuid>,
    ) -> usize {
        let mut state = lock(&self.state);
        state.next_sequence += 1;
        let change = RecordChange {
            sequence: state.next_sequence,
            owner: owner.clone(),
            collection,
            kind,
            id,
        };

        let mut delivered = 0;
        let mut gone = Vec::new();
        for (subscriber_id, subscriber) in &state.subscribers {
            if !subscriber.wants(owner, collection) {
                continue;
            }
            if subscriber.sender.send(change.clone()).is_ok() {
                delivered += 1;
            } else {
                gone.push(*subscriber_id);
            }
        }
        for subscriber_id in gone {
            state.subscribers.remove(&subscriber_id);
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }
}

/// Live feed guard. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<HubState>>,
    receiver: Receiver<RecordChange>,
}

impl Subscription {
    /// Next pending change without blocking.
    pub fn try_next(&self) -> Option<RecordChange> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next change.
    pub fn next_timeout(&self, timeout: Duration) -> Option<RecordChange> {
        match self.receiver.recv_timeout(timeout) {
            Ok(change) => Some(change),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// All changes received so far.
    pub fn drain(&self) -> Vec<RecordChange> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            lock(&state).subscribers.remove(&self.id);
            debug!(
                "event=live_unsubscribe module=live status=ok subscriber={}",
                self.id
            );
        }
    }
}
