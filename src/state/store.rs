//! Shared session store: the cross-tab mirror of editor state.
//!
//! One [`SessionStore`] exists per browser-session equivalent; each open
//! editor view ("tab") holds a [`TabHandle`]. The store keeps a single
//! serialized slot with the latest sprite set and view cursor - never the
//! undo history, which stays per-tab. Writes replace the slot wholesale
//! and broadcast to every other handle; there is no merge and no lock, so
//! concurrent writers resolve by most-recent-write-wins. When the last
//! handle is dropped the slot is cleared (session-scoped cleanup).

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::{SpriteSet, ViewCursor};

/// The shared-slot payload: full sprite set plus navigation cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    pub sprite_set: SpriteSet,
    pub cursor: ViewCursor,
}

#[derive(Default)]
struct Shared {
    slot: Option<String>,
    next_tab_id: u64,
    subscribers: Vec<(u64, Sender<String>)>,
}

/// Process-wide shared state container with `get`/`replace`/`subscribe`
/// semantics, cloneable into anything that needs to attach a tab.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Shared>>,
}

// A poisoned mutex only means another handle panicked mid-write; the slot
// itself is a plain string, so recover the guard rather than spreading the
// poison to every tab.
fn lock(inner: &Arc<Mutex<Shared>>) -> MutexGuard<'_, Shared> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tab. The handle receives every subsequent broadcast
    /// from other tabs and un-registers itself on drop.
    pub fn attach(&self) -> TabHandle {
        let mut shared = lock(&self.inner);
        let id = shared.next_tab_id;
        shared.next_tab_id += 1;
        let (tx, rx) = channel();
        shared.subscribers.push((id, tx));
        TabHandle {
            inner: Arc::clone(&self.inner),
            id,
            rx,
        }
    }

    /// Number of currently attached tabs.
    pub fn tab_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }

    /// Whether the shared slot currently holds a snapshot.
    pub fn has_snapshot(&self) -> bool {
        lock(&self.inner).slot.is_some()
    }
}

/// One tab's connection to the shared store.
pub struct TabHandle {
    inner: Arc<Mutex<Shared>>,
    id: u64,
    rx: Receiver<String>,
}

impl TabHandle {
    /// Push a new snapshot into the shared slot and notify every other
    /// tab. Last writer wins; no merge.
    pub fn replace(&self, snapshot: &StoreSnapshot) {
        let payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to serialize store snapshot: {}", err);
                return;
            }
        };

        let shared = &mut *lock(&self.inner);
        shared.slot = Some(payload.clone());
        for (id, tx) in &shared.subscribers {
            if *id != self.id {
                // A disconnected receiver just means that tab is gone.
                let _ = tx.send(payload.clone());
            }
        }
    }

    /// Read the shared slot. A malformed payload is treated as absent.
    pub fn current(&self) -> Option<StoreSnapshot> {
        let payload = lock(&self.inner).slot.clone()?;
        match serde_json::from_str(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!("ignoring malformed shared snapshot: {}", err);
                None
            }
        }
    }

    /// Drain pending change notifications and return the most recent
    /// well-formed snapshot, if any. Malformed payloads are logged and
    /// skipped so one corrupted writer cannot poison this tab.
    pub fn poll(&self) -> Option<StoreSnapshot> {
        let mut latest = None;
        while let Ok(payload) = self.rx.try_recv() {
            match serde_json::from_str(&payload) {
                Ok(snapshot) => latest = Some(snapshot),
                Err(err) => warn!("ignoring malformed store broadcast: {}", err),
            }
        }
        latest
    }

    /// Number of currently attached tabs, this one included.
    pub fn tab_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl Drop for TabHandle {
    fn drop(&mut self) {
        let mut shared = lock(&self.inner);
        shared.subscribers.retain(|(id, _)| *id != self.id);
        if shared.subscribers.is_empty() {
            // Last tab closed: discard the session-scoped shared state.
            shared.slot = None;
        }
    }
}
