//! Session Store: per-user sessions behind per-user async mutexes.
//!
//! A handler holds the user's `SessionGuard` for the whole processing of one
//! inbound message, including every collaborator call it awaits. That gives the
//! "one in-flight handler per user" discipline; different users lock different
//! mutexes and proceed concurrently.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::session::{Mode, Session, SessionSnapshot, UserId};

type Slot = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    slots: Arc<DashMap<UserId, Slot>>,
}

/// Exclusive access to one user's session.
pub struct SessionGuard {
    user_id: UserId,
    slot: Slot,
    session: OwnedMutexGuard<Session>,
}

impl SessionGuard {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Deref for SessionGuard {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the user's session, creating an idle one on first access.
    ///
    /// If the slot was cleared while this caller waited on its lock, the
    /// caller retries against the live slot instead of mutating an orphan.
    pub async fn acquire(&self, user_id: UserId) -> SessionGuard {
        loop {
            let slot = self
                .slots
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(user_id))))
                .clone();

            let session = slot.clone().lock_owned().await;

            let live = self
                .slots
                .get(&user_id)
                .map(|current| Arc::ptr_eq(current.value(), &slot))
                .unwrap_or(false);

            if live {
                return SessionGuard {
                    user_id,
                    slot,
                    session,
                };
            }
            debug!("Session slot for user {user_id} was cleared while waiting, retrying");
        }
    }

    /// Resets the held session to `mode`'s initial phase with empty buffers.
    pub fn reset(&self, guard: &mut SessionGuard, mode: Mode) {
        debug!("Resetting session of user {} to {mode:?}", guard.user_id);
        guard.session.reset(mode);
    }

    /// Removes the user's session entirely. The guard is left holding a fresh
    /// idle session so the caller can still read from it.
    pub fn clear(&self, guard: &mut SessionGuard) {
        let user_id = guard.user_id;
        self.slots
            .remove_if(&user_id, |_, slot| Arc::ptr_eq(slot, &guard.slot));
        *guard.session = Session::new(user_id);
    }

    /// Snapshot of the user's session, waiting for any in-flight handler.
    pub async fn snapshot(&self, user_id: UserId) -> Option<SessionSnapshot> {
        let slot = self.slots.get(&user_id).map(|s| s.value().clone())?;
        let session = slot.lock().await;
        Some(session.snapshot())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
