/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Per-session filter state.
//!
//! Each session owns the set of sub-filter values admitted so far. Sessions
//! live in a map behind a read-write lock, and every session's set sits
//! behind its own mutex so that a filter decision and the update it implies
//! commit together.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    /// BeginString (FIX version).
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
}

impl SessionId {
    /// Creates a new session ID.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
        }
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )
    }
}

/// Admitted sub-filter values of one session.
pub type AdmittedSet = Arc<Mutex<HashSet<String>>>;

/// Admitted sub-filter values, per session.
#[derive(Debug, Default)]
pub struct SessionFilterStore {
    sessions: RwLock<HashMap<SessionId, AdmittedSet>>,
}

impl SessionFilterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the admitted set of `id`, creating it on first use.
    #[must_use]
    pub fn session(&self, id: &SessionId) -> AdmittedSet {
        if let Some(set) = self.sessions.read().get(id) {
            return Arc::clone(set);
        }
        Arc::clone(self.sessions.write().entry(id.clone()).or_default())
    }

    /// Returns true if `value` has been admitted for `id`.
    #[must_use]
    pub fn is_admitted(&self, id: &SessionId, value: &str) -> bool {
        self.sessions
            .read()
            .get(id)
            .is_some_and(|set| set.lock().contains(value))
    }

    /// Returns a snapshot of the values admitted for `id`.
    #[must_use]
    pub fn admitted(&self, id: &SessionId) -> HashSet<String> {
        self.sessions
            .read()
            .get(id)
            .map(|set| set.lock().clone())
            .unwrap_or_default()
    }

    /// Clears the admitted values of `id`, keeping the session.
    pub fn reset(&self, id: &SessionId) {
        if let Some(set) = self.sessions.read().get(id) {
            set.lock().clear();
        }
    }

    /// Forgets `id`; returns true if it was known.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    /// Returns the number of known sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if no session is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
