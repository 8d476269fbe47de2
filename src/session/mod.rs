//! In-memory session store: one cached trade table per upload.
//!
//! Each upload creates a fresh session; filter and export requests re-use
//! the cached human-use table instead of re-parsing the workbook. Nothing is
//! persisted: a table lives for one upload-to-export cycle and is evicted
//! when the store fills up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};
use crate::models::TradeTable;
use crate::transform::pipeline::SheetInfo;

/// Upper bound on concurrently cached sessions.
const MAX_SESSIONS: usize = 64;

/// Global session store used by the HTTP server.
pub static SESSIONS: Lazy<SessionStore> = Lazy::new(|| SessionStore::new(MAX_SESSIONS));

/// One upload's cached pipeline output.
#[derive(Debug, Clone)]
pub struct Session {
    /// The human-use table the selection filters narrow.
    pub table: TradeTable,
    /// Sheet metadata from ingestion.
    pub sheet: SheetInfo,
    pub created_at: DateTime<Utc>,
    /// Insertion order, used for oldest-first eviction.
    seq: u64,
}

/// Bounded in-memory store of upload sessions, keyed by UUID.
pub struct SessionStore {
    max_sessions: usize,
    next_seq: AtomicU64,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            max_sessions,
            next_seq: AtomicU64::new(0),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Cache a new session, evicting the oldest one when the store is full.
    /// Returns the new session id.
    pub fn insert(&self, table: TradeTable, sheet: SheetInfo) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            table,
            sheet,
            created_at: Utc::now(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        // A panicked holder leaves the map intact; recover the guard.
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if sessions.len() >= self.max_sessions {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.seq)
                .map(|(id, _)| *id)
            {
                sessions.remove(&oldest);
            }
        }
        sessions.insert(id, session);
        id
    }

    /// Fetch a session by id.
    pub fn get(&self, id: &Uuid) -> SessionResult<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or(SessionError::NotFound(*id))
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
