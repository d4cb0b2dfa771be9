//! # Session Manager
//!
//! One session per outbound block request. A configured cap on open
//! sessions bounds concurrent catch-up conversations regardless of how
//! many peers are involved. Timeout is local abandonment: no cancel
//! message is sent, the slot is simply freed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use basin_types::PeerId;

/// How a session ended, if it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    /// Closed after the peer reported us synced.
    Completed,
    /// Closed without completing: timeout, rejection, or no more blocks.
    Uncompleted,
}

/// A tracked catch-up conversation with one peer.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i32,
    pub peer_id: PeerId,
    pub from: u32,
    pub to: u32,
    pub status: SessionStatus,
    pub opened_at: Instant,
}

/// Creates, tracks and closes block-request sessions.
#[derive(Debug)]
pub struct SessionManager {
    sessions: HashMap<i32, Session>,
    next_id: i32,
    max_open: usize,
}

impl SessionManager {
    pub fn new(max_open: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 0,
            max_open,
        }
    }

    /// Open a session toward `peer_id` for heights `[from, to]`.
    ///
    /// Returns `None` once the open-session cap is reached.
    pub fn open_session(&mut self, peer_id: PeerId, from: u32, to: u32) -> Option<&Session> {
        if self.sessions.len() >= self.max_open {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        let session = Session {
            id,
            peer_id,
            from,
            to,
            status: SessionStatus::Open,
            opened_at: Instant::now(),
        };
        Some(self.sessions.entry(id).or_insert(session))
    }

    pub fn find_session(&self, id: i32) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Close and remove a session, freeing its slot.
    pub fn close_session(&mut self, id: i32, status: SessionStatus) -> Option<Session> {
        self.sessions.remove(&id).map(|mut session| {
            session.status = status;
            session
        })
    }

    pub fn number_of_open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Whether a session toward `peer_id` is already in flight.
    pub fn has_open_session_with(&self, peer_id: &PeerId) -> bool {
        self.sessions.values().any(|s| s.peer_id == *peer_id)
    }

    /// Abandon sessions older than `ttl`, returning what was closed.
    pub fn close_expired_sessions(&mut self, ttl: Duration) -> Vec<Session> {
        let expired: Vec<i32> = self
            .sessions
            .values()
            .filter(|s| s.opened_at.elapsed() >= ttl)
            .map(|s| s.id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.close_session(id, SessionStatus::Uncompleted))
            .collect()
    }

    /// Abandon everything, for synchronizer shutdown.
    pub fn close_all(&mut self) {
        self.sessions.clear();
    }
}
