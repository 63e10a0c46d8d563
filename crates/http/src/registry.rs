//! Per-browser session registry.
//!
//! Each session owns its chat conversation and its RAG state behind a
//! `tokio::sync::Mutex`, so actions within one session run one at a time while
//! different sessions proceed independently. Sessions idle longer than the
//! configured window are evicted whenever the registry is accessed.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Duration, Utc};
use ragchat_core::Conversation;
use ragchat_service::{Phase, RagSession};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "ragchat_session";

/// Mutable state of one browser session.
#[derive(Debug)]
pub struct SessionState {
    pub conversation: Conversation,
    pub rag: RagSession,
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Phase of the session's current or latest action. Readable without the
/// session lock, so it reports `AwaitingModel` while a request is in flight.
#[derive(Debug, Default)]
pub struct PhaseCell(std::sync::Mutex<Phase>);

impl PhaseCell {
    pub fn set(&self, phase: Phase) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    #[must_use]
    pub fn get(&self) -> Phase {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Slot {
    state: SharedSession,
    phase: Arc<PhaseCell>,
    last_seen: DateTime<Utc>,
}

/// Result of looking up (or creating) a session.
pub struct Checkout {
    pub id: String,
    pub state: SharedSession,
    pub phase: Arc<PhaseCell>,
    pub created: bool,
    /// Sessions that went idle and were removed during this lookup. Their RAG
    /// collections still need to be released.
    pub evicted: Vec<SharedSession>,
}

pub struct SessionRegistry {
    slots: std::sync::Mutex<HashMap<String, Slot>>,
    idle: Duration,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(idle_secs: u64) -> Self {
        let idle = i64::try_from(idle_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self { slots: std::sync::Mutex::new(HashMap::new()), idle }
    }

    /// Returns the session for `requested`, creating it when unknown.
    ///
    /// Ids that are not UUIDs are replaced by a fresh one.
    pub fn checkout(
        &self,
        requested: Option<&str>,
        fresh: impl FnOnce(&str) -> SessionState,
    ) -> Checkout {
        self.checkout_at(requested, fresh, Utc::now())
    }

    pub(crate) fn checkout_at(
        &self,
        requested: Option<&str>,
        fresh: impl FnOnce(&str) -> SessionState,
        now: DateTime<Utc>,
    ) -> Checkout {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let evicted = self.evict_idle(&mut slots, now);

        let id = requested
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .unwrap_or_else(Uuid::new_v4)
            .to_string();

        let mut created = false;
        let slot = slots.entry(id.clone()).or_insert_with(|| {
            created = true;
            tracing::debug!(session = %id, "session created");
            Slot {
                state: Arc::new(Mutex::new(fresh(&id))),
                phase: Arc::default(),
                last_seen: now,
            }
        });
        slot.last_seen = now;

        Checkout {
            id,
            state: Arc::clone(&slot.state),
            phase: Arc::clone(&slot.phase),
            created,
            evicted,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn evict_idle(
        &self,
        slots: &mut HashMap<String, Slot>,
        now: DateTime<Utc>,
    ) -> Vec<SharedSession> {
        let expired: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| now.signed_duration_since(slot.last_seen) > self.idle)
            .map(|(id, _)| id.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|id| {
                tracing::info!(session = %id, "evicting idle session");
                slots.remove(&id).map(|slot| slot.state)
            })
            .collect()
    }
}

/// Session id from the request's `Cookie` header, if present.
#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value binding the browser to `id`.
#[must_use]
pub fn set_session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
