//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-session slots.

use letter_jumble_core::{GameEngine, Session};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GameEngine>,
    pub sessions: SessionStore,
}

//=========================================================================================
// SessionSlot (Specific to One Game Session)
//=========================================================================================

/// One live session. The mutex serializes turns; the token is cancelled when the
/// session is closed so an in-flight turn can be abandoned.
pub struct SessionSlot {
    pub session: Mutex<Session>,
    pub cancellation_token: CancellationToken,
    last_active: std::sync::Mutex<Instant>,
}

impl SessionSlot {
    fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            cancellation_token: CancellationToken::new(),
            last_active: std::sync::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last = *self.last_active.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last)
    }
}

//=========================================================================================
// SessionStore
//=========================================================================================

/// In-memory registry of live sessions keyed by session id.
#[derive(Clone, Default)]
pub struct SessionStore {
    slots: Arc<RwLock<HashMap<Uuid, Arc<SessionSlot>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session and returns its id.
    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.slots
            .write()
            .await
            .insert(id, Arc::new(SessionSlot::new(session)));
        info!("Session {} opened", id);
        id
    }

    /// Looks a session up and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionSlot>> {
        let slot = self.slots.read().await.get(&id).cloned()?;
        slot.touch();
        Some(slot)
    }

    /// Removes a session and cancels any turn still running against it.
    pub async fn close(&self, id: Uuid) -> bool {
        match self.slots.write().await.remove(&id) {
            Some(slot) => {
                slot.cancellation_token.cancel();
                info!("Session {} closed", id);
                true
            }
            None => false,
        }
    }

    /// Closes every session idle for at least `ttl` as of `now`. Sessions with a
    /// turn in flight are left alone.
    pub async fn close_idle(&self, now: Instant, ttl: Duration) -> Vec<Uuid> {
        let expired: Vec<Uuid> = self
            .slots
            .read()
            .await
            .iter()
            .filter(|(_, slot)| slot.session.try_lock().is_ok() && slot.idle_for(now) >= ttl)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if self.close(*id).await {
                info!("Session {} expired after {:?} idle", id, ttl);
            }
        }
        expired
    }

    /// Starts a background task that closes idle sessions until the runtime stops.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = ttl.min(Duration::from_secs(60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let expired = store.close_idle(Instant::now(), ttl).await;
                if !expired.is_empty() {
                    debug!("Sweeper closed {} idle session(s)", expired.len());
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}
