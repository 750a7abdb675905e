use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::{GesturePhase, SessionView, SwipeSession};
use crate::{
    error::{AppError, AppResult},
    models::{Person, UserId},
};

/// Longest pause between idle sweeps
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// A session together with who is swiping and whose filmography it is
#[derive(Debug)]
pub struct HostedSession {
    pub user_id: UserId,
    pub person: Person,
    pub session: SwipeSession,
}

impl HostedSession {
    /// Every card decided and nothing left animating
    fn is_finished(&self) -> bool {
        self.session.is_complete() && self.session.phase() == GesturePhase::Idle
    }
}

struct Entry {
    hosted: HostedSession,
    last_active: Instant,
}

/// Live swipe sessions keyed by session id
///
/// A session is dropped once it is finished, when it is deleted, or when it
/// has seen no gesture or frame for longer than the idle timeout.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Swipe session {} not found", id))
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, hosted: HostedSession) -> Uuid {
        let id = Uuid::new_v4();
        let entry = Entry {
            hosted,
            last_active: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        id
    }

    /// Runs `f` against a session under the write lock
    ///
    /// The session is dropped afterwards if `f` left it finished, so `f`
    /// should capture whatever final view it needs.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut HostedSession) -> T,
    ) -> AppResult<T> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        entry.last_active = Instant::now();
        let result = f(&mut entry.hosted);

        if entry.hosted.is_finished() {
            if let Some(mut entry) = sessions.remove(&id) {
                entry.hosted.session.unmount();
                log_finished(id, &entry.hosted);
            }
        }
        Ok(result)
    }

    /// Runs `f` against a session under the read lock
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&HostedSession) -> T) -> AppResult<T> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(&entry.hosted))
    }

    pub async fn view(&self, id: Uuid) -> AppResult<SessionView> {
        self.read(id, |hosted| hosted.session.view()).await
    }

    /// Drops a session that is already finished, such as one whose deck was
    /// empty from the start
    pub async fn release_if_finished(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let finished = sessions
            .get(&id)
            .is_some_and(|entry| entry.hosted.is_finished());
        if finished {
            if let Some(mut entry) = sessions.remove(&id) {
                entry.hosted.session.unmount();
                log_finished(id, &entry.hosted);
            }
        }
        finished
    }

    /// Unmounts and drops a session, returning its final view
    pub async fn remove(&self, id: Uuid) -> AppResult<SessionView> {
        let Entry { mut hosted, .. } = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| not_found(id))?;

        if let Some(decision) = hosted.session.unmount() {
            tracing::info!(
                session_id = %id,
                title_id = decision.title_id,
                "In-flight swipe completed on unmount"
            );
        }

        Ok(hosted.session.view())
    }

    /// Unmounts and drops sessions with no gesture or frame for `idle`
    ///
    /// Returns how many were dropped.
    pub async fn sweep_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let stale: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_active) >= idle)
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            if let Some(mut entry) = sessions.remove(id) {
                let decision = entry.hosted.session.unmount();
                tracing::info!(
                    session_id = %id,
                    user_id = %entry.hosted.user_id,
                    in_flight = decision.is_some(),
                    "Idle swipe session dropped"
                );
            }
        }
        stale.len()
    }

    /// Sweeps idle sessions in the background until the handle is aborted
    pub fn spawn_sweeper(&self, idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        let period = idle.clamp(Duration::from_secs(1), MAX_SWEEP_PERIOD);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let dropped = registry.sweep_idle(idle).await;
                if dropped > 0 {
                    tracing::debug!(dropped, "Swept idle swipe sessions");
                }
            }
        })
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn log_finished(id: Uuid, hosted: &HostedSession) {
    tracing::info!(
        session_id = %id,
        user_id = %hosted.user_id,
        seen_this_session = hosted.session.seen_this_session(),
        percent = hosted.session.completion_percent(),
        "Swipe session finished"
    );
}
