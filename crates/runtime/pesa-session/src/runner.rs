//! Async driver for a reward session.
//!
//! Owns the one-second interval (the sole suspension point) and the fixed
//! celebration window. The interval lives inside the spawned task, so
//! aborting the task -- explicit cancel, replacement by a newer session, or
//! drop on teardown -- always releases the tick source. No partial credit:
//! cancellation never invokes the completion path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::session::{format_clock, Completion, RewardSession, SessionState};

/// What the host page supplies to a session.
#[async_trait]
pub trait SessionHooks: Send + Sync {
    /// Invoked exactly once when a rewarded session completes. This is where
    /// the earnings commit happens; the session does not care whether it
    /// succeeds -- failure handling is the committer's job.
    async fn on_complete(&self, amount: f64, video_title: &str);
    /// Return-to-catalog transition. Invoked exactly once per session that
    /// runs to its end (rewarded or not). Not invoked on cancellation.
    async fn on_back(&self);
}

/// Poll-friendly view of a running session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub title: String,
    pub embed_id: String,
    pub elapsed_secs: u32,
    pub total_secs: u32,
    pub progress_percent: f64,
    pub clock: String,
    pub earn_amount: Option<f64>,
}

pub struct SessionRunner {
    shared: Arc<Mutex<RewardSession>>,
    handle: JoinHandle<()>,
}

impl SessionRunner {
    /// Spawn the tick loop for an already-started session.
    pub fn spawn(
        session: RewardSession,
        hooks: Arc<dyn SessionHooks>,
        celebration: Duration,
    ) -> Self {
        let shared = Arc::new(Mutex::new(session));
        let handle = tokio::spawn(drive(Arc::clone(&shared), hooks, celebration));
        SessionRunner { shared, handle }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let s = self.shared.lock().await;
        SessionSnapshot {
            state: s.state(),
            title: s.video().title.clone(),
            embed_id: s.embed_id().to_string(),
            elapsed_secs: s.elapsed_secs(),
            total_secs: s.total_secs(),
            progress_percent: s.progress_percent(),
            clock: format!(
                "{} / {}",
                format_clock(s.elapsed_secs()),
                format_clock(s.total_secs())
            ),
            earn_amount: s.video().reward(),
        }
    }

    /// Back-navigation while Playing: halt the tick source, destroy the
    /// session, skip the completion path.
    pub async fn cancel(self) {
        self.handle.abort();
        self.shared.lock().await.close();
    }

    /// Wait for the session to run to its natural end.
    pub async fn finished(mut self) {
        // Borrow rather than move: SessionRunner has a Drop impl.
        let _ = (&mut self.handle).await;
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        // Teardown must never leave a ticking interval behind.
        self.handle.abort();
    }
}

async fn drive(
    shared: Arc<Mutex<RewardSession>>,
    hooks: Arc<dyn SessionHooks>,
    celebration: Duration,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick of a tokio interval fires immediately; consume it so
    // elapsed time starts counting one full second after spawn.
    interval.tick().await;

    loop {
        interval.tick().await;
        let completion = shared.lock().await.tick();
        match completion {
            None => continue,
            Some(Completion::Rewarded { amount, title }) => {
                // Drop the interval before the celebration window; the
                // session is completed and further ticks are pointless.
                drop(interval);
                hooks.on_complete(amount, &title).await;
                tokio::time::sleep(celebration).await;
                shared.lock().await.close();
                hooks.on_back().await;
                return;
            }
            Some(Completion::Unrewarded) => {
                drop(interval);
                hooks.on_back().await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RewardSession;
    use pesa_core::Video;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex as AsyncMutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct Recorder {
        completes: AtomicU32,
        backs: AtomicU32,
        last_amount: AsyncMutex<Option<f64>>,
    }

    #[async_trait]
    impl SessionHooks for Recorder {
        async fn on_complete(&self, amount: f64, _video_title: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            *self.last_amount.lock().await = Some(amount);
        }
        async fn on_back(&self) {
            self.backs.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn video(earn: Option<f64>) -> Video {
        Video {
            id: Uuid::new_v4(),
            category_id: None,
            title: "Chapati From Scratch".to_string(),
            description: String::new(),
            duration_minutes: Some(1),
            duration: None,
            earn_amount: earn,
            video_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            thumbnail: String::new(),
            premium: false,
            created_at: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rewarded_session_commits_once_then_returns() {
        let hooks = Arc::new(Recorder::default());
        let session = RewardSession::start(video(Some(50.0))).unwrap();
        let runner = SessionRunner::spawn(
            session,
            hooks.clone() as Arc<dyn SessionHooks>,
            Duration::from_secs(5),
        );
        runner.finished().await;
        assert_eq!(hooks.completes.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.backs.load(Ordering::SeqCst), 1);
        assert_eq!(*hooks.last_amount.lock().await, Some(50.0));
    }

    #[tokio::test(start_paused = true)]
    async fn unrewarded_session_returns_without_commit() {
        let hooks = Arc::new(Recorder::default());
        let session = RewardSession::start(video(Some(0.0))).unwrap();
        let runner = SessionRunner::spawn(
            session,
            hooks.clone() as Arc<dyn SessionHooks>,
            Duration::from_secs(5),
        );
        runner.finished().await;
        assert_eq!(hooks.completes.load(Ordering::SeqCst), 0);
        assert_eq!(hooks.backs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_play_never_commits() {
        let hooks = Arc::new(Recorder::default());
        let session = RewardSession::start(video(Some(50.0))).unwrap();
        let runner = SessionRunner::spawn(
            session,
            hooks.clone() as Arc<dyn SessionHooks>,
            Duration::from_secs(5),
        );

        tokio::time::advance(Duration::from_secs(30)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        let snap = runner.snapshot().await;
        assert_eq!(snap.state, SessionState::Playing);
        assert!(snap.elapsed_secs < 60);

        runner.cancel().await;
        tokio::time::advance(Duration::from_secs(300)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(hooks.completes.load(Ordering::SeqCst), 0);
        assert_eq!(hooks.backs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_reports_progress() {
        let hooks = Arc::new(Recorder::default());
        let session = RewardSession::start(video(Some(50.0))).unwrap();
        let runner = SessionRunner::spawn(
            session,
            hooks as Arc<dyn SessionHooks>,
            Duration::from_secs(5),
        );
        let snap = runner.snapshot().await;
        assert_eq!(snap.total_secs, 60);
        assert_eq!(snap.embed_id, "dQw4w9WgXcQ");
        assert_eq!(snap.clock, "0:00 / 1:00");
        runner.cancel().await;
    }
}
