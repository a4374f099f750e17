//! The reward-session state machine.
//!
//! Pure and synchronous: callers feed it one tick per second and act on the
//! returned [`Completion`]. Completion fires exactly once per session no
//! matter how many more ticks arrive -- the completed flag is checked and
//! set in the same `&mut self` call, so there is no window for the tick
//! source to re-enter the completion path.

use serde::Serialize;
use thiserror::Error;

use pesa_core::Video;

use crate::resolver::resolve_embed_id;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The video URL does not yield an embeddable identifier. No timer is
    /// started for such a session.
    #[error("invalid video source: {0}")]
    InvalidSource(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Counting down. The only state in which ticks advance time.
    Playing,
    /// Completed with a reward; the celebration overlay is up.
    Celebrating,
    /// Terminal. The catalog transition has been (or is being) invoked.
    Closed,
}

/// What a completing tick produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Valid earn amount: celebrate and commit exactly once.
    Rewarded { amount: f64, title: String },
    /// Missing/zero/negative earn amount: skip the commit entirely.
    Unrewarded,
}

#[derive(Debug)]
pub struct RewardSession {
    video: Video,
    embed_id: String,
    elapsed_secs: u32,
    total_secs: u32,
    completed: bool,
    state: SessionState,
}

impl RewardSession {
    /// Resolve the source and enter Playing. Fails fast on an invalid
    /// source so no timer ever starts for it.
    pub fn start(video: Video) -> Result<Self, SessionError> {
        let embed_id = resolve_embed_id(&video.video_url)
            .ok_or_else(|| SessionError::InvalidSource(video.video_url.clone()))?;
        let total_secs = video.duration_min() * 60;
        Ok(RewardSession {
            video,
            embed_id,
            elapsed_secs: 0,
            total_secs,
            completed: false,
            state: SessionState::Playing,
        })
    }

    /// Advance one second. Returns `Some` exactly once, on the tick that
    /// reaches the full duration; every later tick is a no-op.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.completed || self.state != SessionState::Playing {
            return None;
        }
        self.elapsed_secs += 1;
        if self.elapsed_secs < self.total_secs {
            return None;
        }
        self.completed = true;
        match self.video.reward() {
            Some(amount) => {
                self.state = SessionState::Celebrating;
                Some(Completion::Rewarded {
                    amount,
                    title: self.video.title.clone(),
                })
            }
            None => {
                tracing::warn!(
                    video = %self.video.id,
                    "video completed with no valid earn amount, skipping commit"
                );
                self.state = SessionState::Closed;
                Some(Completion::Unrewarded)
            }
        }
    }

    /// Celebration window over (or session cancelled): terminal.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    pub fn embed_id(&self) -> &str {
        &self.embed_id
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    /// Displayed progress, clamped to 100.
    pub fn progress_percent(&self) -> f64 {
        let pct = f64::from(self.elapsed_secs) / f64::from(self.total_secs) * 100.0;
        pct.min(100.0)
    }
}

/// `m:ss` clock for the progress bar.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_core::Video;
    use uuid::Uuid;

    fn video(duration_min: u32, earn: Option<f64>, url: &str) -> Video {
        Video {
            id: Uuid::new_v4(),
            category_id: None,
            title: "Afrobeat Mix 2026".to_string(),
            description: String::new(),
            duration_minutes: Some(duration_min),
            duration: None,
            earn_amount: earn,
            video_url: url.to_string(),
            thumbnail: String::new(),
            premium: false,
            created_at: None,
        }
    }

    const GOOD_URL: &str = "https://youtu.be/dQw4w9WgXcQ";

    #[test]
    fn invalid_source_never_starts() {
        let err = RewardSession::start(video(1, Some(50.0), "https://example.com/not-a-video"))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidSource(_)));
    }

    #[test]
    fn completes_at_exactly_full_duration() {
        let mut s = RewardSession::start(video(1, Some(50.0), GOOD_URL)).unwrap();
        for _ in 0..59 {
            assert_eq!(s.tick(), None);
        }
        assert_eq!(s.elapsed_secs(), 59);
        let completion = s.tick().expect("60th tick completes");
        assert_eq!(
            completion,
            Completion::Rewarded {
                amount: 50.0,
                title: "Afrobeat Mix 2026".to_string()
            }
        );
        assert_eq!(s.state(), SessionState::Celebrating);
    }

    #[test]
    fn completion_fires_exactly_once_under_continued_ticks() {
        let mut s = RewardSession::start(video(1, Some(50.0), GOOD_URL)).unwrap();
        let mut completions = 0;
        for _ in 0..200 {
            if s.tick().is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        // Post-completion ticks must not mutate state either.
        assert_eq!(s.elapsed_secs(), 60);
    }

    #[test]
    fn zero_earn_skips_reward_and_closes() {
        let mut s = RewardSession::start(video(1, Some(0.0), GOOD_URL)).unwrap();
        for _ in 0..59 {
            assert_eq!(s.tick(), None);
        }
        assert_eq!(s.tick(), Some(Completion::Unrewarded));
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[test]
    fn missing_earn_behaves_like_zero() {
        let mut s = RewardSession::start(video(1, None, GOOD_URL)).unwrap();
        for _ in 0..60 {
            s.tick();
        }
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[test]
    fn longer_durations_scale_in_ticks() {
        let mut s = RewardSession::start(video(3, Some(25.0), GOOD_URL)).unwrap();
        for _ in 0..179 {
            assert_eq!(s.tick(), None);
        }
        assert!(s.tick().is_some());
    }

    #[test]
    fn progress_is_clamped() {
        let mut s = RewardSession::start(video(1, Some(50.0), GOOD_URL)).unwrap();
        assert_eq!(s.progress_percent(), 0.0);
        for _ in 0..30 {
            s.tick();
        }
        assert_eq!(s.progress_percent(), 50.0);
        for _ in 0..100 {
            s.tick();
        }
        assert_eq!(s.progress_percent(), 100.0);
    }

    #[test]
    fn close_while_playing_blocks_completion() {
        let mut s = RewardSession::start(video(1, Some(50.0), GOOD_URL)).unwrap();
        for _ in 0..30 {
            s.tick();
        }
        s.close();
        for _ in 0..100 {
            assert_eq!(s.tick(), None);
        }
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[test]
    fn clock_formats_mm_ss() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
    }
}
