//! Shared application state.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use pesa_config::PesaConfig;
use pesa_gateway::{AuthClient, DataStore, SupabaseStore};
use pesa_session::SessionRunner;

/// The signed-in user as the pages see them.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
}

/// The one active reward session, if any. Replacing the slot drops the old
/// runner, which aborts its tick task.
pub struct ActiveWatch {
    pub video_id: Uuid,
    pub runner: SessionRunner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot banner carried across a redirect.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub struct AppState {
    pub config: PesaConfig,
    pub store: Arc<dyn DataStore>,
    /// Set when a hosted backend is configured; used to attach the user's
    /// bearer token after sign-in.
    pub supabase: Option<Arc<SupabaseStore>>,
    pub auth: Option<AuthClient>,
    pub user: RwLock<Option<CurrentUser>>,
    pub watch: RwLock<Option<ActiveWatch>>,
    pub notice: RwLock<Option<Notice>>,
}

impl AppState {
    pub async fn current_user(&self) -> Option<CurrentUser> {
        self.user.read().await.clone()
    }

    pub async fn set_notice(&self, kind: NoticeKind, message: impl Into<String>) {
        *self.notice.write().await = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    /// Pop the pending banner, if any. Each notice renders once.
    pub async fn take_notice(&self) -> Option<Notice> {
        self.notice.write().await.take()
    }
}
