//! Admin CRUD over categories and videos.
//!
//! Deleting a category cascades: videos referencing it go first, then the
//! category row. Video saves are validated server-side even though the form
//! also disables submission -- the form check is advisory, this one is not.

use thiserror::Error;
use uuid::Uuid;

use pesa_core::StoreError;
use pesa_gateway::{CategoryDraft, DataStore, VideoDraft};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A video must carry a title, a source URL, and a positive earn amount.
pub fn validate_video(draft: &VideoDraft) -> Result<(), AdminError> {
    if draft.title.trim().is_empty()
        || draft.video_url.trim().is_empty()
        || !draft.earn_amount.is_some_and(|a| a > 0.0)
    {
        return Err(AdminError::Validation(
            "Please fill out all required fields. Earn Amount must be greater than 0.".to_string(),
        ));
    }
    Ok(())
}

fn validate_category(draft: &CategoryDraft) -> Result<(), AdminError> {
    if draft.title.trim().is_empty() {
        return Err(AdminError::Validation("Category title is required.".to_string()));
    }
    Ok(())
}

/// Insert or (when `id` is set) update a category.
pub async fn save_category(
    store: &dyn DataStore,
    id: Option<Uuid>,
    draft: &CategoryDraft,
) -> Result<(), AdminError> {
    validate_category(draft)?;
    match id {
        Some(id) => store.update_category(id, draft).await?,
        None => store.insert_category(draft).await?,
    }
    Ok(())
}

/// Insert or update a video, after validation.
pub async fn save_video(
    store: &dyn DataStore,
    id: Option<Uuid>,
    draft: &VideoDraft,
) -> Result<(), AdminError> {
    validate_video(draft)?;
    match id {
        Some(id) => store.update_video(id, draft).await?,
        None => store.insert_video(draft).await?,
    }
    Ok(())
}

/// Cascading delete: all videos in the category, then the category itself.
pub async fn delete_category(store: &dyn DataStore, id: Uuid) -> Result<(), AdminError> {
    tracing::info!(category = %id, "deleting category and its videos");
    store.delete_videos_in_category(id).await?;
    store.delete_category_row(id).await?;
    Ok(())
}

pub async fn delete_video(store: &dyn DataStore, id: Uuid) -> Result<(), AdminError> {
    store.delete_video(id).await?;
    Ok(())
}
