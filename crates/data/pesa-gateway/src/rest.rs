//! PostgREST-backed `DataStore`.
//!
//! Thin typed wrapper over the hosted store's REST layer. Every call sends
//! the anon key plus, once a user has signed in, their bearer token so
//! row-level security applies server-side.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;
use url::Url;
use uuid::Uuid;

use pesa_core::{Category, EarningsRecord, Profile, StoreError, Video};

use crate::store::{CategoryDraft, DataStore, VideoDraft};

pub struct SupabaseStore {
    base: Url,
    anon_key: String,
    http: reqwest::Client,
    bearer: RwLock<Option<String>>,
}

impl SupabaseStore {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| StoreError::Transport(format!("bad backend url: {e}")))?;
        Ok(SupabaseStore {
            base,
            anon_key: anon_key.to_string(),
            http: reqwest::Client::new(),
            bearer: RwLock::new(None),
        })
    }

    /// Attach the signed-in user's access token. Subsequent calls run under
    /// that user's row-level policies.
    pub fn set_bearer(&self, token: Option<String>) {
        if let Ok(mut guard) = self.bearer.write() {
            *guard = token;
        }
    }

    fn token(&self) -> String {
        self.bearer
            .read()
            .ok()
            .and_then(|g| g.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn rest_url(&self, path_and_query: &str) -> Result<Url, StoreError> {
        self.base
            .join(&format!("rest/v1/{path_and_query}"))
            .map_err(|e| StoreError::Transport(format!("bad request path: {e}")))
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(self.token())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), %message, "backend call failed");
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_rows<T: DeserializeOwned>(&self, query: &str) -> Result<Vec<T>, StoreError> {
        let url = self.rest_url(query)?;
        tracing::debug!(%url, "store select");
        let resp = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let resp = Self::check(resp).await?;
        resp.json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn insert_row<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let url = self.rest_url(table)?;
        tracing::debug!(table, "store insert");
        let resp = self
            .authed(self.http.post(url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Self::check(resp).await.map(|_| ())
    }

    async fn patch_rows<T: Serialize + ?Sized>(
        &self,
        query: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let url = self.rest_url(query)?;
        tracing::debug!(query, "store update");
        let resp = self
            .authed(self.http.patch(url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Self::check(resp).await.map(|_| ())
    }

    async fn delete_rows(&self, query: &str) -> Result<(), StoreError> {
        let url = self.rest_url(query)?;
        tracing::debug!(query, "store delete");
        let resp = self
            .authed(self.http.delete(url))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Self::check(resp).await.map(|_| ())
    }
}

#[async_trait]
impl DataStore for SupabaseStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.get_rows("categories?select=*&order=created_at.asc")
            .await
    }

    async fn videos(&self) -> Result<Vec<Video>, StoreError> {
        self.get_rows("videos?select=*&order=created_at.asc").await
    }

    async fn insert_category(&self, draft: &CategoryDraft) -> Result<(), StoreError> {
        self.insert_row("categories", draft).await
    }

    async fn update_category(&self, id: Uuid, draft: &CategoryDraft) -> Result<(), StoreError> {
        self.patch_rows(&format!("categories?id=eq.{id}"), draft)
            .await
    }

    async fn delete_category_row(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_rows(&format!("categories?id=eq.{id}")).await
    }

    async fn insert_video(&self, draft: &VideoDraft) -> Result<(), StoreError> {
        self.insert_row("videos", draft).await
    }

    async fn update_video(&self, id: Uuid, draft: &VideoDraft) -> Result<(), StoreError> {
        self.patch_rows(&format!("videos?id=eq.{id}"), draft).await
    }

    async fn delete_video(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_rows(&format!("videos?id=eq.{id}")).await
    }

    async fn delete_videos_in_category(&self, category_id: Uuid) -> Result<(), StoreError> {
        self.delete_rows(&format!("videos?category_id=eq.{category_id}"))
            .await
    }

    async fn profile(&self, user_id: Uuid) -> Result<Profile, StoreError> {
        let rows: Vec<Profile> = self
            .get_rows(&format!("profiles?select=id,earnings,tier&id=eq.{user_id}"))
            .await?;
        rows.into_iter()
            .next()
            .ok_or(StoreError::MissingRow("profiles"))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.insert_row("profiles", profile).await
    }

    async fn earnings_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<EarningsRecord>, StoreError> {
        // The Z suffix form: a "+00:00" offset would need its plus sign
        // percent-encoded to survive query parsing.
        self.get_rows(&format!(
            "earnings_history?select=*&user_id=eq.{user_id}&created_at=gte.{}&order=created_at.asc",
            since.to_rfc3339_opts(SecondsFormat::Micros, true)
        ))
        .await
    }

    async fn recent_earnings(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EarningsRecord>, StoreError> {
        self.get_rows(&format!(
            "earnings_history?select=*&user_id=eq.{user_id}&order=created_at.desc&limit={limit}"
        ))
        .await
    }

    async fn add_earnings_and_log(
        &self,
        amount: f64,
        description: &str,
    ) -> Result<(), StoreError> {
        let url = self.rest_url("rpc/add_earnings_and_log")?;
        tracing::info!(amount, description, "calling add_earnings_and_log");
        let body = serde_json::json!({
            "amount_to_add": amount,
            "activity_description": description,
        });
        let resp = self
            .authed(self.http.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Self::check(resp).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_rejects_bad_url() {
        assert!(SupabaseStore::new("not a url", "key").is_err());
    }

    #[test]
    fn rest_url_joins_query() {
        let store = SupabaseStore::new("https://example.supabase.co", "key").unwrap();
        let url = store.rest_url("videos?select=*").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/videos?select=*"
        );
    }

    #[test]
    fn bearer_falls_back_to_anon_key() {
        let store = SupabaseStore::new("https://example.supabase.co", "anon").unwrap();
        assert_eq!(store.token(), "anon");
        store.set_bearer(Some("jwt".to_string()));
        assert_eq!(store.token(), "jwt");
        store.set_bearer(None);
        assert_eq!(store.token(), "anon");
    }
}
