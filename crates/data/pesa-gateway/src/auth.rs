//! Hosted auth API client -- sign-up, password sign-in, current user.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use pesa_core::StoreError;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// Username from signup metadata, falling back to the email address.
    pub fn display_name(&self) -> String {
        self.user_metadata
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.email.clone())
    }
}

/// A signed-in session. `access_token` may be absent right after sign-up
/// when the backend requires email confirmation first.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    #[serde(default)]
    pub access_token: Option<String>,
    pub user: AuthUser,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

pub struct AuthClient {
    base: Url,
    anon_key: String,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| StoreError::Transport(format!("bad backend url: {e}")))?;
        Ok(AuthClient {
            base,
            anon_key: anon_key.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn auth_url(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(&format!("auth/v1/{path}"))
            .map_err(|e| StoreError::Transport(format!("bad request path: {e}")))
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<Value, StoreError> {
        let url = self.auth_url(path)?;
        let resp = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = resp.status();
        let json: Value = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if !status.is_success() {
            let message = json
                .get("msg")
                .or_else(|| json.get("error_description"))
                .and_then(Value::as_str)
                .unwrap_or("auth request rejected")
                .to_string();
            tracing::warn!(status = status.as_u16(), %message, "auth call failed");
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(json)
    }

    /// Register a new account. The username rides along as signup metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<AuthSession, StoreError> {
        let body = Credentials {
            email,
            password,
            data: Some(serde_json::json!({ "username": username })),
        };
        let json = self.post_json("signup", &body).await?;
        parse_session(json)
    }

    /// Password-grant sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, StoreError> {
        let body = Credentials {
            email,
            password,
            data: None,
        };
        let json = self.post_json("token?grant_type=password", &body).await?;
        parse_session(json)
    }

    /// Resolve the user behind an access token.
    pub async fn current_user(&self, access_token: &str) -> Result<AuthUser, StoreError> {
        let url = self.auth_url("user")?;
        let resp = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthenticated);
        }
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<AuthUser>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Sign-up responses come in two shapes: a bare user (confirmation pending)
/// or a session envelope with `access_token` + `user`.
fn parse_session(json: Value) -> Result<AuthSession, StoreError> {
    if json.get("user").is_some() {
        serde_json::from_value(json).map_err(|e| StoreError::Decode(e.to_string()))
    } else {
        let user: AuthUser =
            serde_json::from_value(json).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(AuthSession {
            access_token: None,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_username_metadata() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "4f5e8a33-58a0-4c35-8b7e-111111111111",
            "email": "jane@example.com",
            "user_metadata": { "username": "jane_w" },
        }))
        .unwrap();
        assert_eq!(user.display_name(), "jane_w");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "4f5e8a33-58a0-4c35-8b7e-111111111111",
            "email": "jane@example.com",
        }))
        .unwrap();
        assert_eq!(user.display_name(), "jane@example.com");
    }

    #[test]
    fn parse_session_envelope_and_bare_user() {
        let envelope = serde_json::json!({
            "access_token": "jwt",
            "user": { "id": "4f5e8a33-58a0-4c35-8b7e-111111111111", "email": "a@b.c" },
        });
        let s = parse_session(envelope).unwrap();
        assert_eq!(s.access_token.as_deref(), Some("jwt"));

        let bare = serde_json::json!({
            "id": "4f5e8a33-58a0-4c35-8b7e-111111111111",
            "email": "a@b.c",
        });
        let s = parse_session(bare).unwrap();
        assert!(s.access_token.is_none());
    }
}
