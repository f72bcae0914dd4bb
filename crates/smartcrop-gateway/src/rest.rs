//! REST implementation of [`SessionGateway`] for the hosted backend.
//!
//! Endpoints:
//! - `auth/v1/signup`, `auth/v1/token?grant_type=password`, `auth/v1/logout`
//! - `rest/v1/{table}` for read-only collection queries
//! - `functions/v1/{name}` for remote function invocation
//!
//! Every request carries the anon key in the `apikey` header and a bearer
//! token: the session's access token when signed in, otherwise the anon key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, RwLock};

use smartcrop_core::config::BackendConfig;
use smartcrop_core::types::{
    AuthSession, AuthUser, ChatMessage, CropFilter, CropRecord, UserMetadata, WeatherRecord,
};

use crate::error::GatewayError;
use crate::gateway::{AuthEvent, ChatbotReply, ChatbotRequest, SessionGateway, SignUpOutcome};
use crate::query::{self, QueryParams};

const CHATBOT_FUNCTION: &str = "chatbot";
const WEATHER_FUNCTION: &str = "weather";

/// HTTP client for the hosted backend. Holds the current session in memory.
pub struct RestGateway {
    client: Client,
    base_url: String,
    anon_key: SecretString,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl RestGateway {
    pub fn new(config: &BackendConfig) -> Result<Self, GatewayError> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(GatewayError::NotConfigured("backend url is empty".to_string()));
        }
        if config.anon_key.trim().is_empty() {
            return Err(GatewayError::NotConfigured("anon key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let (events, _) = broadcast::channel(16);

        tracing::debug!(url = %base_url, "Backend gateway created");
        Ok(Self {
            client,
            base_url,
            anon_key: config.anon_key_secret(),
            session: RwLock::new(None),
            events,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn bearer(&self) -> String {
        match &*self.session.read().await {
            Some(session) => session.access_token.expose_secret().to_string(),
            None => self.anon_key.expose_secret().to_string(),
        }
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.bearer().await)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let resp = self.authorized(builder).await.send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: QueryParams,
    ) -> Result<Vec<T>, GatewayError> {
        let builder = self
            .client
            .get(self.url(&format!("rest/v1/{}", table)))
            .query(&params);
        self.send(builder).await
    }

    async fn invoke<B, T>(&self, function: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .client
            .post(self.url(&format!("functions/v1/{}", function)))
            .json(body);
        self.send(builder).await
    }

    async fn store_session(&self, session: &AuthSession) {
        *self.session.write().await = Some(session.clone());
        // No receivers is fine; nobody may be subscribed yet.
        let _ = self.events.send(AuthEvent::signed_in(session.user.clone()));
    }
}

#[async_trait]
impl SessionGateway for RestGateway {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &UserMetadata,
    ) -> Result<SignUpOutcome, GatewayError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": profile,
        });
        let builder = self.client.post(self.url("auth/v1/signup")).json(&body);
        let value: Value = self.send(builder).await?;
        let outcome = parse_sign_up(value)?;

        if let Some(session) = &outcome.session {
            self.store_session(session).await;
        }
        tracing::info!(
            confirmation_required = outcome.needs_confirmation(),
            "Sign-up accepted"
        );
        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        let body = json!({ "email": email, "password": password });
        let builder = self
            .client
            .post(self.url("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&body);
        let session: AuthSession = self.send(builder).await?;
        self.store_session(&session).await;
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone());

        if let Some(token) = token {
            let resp = self
                .client
                .post(self.url("auth/v1/logout"))
                .header("apikey", self.anon_key.expose_secret())
                .bearer_auth(token.expose_secret())
                .send()
                .await?;
            // 401/404: the session is already gone server-side.
            let status = resp.status();
            if !status.is_success()
                && status != StatusCode::UNAUTHORIZED
                && status != StatusCode::NOT_FOUND
            {
                check_status(resp).await?;
            }
        }

        *self.session.write().await = None;
        let _ = self.events.send(AuthEvent::signed_out());
        tracing::info!("Signed out");
        Ok(())
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn fetch_crops(&self, filter: &CropFilter) -> Result<Vec<CropRecord>, GatewayError> {
        self.select(query::CROPS_TABLE, query::crops_query(filter))
            .await
    }

    async fn fetch_weather(&self, limit: usize) -> Result<Vec<WeatherRecord>, GatewayError> {
        self.select(query::WEATHER_TABLE, query::weather_query(limit))
            .await
    }

    async fn fetch_chat_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, GatewayError> {
        self.select(
            query::CHAT_HISTORY_TABLE,
            query::chat_history_query(user_id, limit),
        )
        .await
    }

    async fn invoke_chatbot(&self, request: &ChatbotRequest) -> Result<ChatbotReply, GatewayError> {
        self.invoke(CHATBOT_FUNCTION, request).await
    }

    async fn invoke_weather(&self, location: &str) -> Result<Value, GatewayError> {
        self.invoke(WEATHER_FUNCTION, &json!({ "location": location }))
            .await
    }
}

/// Pass through success responses; turn anything else into a
/// [`GatewayError::Status`] carrying the backend's message.
async fn check_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::warn!(status = status.as_u16(), message = %message, "Backend request rejected");
    Err(GatewayError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Pull a human-readable message out of an error body.
///
/// Auth endpoints answer with `error_description` or `msg`, REST endpoints
/// with `message`, functions with `error`.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// Sign-up answers with a full session, a `{ user }` wrapper, or the bare
/// user object when confirmation is pending.
pub(crate) fn parse_sign_up(value: Value) -> Result<SignUpOutcome, GatewayError> {
    if value.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(value)?;
        return Ok(SignUpOutcome {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }
    if let Some(user) = value.get("user").filter(|u| !u.is_null()) {
        let user: AuthUser = serde_json::from_value(user.clone())?;
        return Ok(SignUpOutcome {
            user: Some(user),
            session: None,
        });
    }
    if value.get("id").is_some() {
        let user: AuthUser = serde_json::from_value(value)?;
        return Ok(SignUpOutcome {
            user: Some(user),
            session: None,
        });
    }
    Ok(SignUpOutcome::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> BackendConfig {
        BackendConfig {
            url: url.to_string(),
            anon_key: key.to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_new_rejects_missing_url() {
        let err = RestGateway::new(&config("  ", "key")).err().unwrap();
        assert!(matches!(err, GatewayError::NotConfigured(_)));
    }

    #[test]
    fn test_new_rejects_missing_key() {
        let err = RestGateway::new(&config("https://x.example.co", ""))
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::NotConfigured(_)));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let gw = RestGateway::new(&config("https://x.example.co/", "key")).unwrap();
        assert_eq!(gw.url("/rest/v1/crops"), "https://x.example.co/rest/v1/crops");
        assert_eq!(gw.url("auth/v1/logout"), "https://x.example.co/auth/v1/logout");
    }

    #[tokio::test]
    async fn test_bearer_defaults_to_anon_key() {
        let gw = RestGateway::new(&config("https://x.example.co", "anon-1")).unwrap();
        assert_eq!(gw.bearer().await, "anon-1");
        assert!(gw.current_session().await.is_none());
    }

    #[test]
    fn test_error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );
    }

    #[test]
    fn test_error_message_msg_and_message_keys() {
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"code":422,"msg":"User already registered"}"#),
            "User already registered"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"message":"relation \"crops\" does not exist"}"#),
            "relation \"crops\" does not exist"
        );
    }

    #[test]
    fn test_error_message_plain_text_and_empty_body() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream timed out"),
            "upstream timed out"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"unexpected":true}"#),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_parse_sign_up_with_session() {
        let value = json!({
            "access_token": "tok",
            "refresh_token": "ref",
            "expires_in": 3600,
            "user": {"id": "u1", "email": "a@b.co"}
        });
        let outcome = parse_sign_up(value).unwrap();
        assert!(outcome.session.is_some());
        assert!(!outcome.needs_confirmation());
    }

    #[test]
    fn test_parse_sign_up_bare_user_needs_confirmation() {
        let value = json!({"id": "u2", "email": "new@b.co", "user_metadata": {"name": "Ravi"}});
        let outcome = parse_sign_up(value).unwrap();
        assert!(outcome.needs_confirmation());
        assert_eq!(
            outcome.user.unwrap().user_metadata.name.as_deref(),
            Some("Ravi")
        );
    }

    #[test]
    fn test_parse_sign_up_wrapped_user() {
        let value = json!({"user": {"id": "u3"}, "session": null});
        let outcome = parse_sign_up(value).unwrap();
        assert!(outcome.needs_confirmation());
    }

    #[test]
    fn test_parse_sign_up_empty_object() {
        let outcome = parse_sign_up(json!({})).unwrap();
        assert!(outcome.user.is_none());
        assert!(outcome.session.is_none());
    }
}
