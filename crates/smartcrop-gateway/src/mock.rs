//! In-memory [`SessionGateway`] for tests.
//!
//! Mirrors the backend's filtering, ordering and limits so callers can be
//! tested without a network. Individual operations can be made to fail with
//! [`MockGateway::fail`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use smartcrop_core::types::{
    AuthSession, AuthUser, ChatMessage, CropFilter, CropRecord, UserMetadata, WeatherRecord,
};

use crate::error::GatewayError;
use crate::gateway::{AuthEvent, ChatbotReply, ChatbotRequest, SessionGateway, SignUpOutcome};

struct MockUser {
    password: String,
    user: AuthUser,
}

#[derive(Default)]
struct MockState {
    users: HashMap<String, MockUser>,
    session: Option<AuthSession>,
    crops: Vec<CropRecord>,
    weather: Vec<WeatherRecord>,
    history: Vec<(String, ChatMessage)>,
    chatbot_answer: String,
    require_confirmation: bool,
    failures: HashMap<String, String>,
    calls: Vec<String>,
    weather_locations: Vec<String>,
}

/// Scriptable stand-in for the hosted backend.
pub struct MockGateway {
    state: Mutex<MockState>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        let state = MockState {
            chatbot_answer: "Remote advice".to_string(),
            ..MockState::default()
        };
        Self {
            state: Mutex::new(state),
            events,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock gateway mutex poisoned")
    }

    /// Register an account that can sign in.
    pub fn add_user(&self, email: &str, password: &str, name: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                name: Some(name.to_string()),
                location: None,
            },
        };
        self.lock().users.insert(
            email.to_string(),
            MockUser {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    pub fn set_crops(&self, crops: Vec<CropRecord>) {
        self.lock().crops = crops;
    }

    pub fn set_weather(&self, weather: Vec<WeatherRecord>) {
        self.lock().weather = weather;
    }

    pub fn push_history(&self, user_id: &str, message: ChatMessage) {
        self.lock().history.push((user_id.to_string(), message));
    }

    pub fn set_chatbot_answer(&self, answer: &str) {
        self.lock().chatbot_answer = answer.to_string();
    }

    pub fn set_require_confirmation(&self, required: bool) {
        self.lock().require_confirmation = required;
    }

    /// Make every later call to `operation` fail with `message`.
    pub fn fail(&self, operation: &str, message: &str) {
        self.lock()
            .failures
            .insert(operation.to_string(), message.to_string());
    }

    pub fn clear_failure(&self, operation: &str) {
        self.lock().failures.remove(operation);
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == operation).count()
    }

    /// Locations passed to the weather function.
    pub fn weather_locations(&self) -> Vec<String> {
        self.lock().weather_locations.clone()
    }

    fn record(&self, operation: &str) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.calls.push(operation.to_string());
        match state.failures.get(operation) {
            Some(message) => Err(GatewayError::Status {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn open_session(&self, user: AuthUser) -> AuthSession {
        let session = AuthSession {
            access_token: SecretString::from(format!("mock-token-{}", Uuid::new_v4())),
            refresh_token: None,
            expires_in: Some(3600),
            user: user.clone(),
        };
        self.lock().session = Some(session.clone());
        let _ = self.events.send(AuthEvent::signed_in(user));
        session
    }
}

#[async_trait]
impl SessionGateway for MockGateway {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &UserMetadata,
    ) -> Result<SignUpOutcome, GatewayError> {
        self.record("sign_up")?;
        let (user, require_confirmation) = {
            let mut state = self.lock();
            if state.users.contains_key(email) {
                return Err(GatewayError::Status {
                    status: 422,
                    message: "User already registered".to_string(),
                });
            }
            let user = AuthUser {
                id: Uuid::new_v4().to_string(),
                email: Some(email.to_string()),
                user_metadata: profile.clone(),
            };
            state.users.insert(
                email.to_string(),
                MockUser {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
            (user, state.require_confirmation)
        };

        if require_confirmation {
            return Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            });
        }
        let session = self.open_session(user.clone());
        Ok(SignUpOutcome {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        self.record("sign_in")?;
        let user = {
            let state = self.lock();
            match state.users.get(email) {
                Some(u) if u.password == password => u.user.clone(),
                _ => {
                    return Err(GatewayError::Status {
                        status: 400,
                        message: "Invalid login credentials".to_string(),
                    })
                }
            }
        };
        Ok(self.open_session(user))
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.record("sign_out")?;
        self.lock().session = None;
        let _ = self.events.send(AuthEvent::signed_out());
        Ok(())
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.lock().session.clone()
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn fetch_crops(&self, filter: &CropFilter) -> Result<Vec<CropRecord>, GatewayError> {
        self.record("fetch_crops")?;
        let state = self.lock();
        let mut crops: Vec<CropRecord> = state
            .crops
            .iter()
            .filter(|c| {
                filter
                    .soil_type
                    .as_ref()
                    .map_or(true, |s| c.soil_type.as_ref() == Some(s))
            })
            .filter(|c| {
                filter
                    .season
                    .as_ref()
                    .map_or(true, |s| c.season.as_ref() == Some(s))
            })
            .cloned()
            .collect();
        crops.sort_by(|a, b| a.crop_name.cmp(&b.crop_name));
        Ok(crops)
    }

    async fn fetch_weather(&self, limit: usize) -> Result<Vec<WeatherRecord>, GatewayError> {
        self.record("fetch_weather")?;
        let mut weather = self.lock().weather.clone();
        weather.sort_by_key(|w| w.forecast_date);
        weather.truncate(limit);
        Ok(weather)
    }

    async fn fetch_chat_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, GatewayError> {
        self.record("fetch_chat_history")?;
        let mut rows: Vec<ChatMessage> = self
            .lock()
            .history
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, m)| m.clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn invoke_chatbot(&self, request: &ChatbotRequest) -> Result<ChatbotReply, GatewayError> {
        self.record("invoke_chatbot")?;
        let mut state = self.lock();
        let answer = state.chatbot_answer.clone();
        state.history.push((
            request.user_id.clone(),
            ChatMessage {
                id: Uuid::new_v4().to_string(),
                question: request.question.clone(),
                answer: answer.clone(),
                question_language: request.language,
                answer_language: request.language,
                created_at: Utc::now(),
            },
        ));
        Ok(ChatbotReply { answer })
    }

    async fn invoke_weather(&self, location: &str) -> Result<Value, GatewayError> {
        self.record("invoke_weather")?;
        self.lock().weather_locations.push(location.to_string());
        Ok(json!({ "location": location, "status": "ok" }))
    }
}
