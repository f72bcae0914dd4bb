//! RestGateway against an in-process stub of the hosted backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use smartcrop_core::config::BackendConfig;
use smartcrop_core::types::{CropFilter, Language, UserMetadata};
use smartcrop_gateway::{AuthEventKind, ChatbotRequest, GatewayError, RestGateway, SessionGateway};

const ANON_KEY: &str = "anon-test-key";
const ACCESS_TOKEN: &str = "access-token-1";

#[derive(Clone, Debug)]
struct Seen {
    path: &'static str,
    query: HashMap<String, String>,
    apikey: Option<String>,
    bearer: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
    logout_expired: Arc<AtomicBool>,
}

impl Stub {
    fn record(&self, path: &'static str, query: HashMap<String, String>, headers: &HeaderMap, body: Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.seen.lock().unwrap().push(Seen {
            path,
            query,
            apikey: header("apikey"),
            bearer: header("authorization").map(|v| v.trim_start_matches("Bearer ").to_string()),
            body,
        });
    }

    fn last(&self, path: &str) -> Seen {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.path == path)
            .cloned()
            .unwrap_or_else(|| panic!("no request to {path}"))
    }
}

async fn token(
    State(stub): State<Stub>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.record("token", query, &headers, body.clone());
    if body["password"] != "secret" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response();
    }
    Json(json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "refresh-1",
        "expires_in": 3600,
        "user": {
            "id": "user-1",
            "email": body["email"],
            "user_metadata": {"name": "Asha"}
        }
    }))
    .into_response()
}

async fn signup(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("signup", HashMap::new(), &headers, body.clone());
    Json(json!({
        "id": "user-2",
        "email": body["email"],
        "user_metadata": body["data"],
    }))
    .into_response()
}

async fn logout(State(stub): State<Stub>, headers: HeaderMap) -> StatusCode {
    stub.record("logout", HashMap::new(), &headers, Value::Null);
    if stub.logout_expired.load(Ordering::SeqCst) {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn crops(
    State(stub): State<Stub>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    stub.record("crops", query, &headers, Value::Null);
    Json(json!([
        {
            "id": "c1",
            "crop_name": "Wheat",
            "crop_name_hindi": "गेहूं",
            "soil_type": "loamy",
            "season": "winter",
            "fertilizer_tip": "Apply nitrogen fertilizer during tillering stage"
        }
    ]))
}

async fn weather(
    State(stub): State<Stub>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    stub.record("weather", query, &headers, Value::Null);
    Json(json!([
        {"id": "w1", "location": "Delhi", "forecast_date": "2024-06-10", "temperature": 31.0, "weather_condition": "Sunny"},
        {"id": "w2", "location": "Delhi", "forecast_date": "2024-06-11", "temperature": 29.5, "weather_condition": "Light rain"}
    ]))
}

async fn chat_history(
    State(stub): State<Stub>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    stub.record("chat_history", query, &headers, Value::Null);
    Json(json!([
        {
            "id": "m1",
            "question": "How often should I water?",
            "answer": "Water early morning.",
            "question_language": "english",
            "answer_language": "english",
            "created_at": "2024-06-10T06:00:00+00:00"
        }
    ]))
}

async fn chatbot_fn(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    stub.record("chatbot", HashMap::new(), &headers, body);
    Json(json!({"answer": "Use drip irrigation."}))
}

async fn weather_fn(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("weather_fn", HashMap::new(), &headers, body);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Weather API key missing"})),
    )
        .into_response()
}

async fn start() -> (RestGateway, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(logout))
        .route("/rest/v1/crops", get(crops))
        .route("/rest/v1/weather", get(weather))
        .route("/rest/v1/chat_history", get(chat_history))
        .route("/functions/v1/chatbot", post(chatbot_fn))
        .route("/functions/v1/weather", post(weather_fn))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = BackendConfig {
        url: format!("http://{addr}"),
        anon_key: ANON_KEY.to_string(),
        timeout_secs: 5,
    };
    (RestGateway::new(&config).unwrap(), stub)
}

#[tokio::test]
async fn test_sign_in_stores_session_and_emits_event() {
    let (gw, stub) = start().await;
    let mut events = gw.auth_events();

    let session = gw.sign_in("farmer@example.com", "secret").await.unwrap();
    assert_eq!(session.user.id, "user-1");
    assert!(gw.current_session().await.is_some());

    let seen = stub.last("token");
    assert_eq!(seen.query.get("grant_type").map(String::as_str), Some("password"));
    assert_eq!(seen.apikey.as_deref(), Some(ANON_KEY));
    assert_eq!(seen.body["email"], "farmer@example.com");

    let event = events.recv().await.unwrap();
    assert_eq!(event.kind, AuthEventKind::SignedIn);
}

#[tokio::test]
async fn test_sign_in_failure_surfaces_backend_message() {
    let (gw, _stub) = start().await;
    let err = gw.sign_in("farmer@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 400, .. }));
    assert_eq!(err.user_message(), "Invalid login credentials");
    assert!(err.is_auth_failure());
    assert!(gw.current_session().await.is_none());
}

#[tokio::test]
async fn test_sign_up_pending_confirmation() {
    let (gw, stub) = start().await;
    let profile = UserMetadata {
        name: Some("Ravi".into()),
        location: Some("Ludhiana".into()),
    };
    let outcome = gw.sign_up("ravi@example.com", "pw123456", &profile).await.unwrap();
    assert!(outcome.needs_confirmation());
    assert!(gw.current_session().await.is_none());

    let seen = stub.last("signup");
    assert_eq!(seen.body["data"]["name"], "Ravi");
    assert_eq!(seen.body["data"]["location"], "Ludhiana");
}

#[tokio::test]
async fn test_crops_query_uses_anon_key_when_signed_out() {
    let (gw, stub) = start().await;
    let filter = CropFilter {
        soil_type: Some("loamy".into()),
        season: Some("winter".into()),
    };
    let crops = gw.fetch_crops(&filter).await.unwrap();
    assert_eq!(crops.len(), 1);
    assert_eq!(crops[0].name_in(Language::Hindi), "गेहूं");

    let seen = stub.last("crops");
    assert_eq!(seen.query.get("soil_type").map(String::as_str), Some("eq.loamy"));
    assert_eq!(seen.query.get("season").map(String::as_str), Some("eq.winter"));
    assert_eq!(seen.query.get("order").map(String::as_str), Some("crop_name.asc"));
    assert_eq!(seen.apikey.as_deref(), Some(ANON_KEY));
    assert_eq!(seen.bearer.as_deref(), Some(ANON_KEY));
}

#[tokio::test]
async fn test_weather_rows_decode_in_order() {
    let (gw, stub) = start().await;
    let rows = gw.fetch_weather(7).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].forecast_date < rows[1].forecast_date);

    let seen = stub.last("weather");
    assert_eq!(seen.query.get("limit").map(String::as_str), Some("7"));
    assert_eq!(seen.query.get("order").map(String::as_str), Some("forecast_date.asc"));
}

#[tokio::test]
async fn test_history_uses_session_token() {
    let (gw, stub) = start().await;
    gw.sign_in("farmer@example.com", "secret").await.unwrap();

    let rows = gw.fetch_chat_history("user-1", 20).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].question_language, Language::English);

    let seen = stub.last("chat_history");
    assert_eq!(seen.query.get("user_id").map(String::as_str), Some("eq.user-1"));
    assert_eq!(seen.query.get("order").map(String::as_str), Some("created_at.desc"));
    assert_eq!(seen.bearer.as_deref(), Some(ACCESS_TOKEN));
}

#[tokio::test]
async fn test_chatbot_function_round_trip() {
    let (gw, stub) = start().await;
    let reply = gw
        .invoke_chatbot(&ChatbotRequest {
            question: "How to water?".into(),
            language: Language::Hindi,
            user_id: "user-1".into(),
        })
        .await
        .unwrap();
    assert_eq!(reply.answer, "Use drip irrigation.");

    let seen = stub.last("chatbot");
    assert_eq!(seen.body["language"], "hindi");
    assert_eq!(seen.body["question"], "How to water?");
}

#[tokio::test]
async fn test_weather_function_error_message() {
    let (gw, stub) = start().await;
    let err = gw.invoke_weather("Delhi").await.unwrap_err();
    assert_eq!(err.user_message(), "Weather API key missing");
    assert!(!err.is_auth_failure());
    assert_eq!(stub.last("weather_fn").body["location"], "Delhi");
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let (gw, stub) = start().await;
    gw.sign_in("farmer@example.com", "secret").await.unwrap();
    let mut events = gw.auth_events();

    gw.sign_out().await.unwrap();
    assert!(gw.current_session().await.is_none());
    assert_eq!(stub.last("logout").bearer.as_deref(), Some(ACCESS_TOKEN));
    assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::SignedOut);
}

#[tokio::test]
async fn test_sign_out_tolerates_expired_session() {
    let (gw, stub) = start().await;
    gw.sign_in("farmer@example.com", "secret").await.unwrap();
    stub.logout_expired.store(true, Ordering::SeqCst);

    gw.sign_out().await.unwrap();
    assert!(gw.current_session().await.is_none());
}

#[tokio::test]
async fn test_sign_out_without_session_skips_backend() {
    let (gw, stub) = start().await;
    gw.sign_out().await.unwrap();
    assert!(stub.seen.lock().unwrap().iter().all(|s| s.path != "logout"));
}
