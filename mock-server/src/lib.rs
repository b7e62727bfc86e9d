//! In-process stand-in for the Pushover API.
//!
//! Serves the three endpoints the client talks to under `/1`, with a fixed
//! application token and a small registry of users and devices. Error
//! replies mirror the real service: a non-2xx status with a JSON body
//! carrying `status: 0` and an `errors` array.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const APP_TOKEN: &str = "azGDORePK8gMaC0QOYAMyEEuzJnyUi";
pub const USER_KEY: &str = "uQiRzpo4DXghDmr9QzzfQu27cmVRsG";
pub const USER_DEVICES: [&str; 2] = ["iphone", "pixel"];

const MAX_MESSAGE_CHARS: usize = 1024;
const MIN_RETRY_SECS: u64 = 30;
const MAX_EXPIRE_SECS: u64 = 10800;

/// Registered token and users the server accepts.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub token: String,
    pub users: HashMap<String, Vec<String>>,
}

impl Default for Fixtures {
    fn default() -> Self {
        let devices = USER_DEVICES.iter().map(|d| d.to_string()).collect();
        Self {
            token: APP_TOKEN.to_string(),
            users: HashMap::from([(USER_KEY.to_string(), devices)]),
        }
    }
}

/// Delivery state of an emergency-priority message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub acknowledged: u8,
    pub acknowledged_at: u64,
    pub acknowledged_by: String,
    pub acknowledged_by_device: String,
    pub last_delivered_at: u64,
    pub expired: u8,
    pub expires_at: u64,
    pub called_back: u8,
    pub called_back_at: u64,
}

pub struct AppState {
    fixtures: Fixtures,
    receipts: RwLock<HashMap<String, Receipt>>,
}

pub type Shared = Arc<AppState>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with(Fixtures::default())
}

pub fn app_with(fixtures: Fixtures) -> Router {
    let state: Shared = Arc::new(AppState {
        fixtures,
        receipts: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/1/messages.json", post(send_message))
        .route("/1/users/validate.json", post(validate_user))
        .route("/1/receipts/{file}", get(get_receipt))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn send_message(
    State(state): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = check_token(&state, form.get("token")) {
        return reply;
    }
    if let Err(reply) = check_user(&state, form.get("user"), form.get("device")) {
        return reply;
    }

    let message = form.get("message").map(String::as_str).unwrap_or_default();
    if message.trim().is_empty() {
        return reject(StatusCode::BAD_REQUEST, "message", "message cannot be blank");
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return reject(StatusCode::BAD_REQUEST, "message", "message is too long");
    }

    let priority = match form.get("priority").map(|p| p.trim().parse::<i64>()) {
        None => 0,
        Some(Ok(p)) if (-2..=2).contains(&p) => p,
        Some(_) => return reject(StatusCode::BAD_REQUEST, "priority", "priority is invalid"),
    };
    if priority < 2 {
        return accept(json!({}));
    }

    let retry = form.get("retry").and_then(|r| r.trim().parse::<u64>().ok());
    if !retry.is_some_and(|r| r >= MIN_RETRY_SECS) {
        return reject(
            StatusCode::BAD_REQUEST,
            "retry",
            "retry is invalid; must be at least 30 seconds",
        );
    }
    let expire = form.get("expire").and_then(|e| e.trim().parse::<u64>().ok());
    let Some(expire) = expire.filter(|e| (1..=MAX_EXPIRE_SECS).contains(e)) else {
        return reject(
            StatusCode::BAD_REQUEST,
            "expire",
            "expire is invalid; must be at most 10800 seconds",
        );
    };

    let id = Uuid::new_v4().simple().to_string();
    let now = unix_now();
    let receipt = Receipt {
        acknowledged: 0,
        acknowledged_at: 0,
        acknowledged_by: String::new(),
        acknowledged_by_device: String::new(),
        last_delivered_at: now,
        expired: 0,
        expires_at: now + expire,
        called_back: 0,
        called_back_at: 0,
    };
    state.receipts.write().await.insert(id.clone(), receipt);
    debug!(receipt = %id, "issued emergency receipt");
    accept(json!({ "receipt": id }))
}

async fn validate_user(
    State(state): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = check_token(&state, form.get("token")) {
        return reply;
    }
    match check_user(&state, form.get("user"), form.get("device")) {
        Ok(devices) => accept(json!({
            "group": 0,
            "devices": devices,
            "licenses": ["Android", "iOS", "Desktop"],
        })),
        Err(reply) => reply,
    }
}

async fn get_receipt(
    State(state): State<Shared>,
    Path(file): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = check_token(&state, query.get("token")) {
        return reply;
    }
    let receipts = state.receipts.read().await;
    let found = file.strip_suffix(".json").and_then(|id| receipts.get(id));
    match found {
        Some(receipt) => match serde_json::to_value(receipt) {
            Ok(value) => accept(value),
            Err(_) => reject(StatusCode::INTERNAL_SERVER_ERROR, "receipt", "internal error"),
        },
        None => reject(
            StatusCode::NOT_FOUND,
            "receipt",
            "receipt not found; may be invalid or expired",
        ),
    }
}

fn check_token(state: &AppState, token: Option<&String>) -> Result<(), Reply> {
    match token {
        Some(t) if *t == state.fixtures.token => Ok(()),
        _ => Err(reject(
            StatusCode::BAD_REQUEST,
            "token",
            "application token is invalid",
        )),
    }
}

/// Known user (and device, when one is named) or a 400 reply.
fn check_user(
    state: &AppState,
    user: Option<&String>,
    device: Option<&String>,
) -> Result<Vec<String>, Reply> {
    let devices = user
        .and_then(|u| state.fixtures.users.get(u))
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "user", "user key is invalid"))?;
    if let Some(device) = device.filter(|d| !d.is_empty()) {
        if !devices.contains(device) {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "device",
                "device name is not valid for user",
            ));
        }
    }
    Ok(devices.clone())
}

fn accept(mut body: Value) -> Reply {
    if let Value::Object(map) = &mut body {
        map.insert("status".to_string(), json!(1));
        map.insert("request".to_string(), json!(Uuid::new_v4()));
    }
    (StatusCode::OK, Json(body))
}

fn reject(status: StatusCode, field: &str, message: &str) -> Reply {
    debug!(%status, field, message, "rejecting request");
    let mut body = json!({
        "errors": [message],
        "status": 0,
        "request": Uuid::new_v4(),
    });
    body[field] = json!("invalid");
    (status, Json(body))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fixtures_register_the_test_user() {
        let fixtures = Fixtures::default();
        assert_eq!(fixtures.token, APP_TOKEN);
        assert_eq!(fixtures.users[USER_KEY], vec!["iphone", "pixel"]);
    }

    #[test]
    fn reject_marks_the_offending_field() {
        let (status, Json(body)) = reject(StatusCode::BAD_REQUEST, "user", "user key is invalid");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 0);
        assert_eq!(body["user"], "invalid");
        assert_eq!(body["errors"], json!(["user key is invalid"]));
    }

    #[test]
    fn accept_adds_status_and_request() {
        let (status, Json(body)) = accept(json!({"receipt": "r1"}));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 1);
        assert_eq!(body["receipt"], "r1");
        assert!(body["request"].is_string());
    }

    #[test]
    fn receipt_serializes_flat() {
        let receipt = Receipt {
            acknowledged: 1,
            acknowledged_at: 10,
            acknowledged_by: USER_KEY.to_string(),
            acknowledged_by_device: "iphone".to_string(),
            last_delivered_at: 5,
            expired: 0,
            expires_at: 100,
            called_back: 0,
            called_back_at: 0,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["acknowledged"], 1);
        assert_eq!(json["acknowledged_by_device"], "iphone");
        assert_eq!(json["expires_at"], 100);
    }
}
