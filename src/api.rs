use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::command::Command;
use crate::device::DeviceLink;
use crate::error::GatewayError;

#[derive(Clone)]
pub struct ApiState {
    pub link: Arc<DeviceLink>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub ok: bool,
}

const ACK: Ack = Ack { ok: true };

#[derive(Debug, Default, Deserialize)]
pub struct LcdBody {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
}

pub enum ApiError {
    BadRequest(String),
    Device(GatewayError),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Device(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Device(e) => {
                warn!("Command failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}

pub fn router(link: Arc<DeviceLink>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/fan/on", post(fan_on))
        .route("/fan/off", post(fan_off))
        .route("/fan/toggle", post(fan_toggle))
        .route("/door/toggle", post(door_toggle))
        .route("/door/close", post(door_close))
        .route("/door/open", post(door_open))
        .route("/lcd", post(lcd))
        .with_state(ApiState { link })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn dispatch(state: &ApiState, command: Command) -> Result<Json<Ack>, ApiError> {
    state.link.send(&command).await?;
    Ok(Json(ACK))
}

async fn health() -> Json<Ack> {
    Json(ACK)
}

async fn fan_on(State(state): State<ApiState>) -> Result<Json<Ack>, ApiError> {
    dispatch(&state, Command::SetFan(true)).await
}

async fn fan_off(State(state): State<ApiState>) -> Result<Json<Ack>, ApiError> {
    dispatch(&state, Command::SetFan(false)).await
}

async fn fan_toggle(State(state): State<ApiState>) -> Result<Json<Ack>, ApiError> {
    dispatch(&state, Command::ToggleFan).await
}

async fn door_toggle(State(state): State<ApiState>) -> Result<Json<Ack>, ApiError> {
    dispatch(&state, Command::ToggleDoor).await
}

async fn door_close(State(state): State<ApiState>) -> Result<Json<Ack>, ApiError> {
    dispatch(&state, Command::SetDoor(false)).await
}

async fn door_open(State(state): State<ApiState>) -> Result<Json<Ack>, ApiError> {
    dispatch(&state, Command::SetDoor(true)).await
}

/// The body is parsed as JSON whatever the Content-Type says, and must be an object.
async fn lcd(State(state): State<ApiState>, body: Bytes) -> Result<Json<Ack>, ApiError> {
    let body = match serde_json::from_slice::<Value>(&body) {
        Ok(object @ Value::Object(_)) => object,
        Ok(_) => return Err(ApiError::BadRequest("LCD body must be a JSON object".into())),
        Err(e) => return Err(ApiError::BadRequest(format!("Invalid LCD body: {e}"))),
    };
    let body: LcdBody = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid LCD body: {e}")))?;

    let command = Command::display(
        body.line1.as_deref().unwrap_or_default(),
        body.line2.as_deref().unwrap_or_default(),
    );
    dispatch(&state, command).await
}
