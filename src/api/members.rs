//! Member endpoints
//!
//! Each endpoint builds one request, dispatches it, and renders the outcome:
//! the payload on success, a `MessageDisplayReadModel` otherwise.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::member::project_message;
use crate::domain::pipeline::{
    ChangeEmail, ChangeOther, ChangePassword, ChangeUsername, DeactivateMember, GetMemberDetail,
    ListMembers, Outcome, RegisterMember, Status,
};
use crate::domain::MemberId;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterMemberBody {
    pub username: String,
    pub email: String,
    pub name: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar_seed: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEmailBody {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeUsernameBody {
    pub username: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordBody {
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeOtherBody {
    pub name: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar_seed: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredResponse {
    pub id: MemberId,
}

/// Body of a successful command
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub status: Status,
}

impl CommandResponse {
    fn success() -> Self {
        Self {
            status: Status::Success,
        }
    }
}

pub fn create_members_router() -> Router<AppState> {
    Router::new()
        .route("/members", post(register_member).get(list_members))
        .route("/members/{id}", get(get_member))
        .route("/members/{id}/email", put(change_email))
        .route("/members/{id}/username", put(change_username))
        .route("/members/{id}/password", put(change_password))
        .route("/members/{id}/other", put(change_other))
        .route("/members/{id}/deactivate", post(deactivate_member))
}

/// Render an outcome; non-success statuses become a message page
fn render<T: Serialize>(outcome: Outcome<T>, success: StatusCode, heading: &str) -> Response {
    if let Some(message) = project_message(heading, "Please review the details below.", &outcome) {
        let status =
            StatusCode::from_u16(message.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(message)).into_response();
    }

    match outcome.into_payload() {
        Some(payload) => (success, Json(payload)).into_response(),
        None => success.into_response(),
    }
}

fn render_command(outcome: Outcome<()>, heading: &str) -> Response {
    render(outcome.map(|()| CommandResponse::success()), StatusCode::OK, heading)
}

/// POST /members
pub async fn register_member(
    State(state): State<AppState>,
    Json(body): Json<RegisterMemberBody>,
) -> Result<Response, ApiError> {
    debug!(username = %body.username, "Registering member");

    let request = RegisterMember::new(
        body.username,
        body.email,
        body.name,
        body.nickname,
        body.avatar_seed,
    );
    let request = match body.password {
        Some(password) => request.with_password(password),
        None => request,
    };

    let outcome = state.dispatcher.dispatch(request).await?;

    Ok(render(
        outcome.map(|id| RegisteredResponse { id }),
        StatusCode::CREATED,
        "Registration",
    ))
}

/// GET /members
pub async fn list_members(State(state): State<AppState>) -> Result<Response, ApiError> {
    let outcome = state.dispatcher.dispatch(ListMembers).await?;

    Ok(render(outcome, StatusCode::OK, "Members"))
}

/// GET /members/{id}
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state.dispatcher.dispatch(GetMemberDetail::new(id)).await?;

    Ok(render(outcome, StatusCode::OK, "Member details"))
}

/// PUT /members/{id}/email
pub async fn change_email(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ChangeEmailBody>,
) -> Result<Response, ApiError> {
    let outcome = state
        .dispatcher
        .dispatch(ChangeEmail::new(id, body.email))
        .await?;

    Ok(render_command(outcome, "Change email"))
}

/// PUT /members/{id}/username
pub async fn change_username(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ChangeUsernameBody>,
) -> Result<Response, ApiError> {
    let outcome = state
        .dispatcher
        .dispatch(ChangeUsername::new(id, body.username))
        .await?;

    Ok(render_command(outcome, "Change username"))
}

/// PUT /members/{id}/password
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Response, ApiError> {
    let outcome = state
        .dispatcher
        .dispatch(ChangePassword::new(id, body.password))
        .await?;

    Ok(render_command(outcome, "Change password"))
}

/// PUT /members/{id}/other
pub async fn change_other(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ChangeOtherBody>,
) -> Result<Response, ApiError> {
    let request = ChangeOther::new(id, body.name, body.nickname);
    let request = match body.avatar_seed {
        Some(seed) => request.with_avatar_seed(seed),
        None => request,
    };

    let outcome = state.dispatcher.dispatch(request).await?;

    Ok(render_command(outcome, "Change profile"))
}

/// POST /members/{id}/deactivate
pub async fn deactivate_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state.dispatcher.dispatch(DeactivateMember::new(id)).await?;

    Ok(render_command(outcome, "Deactivate member"))
}
