//! HTTP Handlers

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use agent_core::AgentError;
use reno_advisor::{AdvisorError, House, HouseForm, RenovationShell, TaskOutput, ValidationError};

use crate::render::{self, PageView};
use crate::state::{AppState, remember_session};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub credential_configured: bool,
    pub provider_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Task form and JSON run request
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub address: String,
    pub replaced: bool,
}

fn error_response(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn validation_error(e: &ValidationError) -> ApiError {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", e.to_string())
}

fn advisor_error(e: &AdvisorError) -> ApiError {
    match e {
        AdvisorError::Validation(v) => validation_error(v),
        AdvisorError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        AdvisorError::Agent(agent) => {
            let code = match agent {
                AgentError::SchemaViolation(_) => "SCHEMA_VIOLATION",
                AgentError::RateLimited(_) => "RATE_LIMITED",
                AgentError::Auth(_) => "PROVIDER_AUTH",
                AgentError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
                _ => "AGENT_ERROR",
            };
            let status = if agent.is_retryable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            error_response(status, code, agent.user_message())
        }
    }
}

async fn render_page(state: &AppState, shell: &RenovationShell) -> Html<String> {
    let houses = shell.store().houses().await;
    Html(render::page(&PageView {
        shell,
        houses: &houses,
        provider: state.provider.name(),
        model: &state.model,
    }))
}

// ============================================================================
// Form UI
// ============================================================================

/// Render the page for the caller's session
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let handle = state.session(&jar).await;
    let mut shell = handle.state.lock().await;
    shell.open();

    (remember_session(jar, &handle), render_page(&state, &shell).await)
}

/// Run the assessment from the task form
pub async fn run_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RunRequest>,
) -> impl IntoResponse {
    let handle = state.session(&jar).await;
    let mut shell = handle.state.lock().await;

    // Outcome is kept in the shell state and rendered below
    let _ = shell.submit_task(&form.task, form.address.as_deref()).await;

    (remember_session(jar, &handle), render_page(&state, &shell).await)
}

/// Save a house from the sidebar form
pub async fn save_house_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<HouseForm>,
) -> impl IntoResponse {
    let handle = state.session(&jar).await;
    let mut shell = handle.state.lock().await;
    shell.open();

    // Outcome is kept as the sidebar notice
    let _ = shell.save_form(&form).await;

    (remember_session(jar, &handle), render_page(&state, &shell).await)
}

// ============================================================================
// JSON API
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        model: state.model.clone(),
        credential_configured: state.agent.is_some(),
        provider_connected,
    })
}

/// Houses of the caller's session
pub async fn list_houses(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let handle = state.session(&jar).await;
    let houses = handle.state.lock().await.store().houses().await;

    (remember_session(jar, &handle), Json(houses))
}

pub async fn save_house(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(house): Json<House>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.session(&jar).await;
    let mut shell = handle.state.lock().await;

    let address = house.address.trim().to_string();
    let outcome = shell.save_house(house).await.map_err(|e| validation_error(&e))?;

    Ok((
        remember_session(jar, &handle),
        Json(SaveResponse {
            address,
            replaced: outcome == reno_advisor::SaveOutcome::Replaced,
        }),
    ))
}

/// Run one assessment and return the structured output
pub async fn run_task(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RunRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.session(&jar).await;
    let mut shell = handle.state.lock().await;

    let output: TaskOutput = shell
        .submit_task(&request.task, request.address.as_deref())
        .await
        .map_err(|e| advisor_error(&e))?;

    Ok((remember_session(jar, &handle), Json(output)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisor_error_status() {
        let (status, Json(body)) = advisor_error(&AdvisorError::NotFound("999 Unknown Ave".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "House not found: 999 Unknown Ave");

        let (status, Json(body)) = advisor_error(&AgentError::RateLimited("429".into()).into());
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, "RATE_LIMITED");

        let (status, _) = advisor_error(&ValidationError::EmptyTask.into());
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
