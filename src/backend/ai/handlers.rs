/**
 * AI Handlers
 *
 * POST /api/ai/suggest, /api/ai/review, /api/ai/explain, /api/ai/fix
 *
 * # Response
 *
 * ```json
 * { "success": true, "review": "...", "language": "python" }
 * ```
 *
 * # Errors
 *
 * - `400` - `code` missing or blank
 * - `503` - no Gemini API key configured
 * - `502` - the upstream call failed
 */

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::backend::ai::prompts::AiTask;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Body shared by all AI endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AiRequest {
    pub code: Option<String>,
    pub language: Option<String>,
    /// Extra context for suggestions
    pub context: Option<String>,
    /// Known problem for fixes
    pub issue: Option<String>,
}

pub async fn suggest(state: State<AppState>, request: Json<AiRequest>) -> Result<Json<Value>, BackendError> {
    run(state, request, AiTask::Suggest).await
}

pub async fn review(state: State<AppState>, request: Json<AiRequest>) -> Result<Json<Value>, BackendError> {
    run(state, request, AiTask::Review).await
}

pub async fn explain(state: State<AppState>, request: Json<AiRequest>) -> Result<Json<Value>, BackendError> {
    run(state, request, AiTask::Explain).await
}

pub async fn fix(state: State<AppState>, request: Json<AiRequest>) -> Result<Json<Value>, BackendError> {
    run(state, request, AiTask::Fix).await
}

async fn run(
    State(state): State<AppState>,
    Json(request): Json<AiRequest>,
    task: AiTask,
) -> Result<Json<Value>, BackendError> {
    let code = request
        .code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| BackendError::bad_request("Code is required"))?;

    let client = state.ai.as_ref().ok_or_else(|| {
        tracing::warn!("[AI] {:?} requested but no Gemini API key is configured", task);
        BackendError::handler(StatusCode::SERVICE_UNAVAILABLE, "AI assistant is not configured")
    })?;

    let language = request.language.as_deref().filter(|l| !l.is_empty());
    let extra = match task {
        AiTask::Suggest => request.context.as_deref(),
        AiTask::Fix => request.issue.as_deref(),
        AiTask::Review | AiTask::Explain => None,
    };
    let prompt = task.prompt(code, language, extra);

    tracing::debug!("[AI] {:?} request ({} chars of code)", task, code.len());
    let text = client.generate(&prompt).await.map_err(|e| {
        tracing::error!("[AI] {:?} failed: {}", task, e);
        BackendError::handler(StatusCode::BAD_GATEWAY, task.failure_message())
    })?;

    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(task.response_field().to_string(), Value::String(text));
    body.insert(
        "language".to_string(),
        Value::String(language.unwrap_or("javascript").to_string()),
    );
    Ok(Json(Value::Object(body)))
}
