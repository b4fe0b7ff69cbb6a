//! HTTP surface for the batch translation capability and language preferences.

use crate::error::{LanguageError, ProfileError, TranslateError};
use crate::i18n::{Language, LanguageConfig, LanguageRegistry, MetricsReport, TranslationMetrics};
use crate::profile::{ProfileStore, ProfileUpdate, UserProfile};
use crate::security::api_key_matches;
use crate::translation::{BatchTranslateRequest, BatchTranslateResponse, BatchTranslator};
use anyhow::{Context, Result};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn BatchTranslator>,
    pub profiles: Arc<dyn ProfileStore>,
    pub metrics: Arc<TranslationMetrics>,
    /// `None` leaves `/api` open
    pub api_key: Option<String>,
    pub max_batch: usize,
}

impl AppState {
    pub fn new(
        translator: Arc<dyn BatchTranslator>,
        profiles: Arc<dyn ProfileStore>,
        api_key: Option<String>,
        max_batch: usize,
    ) -> Self {
        Self {
            translator,
            profiles,
            metrics: Arc::new(TranslationMetrics::new()),
            api_key,
            max_batch,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Upstream(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "missing or invalid API key".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<LanguageError> for ApiError {
    fn from(err: LanguageError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<TranslateError> for ApiError {
    fn from(err: TranslateError) -> Self {
        match err {
            TranslateError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        error!("Profile store error: {}", err);
        ApiError::Internal("profile store unavailable".to_string())
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/languages", get(list_languages))
        .route("/translate", post(translate))
        .route("/profile/:user_id", get(get_profile))
        .route("/profile/:user_id/language", put(put_language))
        .route("/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until Ctrl-C.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.api_key {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if !api_key_matches(provided, expected) {
            warn!("Rejected request to {} without a valid API key", request.uri().path());
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_languages() -> Json<Vec<LanguageConfig>> {
    Json(
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .cloned()
            .collect(),
    )
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<BatchTranslateRequest>,
) -> Result<Json<BatchTranslateResponse>, ApiError> {
    let target = Language::from_code(&request.target_language)?;

    if request.texts.len() > state.max_batch {
        return Err(ApiError::BadRequest(format!(
            "batch of {} strings exceeds the limit of {}",
            request.texts.len(),
            state.max_batch
        )));
    }
    if request.texts.is_empty() {
        return Ok(Json(BatchTranslateResponse {
            translations: Vec::new(),
        }));
    }

    state.metrics.record_batch();
    match state
        .translator
        .translate_batch(&request.texts, target)
        .await
    {
        Ok(translations) => {
            state.metrics.record_translated(translations.len());
            info!(
                "Translated {} strings into {}",
                translations.len(),
                target.code()
            );
            Ok(Json(BatchTranslateResponse { translations }))
        }
        Err(e) => {
            state.metrics.record_batch_failure();
            warn!("Translation into {} failed: {}", target.code(), e);
            Err(e.into())
        }
    }
}

async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .profiles
        .load_profile(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no profile for user '{}'", user_id)))
}

#[derive(Debug, Deserialize)]
struct LanguageSelection {
    language: String,
}

async fn put_language(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(selection): Json<LanguageSelection>,
) -> Result<Json<UserProfile>, ApiError> {
    let language = Language::from_code(&selection.language)?;

    state
        .profiles
        .merge_profile(
            &user_id,
            ProfileUpdate {
                language: Some(language.code().to_string()),
            },
        )
        .await?;
    info!("User {} selected language {}", user_id, language.code());

    Ok(Json(UserProfile {
        language: Some(language.code().to_string()),
    }))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.metrics.report())
}
