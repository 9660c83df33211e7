//! HTTP server: translator form plus JSON API

use axum::{
    extract::{rejection::JsonRejection, Form, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::client::AsyncTranslator;
use crate::core::errors::TranslationError;
use crate::core::languages::LanguageEntry;
use crate::server::page::{render_page, PageState};

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: AsyncTranslator,
}

impl AppState {
    pub fn new(translator: AsyncTranslator) -> Self {
        Self { translator }
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
    cached_models: usize,
}

/// Form fields posted by the translator page
#[derive(Debug, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub text: String,
    pub source: String,
    pub target: String,
}

/// JSON translation request, languages given by display name
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    pub source: String,
    pub target: String,
}

/// JSON translation response
#[derive(Debug, Serialize, ToSchema)]
pub struct TranslateResponse {
    pub translation: String,
    pub source_code: String,
    pub target_code: String,
    /// Hub model used; null when the text bypassed the model
    pub model: Option<String>,
    pub elapsed_ms: u64,
    pub created: i64,
}

/// Languages list response
#[derive(Serialize, ToSchema)]
pub struct LanguagesResponse {
    pub default_source: String,
    pub default_target: String,
    pub data: Vec<LanguageEntry>,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
}

/// Translation error rendered as a JSON response
pub struct ApiError(TranslationError);

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TranslationError::ModelUnavailable { .. } => StatusCode::NOT_FOUND,
            TranslationError::UnknownLanguage { .. } => StatusCode::BAD_REQUEST,
            TranslationError::InvalidRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.0.to_string(),
                code: self.0.code().to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health_check, list_languages, translate_json),
    components(schemas(
        HealthResponse,
        LanguagesResponse,
        LanguageEntry,
        TranslateRequest,
        TranslateResponse,
        ErrorResponse,
        ErrorDetail
    ))
)]
struct ApiDoc;

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, body = HealthResponse),
        (status = 500, description = "Model cache unusable", body = ErrorResponse)
    )
)]
async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let cached = state.translator.cached_pairs().map_err(|e| {
        warn!("Health check could not read model cache: {}", e);
        e
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_models: cached.len(),
    }))
}

/// Language table handler
#[utoipa::path(get, path = "/api/languages", responses((status = 200, body = LanguagesResponse)))]
async fn list_languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    let languages = state.translator.languages();
    Json(LanguagesResponse {
        default_source: languages.default_source().to_string(),
        default_target: languages.default_target().to_string(),
        data: languages.entries().to_vec(),
    })
}

/// JSON translation handler
#[utoipa::path(
    post,
    path = "/api/translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, body = TranslateResponse),
        (status = 400, description = "Unknown language name", body = ErrorResponse),
        (status = 404, description = "No model for this language pair", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
async fn translate_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected translation request: {}", rejection.body_text());
        TranslationError::InvalidRequest {
            message: rejection.body_text(),
        }
    })?;

    let result = state
        .translator
        .translate_selection(&payload.text, &payload.source, &payload.target)
        .await
        .map_err(|e| {
            warn!("Translation {} -> {} failed: {}", payload.source, payload.target, e);
            e
        })?;

    Ok(Json(TranslateResponse {
        translation: result.translation,
        source_code: result.pair.source,
        target_code: result.pair.target,
        model: result.model_used,
        elapsed_ms: result.elapsed_ms,
        created: chrono::Utc::now().timestamp(),
    }))
}

/// OpenAPI document handler
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Translator page
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let languages = state.translator.languages();
    Html(render_page(languages, &PageState::initial(languages)))
}

/// Form submission: re-render the page with the outcome
async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(input): Form<FormInput>,
) -> Html<String> {
    let outcome = state
        .translator
        .translate_selection(&input.text, &input.source, &input.target)
        .await;

    let mut page = PageState {
        text: input.text,
        source: input.source,
        target: input.target,
        output: None,
        error: None,
    };

    match outcome {
        Ok(result) => page.output = Some(result.translation),
        Err(e) => {
            warn!("Form translation failed: {}", e);
            page.error = Some(e.to_string());
        }
    }

    Html(render_page(state.translator.languages(), &page))
}

/// Build the application router
pub fn build_router(translator: AsyncTranslator) -> Router {
    let state = Arc::new(AppState::new(translator));

    Router::new()
        .route("/", get(index).post(submit_form))
        .route("/health", get(health_check))
        .route("/api/languages", get(list_languages))
        .route("/api/translate", post(translate_json))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(translator: AsyncTranslator, host: String, port: u16) -> anyhow::Result<()> {
    let app = build_router(translator);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
