//! HTTP endpoint layer.
//!
//! Thin axum handlers over [`LocaleStore`]. Path parameters are passed through
//! untouched; all validation happens in the store.

use crate::error::LocaleError;
use crate::store::{LocaleStore, Structure};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLanguageRequest {
    pub lang_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLanguageResponse {
    pub success: bool,
    pub lang_code: String,
}

/// `Json` extractor whose rejections use the same error body as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(LocaleError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for LocaleError {
    fn from(rejection: JsonRejection) -> Self {
        LocaleError::InvalidBody(rejection.body_text())
    }
}

impl LocaleError {
    pub fn status_code(&self) -> StatusCode {
        use crate::error::ErrorKind;

        match self.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::AuthorizationError => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::ParseError | ErrorKind::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LocaleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.kind().as_str().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
///
/// Anything not matched by an API route is served from `static_dir`.
pub fn router(
    store: Arc<LocaleStore>,
    static_dir: impl AsRef<std::path::Path>,
    max_body_bytes: usize,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/structure", get(read_structure))
        .route("/api/languages", post(create_language))
        .route("/api/languages/:folder", get(list_languages))
        .route(
            "/api/locales/:folder/:lang/:file",
            get(read_locale_file)
                .put(write_locale_file)
                .post(write_locale_file),
        )
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn read_structure(
    State(store): State<Arc<LocaleStore>>,
) -> Result<Json<Structure>, LocaleError> {
    Ok(Json(store.read_structure().await?))
}

async fn list_languages(
    State(store): State<Arc<LocaleStore>>,
    Path(folder): Path<String>,
) -> Result<Json<LanguagesResponse>, LocaleError> {
    let languages = store.list_languages(&folder).await?;
    Ok(Json(LanguagesResponse { languages }))
}

async fn read_locale_file(
    State(store): State<Arc<LocaleStore>>,
    Path((folder, lang, file)): Path<(String, String, String)>,
) -> Result<Json<Value>, LocaleError> {
    Ok(Json(store.read_locale_file(&folder, &lang, &file).await?))
}

async fn write_locale_file(
    State(store): State<Arc<LocaleStore>>,
    Path((folder, lang, file)): Path<(String, String, String)>,
    ApiJson(document): ApiJson<Value>,
) -> Result<Json<SuccessResponse>, LocaleError> {
    store
        .write_locale_file(&folder, &lang, &file, &document)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn create_language(
    State(store): State<Arc<LocaleStore>>,
    ApiJson(request): ApiJson<CreateLanguageRequest>,
) -> Result<(StatusCode, Json<CreateLanguageResponse>), LocaleError> {
    let lang_code = store.create_language(&request.lang_code).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateLanguageResponse {
            success: true,
            lang_code,
        }),
    ))
}
