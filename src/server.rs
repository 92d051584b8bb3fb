//! JSON HTTP API.
//!
//! Exposes browsing, search, chat, translation and simplification over HTTP
//! for web and messaging front-ends. Every request carries whatever per-user
//! state it needs (the chat [`Session`], the target language); the server
//! keeps none.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Status, version and limited-mode flag |
//! | `GET`  | `/schemes?category=` | All schemes, or one category |
//! | `GET`  | `/schemes/{id}?lang=` | One scheme, optionally translated |
//! | `POST` | `/schemes/{id}/translate` | Translate (`{"language": "Hindi"}`) |
//! | `POST` | `/schemes/{id}/simplify` | Plain-language rewrite |
//! | `GET`  | `/schemes/{id}/explain` | Two or three simple sentences |
//! | `GET`  | `/search?q=` | Ranked substring search |
//! | `POST` | `/chat` | `{"question", "session"}` → answer, sources, session |
//! | `GET`  | `/stats` | Aggregate counts |
//! | `POST` | `/reload` | Re-collect and re-seed (`{"offline": true}`) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "scheme not found: 42" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::assistant::SOURCE_LANGUAGE;
use crate::chat::{ChatReply, Session};
use crate::config::Config;
use crate::models::{Scheme, Stats};
use crate::portal::{LoadReport, LocalizedScheme, Portal, SimplifiedScheme};

#[derive(Clone)]
struct AppState {
    portal: Arc<Portal>,
}

/// Open the portal and serve until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let portal = Portal::open(config).await?;
    if portal.limited_mode() {
        println!("Running in limited mode: translation and chat are disabled.");
    }

    let app = router(Arc::new(portal));

    println!("SARAL API listening on http://{}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(portal: Arc<Portal>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/schemes", get(handle_list))
        .route("/schemes/{id}", get(handle_get))
        .route("/schemes/{id}/translate", post(handle_translate))
        .route("/schemes/{id}/simplify", post(handle_simplify))
        .route("/schemes/{id}/explain", get(handle_explain))
        .route("/search", get(handle_search))
        .route("/chat", post(handle_chat))
        .route("/stats", get(handle_stats))
        .route("/reload", post(handle_reload))
        .layer(cors)
        .with_state(AppState { portal })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", err), "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn scheme_not_found(id: i64) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: format!("scheme not found: {}", id),
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    limited_mode: bool,
    model: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        limited_mode: state.portal.limited_mode(),
        model: state.portal.assistant().model_name().to_string(),
    })
}

#[derive(Deserialize)]
struct ListParams {
    category: Option<String>,
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Scheme>>, AppError> {
    let store = state.portal.store();
    let schemes = match params.category.as_deref() {
        Some(c) if !c.eq_ignore_ascii_case("all") => store.filter_by_category(c).await?,
        _ => store.get_all().await?,
    };
    Ok(Json(schemes))
}

#[derive(Deserialize)]
struct GetParams {
    lang: Option<String>,
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<GetParams>,
) -> Result<Json<LocalizedScheme>, AppError> {
    let language = params.lang.as_deref().unwrap_or(SOURCE_LANGUAGE);
    state
        .portal
        .localized_scheme(id, language)
        .await?
        .map(Json)
        .ok_or_else(|| scheme_not_found(id))
}

#[derive(Deserialize)]
struct TranslateRequest {
    language: String,
}

async fn handle_translate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<LocalizedScheme>, AppError> {
    if req.language.trim().is_empty() {
        return Err(bad_request("language must not be empty"));
    }
    state
        .portal
        .localized_scheme(id, &req.language)
        .await?
        .map(Json)
        .ok_or_else(|| scheme_not_found(id))
}

async fn handle_simplify(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SimplifiedScheme>, AppError> {
    state
        .portal
        .simplified_scheme(id)
        .await?
        .map(Json)
        .ok_or_else(|| scheme_not_found(id))
}

#[derive(Serialize)]
struct ExplainResponse {
    id: i64,
    explanation: String,
}

async fn handle_explain(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ExplainResponse>, AppError> {
    let explanation = state
        .portal
        .explain_scheme(id)
        .await?
        .ok_or_else(|| scheme_not_found(id))?;
    Ok(Json(ExplainResponse { id, explanation }))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Scheme>>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    Ok(Json(state.portal.store().search(&params.q).await?))
}

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
    #[serde(default)]
    session: Session,
}

#[derive(Serialize)]
struct ChatResponse {
    #[serde(flatten)]
    reply: ChatReply,
    session: Session,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }
    let mut session = req.session;
    let reply = state.portal.chat(&mut session, &req.question).await?;
    Ok(Json(ChatResponse { reply, session }))
}

async fn handle_stats(State(state): State<AppState>) -> Result<Json<Stats>, AppError> {
    Ok(Json(state.portal.store().get_stats().await?))
}

#[derive(Deserialize, Default)]
struct ReloadRequest {
    #[serde(default)]
    offline: bool,
}

async fn handle_reload(
    State(state): State<AppState>,
    body: Option<Json<ReloadRequest>>,
) -> Result<Json<LoadReport>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(state.portal.load(req.offline, None).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::DisabledGenerator;
    use crate::portal::tests::test_portal;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    async fn spawn_server() -> (TempDir, String) {
        let (tmp, portal) = test_portal(Arc::new(DisabledGenerator), true).await;
        let app = router(Arc::new(portal));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (tmp, format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_health_reports_limited_mode() {
        let (_tmp, base) = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["limited_mode"], true);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let (_tmp, base) = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/schemes?category=Central%20Government", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_missing_scheme_is_404() {
        let (_tmp, base) = spawn_server().await;
        let resp = reqwest::get(format!("{}/schemes/9999", base)).await.unwrap();
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_empty_search_is_400() {
        let (_tmp, base) = spawn_server().await;
        let resp = reqwest::get(format!("{}/search?q=", base)).await.unwrap();
        assert_eq!(resp.status(), 400);
        let resp = reqwest::get(format!("{}/search?q=%20%20", base)).await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_spaces() {
        let (_tmp, base) = spawn_server().await;
        let exact: Value = reqwest::get(format!("{}/search?q=Bandhu%20Scheme", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(exact.as_array().unwrap().len(), 1);

        let padded: Value = reqwest::get(format!("{}/search?q=Bandhu%20Scheme%20", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(padded.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_finds_farmer_schemes() {
        let (_tmp, base) = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/search?q=farmer", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["title"].as_str())
            .collect();
        assert!(titles.contains(&"Rythu Bandhu Scheme"));
    }

    #[tokio::test]
    async fn test_chat_round_trips_session() {
        let (_tmp, base) = spawn_server().await;
        let client = reqwest::Client::new();
        let body: Value = client
            .post(format!("{}/chat", base))
            .json(&json!({ "question": "pension for elderly" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["limited_mode"], true);
        assert_eq!(body["session"]["history"].as_array().unwrap().len(), 1);
        assert!(!body["sources"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_offline_reseeds() {
        let (_tmp, base) = spawn_server().await;
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/reload", base))
            .json(&json!({ "offline": true }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["inserted"], 12);
    }
}
