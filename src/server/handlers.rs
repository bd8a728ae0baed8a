//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its input via axum extractors, calls into the
//! registry or orchestrator, and returns a JSON response; failures map to
//! status codes through `ApiError`.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::chat::ChatTurnResult;
use crate::core::Message;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::session::{SessionConfig, SessionSummary};

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub extracted_text: String,
    pub filename: String,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn root() -> Json<Value> {
    Json(json!({"message": "Shopmate shopping assistant API"}))
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

pub async fn configure(
    State(state): State<AppState>,
    Json(config): Json<SessionConfig>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session_id = state.registry.create(&config).await?;
    Ok(Json(SessionResponse {
        session_id,
        success: true,
        message: "Session initialized successfully".to_string(),
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatTurnResult>, ApiError> {
    let result = state
        .orchestrator
        .process_turn(
            &request.session_id,
            &request.message,
            request.image_data.as_deref(),
        )
        .await?;
    Ok(Json(result))
}

/// Unknown ids return an empty list rather than a 404 so a fresh client
/// can always render a history pane.
pub async fn messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<MessagesResponse> {
    let messages = match state.registry.get(&id).await {
        Ok(session) => session.state().await.log.snapshot(),
        Err(_) => Vec::new(),
    };
    Json(MessagesResponse { messages })
}

pub async fn clear(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.registry.clear(&id).await?;
    Ok(Json(ActionResponse {
        success: true,
        message: "Conversation cleared".to_string(),
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.registry.delete(&id).await?;
    Ok(Json(ActionResponse {
        success: true,
        message: "Session deleted".to_string(),
    }))
}

pub async fn sessions(State(state): State<AppState>) -> Json<SessionsResponse> {
    Json(SessionsResponse {
        sessions: state.registry.list().await,
    })
}

pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let session = state.registry.get(&id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
        .ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;

    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(ApiError::BadRequest("file must be an image".to_string()));
    }

    let filename = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;

    let session_state = session.state().await;
    let extracted_text = session_state
        .engines
        .interpreter
        .interpret(&bytes, "")
        .await
        .map_err(|e| ApiError::Internal(format!("image processing error: {:#}", e)))?;

    Ok(Json(UploadResponse {
        success: true,
        extracted_text,
        filename,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::engines::testing::MockFactory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_state() -> AppState {
        AppState::new(Settings::default(), Arc::new(MockFactory::new()))
    }

    fn make_app() -> axum::Router {
        crate::server::create_router(make_state())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn config_body() -> Value {
        json!({
            "api_key_llm": "llm-key",
            "api_key_search_tool": "search-key",
            "api_key_firecrawl": "scrape-key",
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn create_session(app: &axum::Router) -> String {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/api/config", config_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created: SessionResponse = read_json(resp).await;
        created.session_id
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = make_app();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let health: Value = read_json(resp).await;
        assert_eq!(health["status"], "healthy");
    }

    #[tokio::test]
    async fn test_config_rejects_missing_credentials() {
        let app = make_app();
        let body = json!({
            "api_key_llm": "llm-key",
            "api_key_search_tool": "",
            "api_key_firecrawl": "scrape-key",
        });
        let resp = app
            .oneshot(json_request("POST", "/api/config", body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: Value = read_json(resp).await;
        assert_eq!(error["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_config_creates_session() {
        let app = make_app();
        let id = create_session(&app).await;
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn test_chat_unknown_session_is_404() {
        let app = make_app();
        let body = json!({"session_id": "no-such-id", "message": "hello"});
        let resp = app
            .oneshot(json_request("POST", "/api/chat", body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let error: Value = read_json(resp).await;
        assert_eq!(error["error"], "not_found");
    }

    #[tokio::test]
    async fn test_chat_appends_to_history() {
        let app = make_app();
        let id = create_session(&app).await;

        let body = json!({"session_id": id, "message": "hi"});
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/api/chat", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let turn: Value = read_json(resp).await;
        assert_eq!(turn["type"], "conversation");
        assert_eq!(turn["message"], "echo: hi");
        assert_eq!(turn["continue_conversation"], true);

        let resp = app
            .oneshot(
                Request::get(format!("/api/messages/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let history: MessagesResponse = read_json(resp).await;
        assert_eq!(history.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_messages_unknown_session_is_empty_list() {
        let app = make_app();
        let resp = app
            .oneshot(
                Request::get("/api/messages/no-such-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let history: MessagesResponse = read_json(resp).await;
        assert!(history.messages.is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_delete_unknown_session_are_404() {
        let app = make_app();

        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/clear/no-such-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .oneshot(
                Request::delete("/api/session/no-such-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sessions_lists_created_sessions() {
        let app = make_app();
        let id = create_session(&app).await;

        let resp = app
            .oneshot(Request::get("/api/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let listing: SessionsResponse = read_json(resp).await;
        assert_eq!(listing.sessions.len(), 1);
        assert_eq!(listing.sessions[0].session_id, id);
        assert_eq!(listing.sessions[0].message_count, 0);
    }

    fn multipart_request(uri: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.png\"\r\nContent-Type: {}\r\n\r\n",
                boundary, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::post(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_image_extracts_text() {
        let app = make_app();
        let id = create_session(&app).await;

        let resp = app
            .oneshot(multipart_request(
                &format!("/api/upload-image/{}", id),
                "image/png",
                b"\x89PNG\r\n\x1a\n",
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let upload: UploadResponse = read_json(resp).await;
        assert!(upload.success);
        assert_eq!(upload.extracted_text, "a pictured product");
        assert_eq!(upload.filename, "upload.png");
    }

    #[tokio::test]
    async fn test_upload_image_rejects_non_image_content_type() {
        let app = make_app();
        let id = create_session(&app).await;

        let resp = app
            .oneshot(multipart_request(
                &format!("/api/upload-image/{}", id),
                "text/plain",
                b"hello",
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_image_unknown_session_is_404() {
        let app = make_app();
        let resp = app
            .oneshot(multipart_request(
                "/api/upload-image/no-such-id",
                "image/png",
                b"\x89PNG\r\n\x1a\n",
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
