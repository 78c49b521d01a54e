use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use crate::{
    categories::Category,
    errors::{EngineError, Result},
    orchestrator::RequestAdapter,
    prompt::UserInput,
    providers::GenerativeBackend,
};

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub category: Category,
    #[serde(default)]
    pub input: UserInput,
}

#[derive(Debug, Serialize)]
struct CategoryView {
    id: &'static str,
    label: &'static str,
    icon: &'static str,
}

struct AppState<B> {
    adapter: Arc<RequestAdapter<B>>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

pub fn router<B: GenerativeBackend + 'static>(adapter: Arc<RequestAdapter<B>>) -> Router {
    Router::new()
        .route("/categories", get(categories_handler))
        .route("/generate", post(generate_handler::<B>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { adapter })
}

pub async fn run_server<B: GenerativeBackend + 'static>(
    addr: SocketAddr,
    adapter: Arc<RequestAdapter<B>>,
) -> Result<()> {
    let app = router(adapter);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "server", %addr, "HTTP 服务已启动");

    axum::serve(listener, app)
        .await
        .map_err(|err| EngineError::other(format!("HTTP 服务错误: {err}")))?;

    Ok(())
}

async fn categories_handler() -> Json<Vec<CategoryView>> {
    Json(
        Category::ALL
            .iter()
            .map(|category| CategoryView {
                id: category.id(),
                label: category.label(),
                icon: category.icon(),
            })
            .collect(),
    )
}

async fn generate_handler<B: GenerativeBackend + 'static>(
    State(state): State<AppState<B>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("generate", %request_id, category = %request.category);

    match state
        .adapter
        .generate(request.category, &request.input)
        .instrument(span)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(request_id, err),
    }
}

fn error_response(request_id: Uuid, err: EngineError) -> Response {
    let status = match &err {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::Backend(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warn!(target: "server", %request_id, %status, error = %err, "生成失败");

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        orchestrator::tests::{Call, RecordingBackend},
        providers::{Citation, TextReply},
    };
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_generate(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn lists_categories_in_display_order() {
        let app = router(Arc::new(RequestAdapter::new(RecordingBackend::default())));
        let request = Request::builder()
            .uri("/categories")
            .body(Body::empty())
            .unwrap();

        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);

        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 8);
        assert_eq!(
            items[0],
            json!({"id": "universal", "label": "Universal", "icon": "Sparkles"})
        );
        assert_eq!(items[7]["id"], "image_edit");
    }

    #[tokio::test]
    async fn generate_returns_normalized_result() {
        let backend = RecordingBackend {
            text_reply: TextReply {
                text: Some("Role: tutor".to_string()),
                citations: vec![Citation {
                    uri: Some("https://a.example".to_string()),
                    title: Some("A".to_string()),
                }],
            },
            ..Default::default()
        };
        let adapter = Arc::new(RequestAdapter::new(backend));
        let app = router(adapter.clone());

        let (status, body) = call(
            app,
            post_generate(json!({
                "category": "youtube",
                "input": {"goal": "review a phone", "depth": "advanced"}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "text": "Role: tutor",
                "sources": [{"uri": "https://a.example", "title": "A"}]
            })
        );

        match adapter.backend().calls().as_slice() {
            [Call::Text(request)] => {
                assert!(request.grounded);
                assert!(request.content.contains("Goal/Task: review a phone\n"));
            }
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_image_is_bad_request() {
        let adapter = Arc::new(RequestAdapter::new(RecordingBackend::default()));
        let app = router(adapter.clone());

        let (status, body) = call(
            app,
            post_generate(json!({"category": "image_edit", "input": {"imagePrompt": "sharpen"}})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image provided for analysis.");
        assert!(adapter.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_bad_gateway() {
        let backend = RecordingBackend {
            fail_with: Some("API key not valid.".to_string()),
            ..Default::default()
        };
        let app = router(Arc::new(RequestAdapter::new(backend)));

        let (status, body) = call(app, post_generate(json!({"category": "reels"}))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "API key not valid.");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let adapter = Arc::new(RequestAdapter::new(RecordingBackend::default()));
        let app = router(adapter.clone());

        let (status, _) = call(app, post_generate(json!({"category": "podcast"}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(adapter.backend().calls().is_empty());
    }
}
