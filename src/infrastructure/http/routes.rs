//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/session/start     POST  开始会话
//! - /api/session/pause     POST  暂停
//! - /api/session/resume    POST  恢复
//! - /api/session/skip      POST  跳过当前阶段
//! - /api/session/stop      POST  停止并返回最终统计
//! - /api/session/edit      POST  修改设置（仅暂停时）
//! - /api/session/join      POST  参与者加入
//! - /api/session/leave     POST  参与者离开
//! - /api/session/get       POST  获取会话快照
//! - /api/session/list      GET   列出所有会话
//! - /ws/session/{group}    WS    分组 WebSocket（含 Tick）
//! - /ws/events             WS    全局 WebSocket（生命周期事件）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/session/:group", get(handlers::websocket_handler))
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/session", session_routes())
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_session))
        .route("/pause", post(handlers::pause_session))
        .route("/resume", post(handlers::resume_session))
        .route("/skip", post(handlers::skip_phase))
        .route("/stop", post(handlers::stop_session))
        .route("/edit", post(handlers::edit_settings))
        .route("/join", post(handlers::join_session))
        .route("/leave", post(handlers::leave_session))
        .route("/get", post(handlers::get_session))
        .route("/list", get(handlers::list_sessions))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::SessionDefaults;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::{InMemorySessionManager, LiveSessionConfig};
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    pub(crate) fn test_router() -> Router {
        let events = EventPublisher::new().arc();
        let manager = Arc::new(InMemorySessionManager::new(
            LiveSessionConfig::default(),
            events.clone(),
        ));
        let state = AppState::new(manager, events, SessionDefaults::default());
        create_routes().with_state(Arc::new(state))
    }

    async fn call(app: &Router, uri: &str, body: Value) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = test_router();
        let request = Request::builder().uri("/api/ping").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_flow_over_http() {
        let app = test_router();

        let started = call(
            &app,
            "/api/session/start",
            json!({"group": "g1", "controller": "alice", "settings": {"work_secs": 600}}),
        )
        .await;
        assert_eq!(started["errno"], 0);
        assert_eq!(started["data"]["phase"], "work");
        assert_eq!(started["data"]["run_state"], "running");
        assert_eq!(started["data"]["remaining_secs"], 600);

        let dup = call(&app, "/api/session/start", json!({"group": "g1", "controller": "bob"})).await;
        assert_eq!(dup["errno"], 409);

        let paused = call(&app, "/api/session/pause", json!({"group": "g1", "actor": "alice"})).await;
        assert_eq!(paused["data"]["run_state"], "paused");

        let edited = call(
            &app,
            "/api/session/edit",
            json!({"group": "g1", "actor": "alice", "settings": {"short_break_secs": 120}}),
        )
        .await;
        assert_eq!(edited["data"]["settings"]["short_break_secs"], 120);

        let joined = call(&app, "/api/session/join", json!({"group": "g1", "participant": "bob"})).await;
        assert_eq!(joined["data"]["participants"], json!(["alice", "bob"]));

        let skipped = call(&app, "/api/session/skip", json!({"group": "g1", "actor": "bob"})).await;
        assert_eq!(skipped["data"]["phase"], "short_break");
        assert_eq!(skipped["data"]["remaining_secs"], 120);

        let stopped = call(&app, "/api/session/stop", json!({"group": "g1", "actor": "alice"})).await;
        assert_eq!(stopped["errno"], 0);
        assert_eq!(stopped["data"]["final_stats"]["completed_work"], 0);

        let missing = call(&app, "/api/session/get", json!({"group": "g1"})).await;
        assert_eq!(missing["errno"], 404);
        assert!(missing["data"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_codes() {
        let app = test_router();

        let invalid = call(
            &app,
            "/api/session/start",
            json!({"group": "g1", "controller": "alice", "settings": {"cycles": 0}}),
        )
        .await;
        assert_eq!(invalid["errno"], 400);

        call(
            &app,
            "/api/session/start",
            json!({"group": "g1", "controller": "alice", "settings": {"locked": true}}),
        )
        .await;

        let locked = call(&app, "/api/session/pause", json!({"group": "g1", "actor": "bob"})).await;
        assert_eq!(locked["errno"], 403);

        let not_paused = call(&app, "/api/session/resume", json!({"group": "g1", "actor": "alice"})).await;
        assert_eq!(not_paused["errno"], 409);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_sessions() {
        let app = test_router();
        call(&app, "/api/session/start", json!({"group": "g2", "controller": "a"})).await;
        call(&app, "/api/session/start", json!({"group": "g1", "controller": "b"})).await;

        let request = Request::builder()
            .uri("/api/session/list")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        let groups: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["group"].as_str().unwrap())
            .collect();
        assert_eq!(groups, vec!["g1", "g2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_session_over_http() {
        let app = test_router();
        let started = call(
            &app,
            "/api/session/start",
            json!({"group": "g1", "controller": "alice", "settings": {"kind": "countdown", "work_secs": 30, "locked": true}}),
        )
        .await;
        assert_eq!(started["errno"], 0);
        assert_eq!(started["data"]["settings"]["kind"], "countdown");
        assert_eq!(started["data"]["remaining_secs"], 30);

        // 锁定会话对其他人的创建请求返回 403
        let other = call(&app, "/api/session/start", json!({"group": "g1", "controller": "bob"})).await;
        assert_eq!(other["errno"], 403);

        tokio::time::sleep(std::time::Duration::from_secs(31)).await;
        let gone = call(&app, "/api/session/get", json!({"group": "g1"})).await;
        assert_eq!(gone["errno"], 404);
    }
}
