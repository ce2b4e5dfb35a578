//! WebSocket Handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::pomodoro::{GroupId, SessionEvent};
use crate::infrastructure::http::state::AppState;

/// 分组 WebSocket 连接处理（该分组的全部事件，含 Tick）
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(group): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_group_socket(socket, group, state))
}

/// 全局 WebSocket 连接处理（生命周期事件，不含 Tick）
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

async fn handle_group_socket(socket: WebSocket, group: String, state: Arc<AppState>) {
    let group = match GroupId::new(group) {
        Ok(group) => group,
        Err(e) => {
            tracing::warn!(error = e, "WebSocket connection rejected: invalid group");
            let (mut sender, _) = socket.split();
            let _ = sender.close().await;
            return;
        }
    };

    // 会话可以晚于订阅创建，订阅不要求会话已存在
    let event_rx = state.event_publisher.subscribe(&group);
    tracing::info!(group = %group, "WebSocket connected");

    pump(socket, event_rx).await;

    state.event_publisher.release(&group);
    tracing::info!(group = %group, "WebSocket disconnected");
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let event_rx = state.event_publisher.subscribe_global();
    tracing::info!("Global WebSocket connected");

    pump(socket, event_rx).await;

    tracing::info!("Global WebSocket disconnected");
}

/// 转发事件到客户端，直到任意一端关闭
///
/// 两个方向在同一任务内 select，返回时订阅随之释放
async fn pump(socket: WebSocket, mut event_rx: broadcast::Receiver<SessionEvent>) {
    let (mut sender, mut receiver) = socket.split();

    // 事件转发
    let forward = async {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "WebSocket subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    };

    // 接收客户端消息（心跳）
    let receive = async {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::debug!("WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket error");
                    break;
                }
                // Ping 由 axum 自动响应
                _ => {}
            }
        }
    };

    tokio::select! {
        _ = forward => {}
        _ = receive => {}
    }
}
