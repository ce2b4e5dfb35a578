//! Webhook Observer - 把会话事件 POST 到外部服务
//!
//! 外部协作者（聊天机器人的静音控制、私信通知）通过 webhook 接收事件:
//! POST {url}
//! Request: {"event": "PhaseStarted", "data": {...}, "sent_at": "..."}  (JSON)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{ObserverError, SessionObserverPort};
use crate::domain::pomodoro::SessionEvent;

/// Webhook 请求体
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    event: &'a SessionEvent,
    sent_at: DateTime<Utc>,
}

/// Webhook 配置
#[derive(Debug, Clone)]
pub struct WebhookObserverConfig {
    /// 目标 URL
    pub url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl WebhookObserverConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Webhook 观察者
pub struct WebhookObserver {
    client: Client,
    config: WebhookObserverConfig,
}

impl WebhookObserver {
    pub fn new(config: WebhookObserverConfig) -> Result<Self, ObserverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ObserverError::DeliveryFailed(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SessionObserverPort for WebhookObserver {
    fn name(&self) -> &'static str {
        "webhook"
    }

    /// 不推送 Tick；关闭了通知的会话不推送阶段开始
    fn accepts(&self, event: &SessionEvent) -> bool {
        match event {
            SessionEvent::Tick { .. } => false,
            SessionEvent::PhaseStarted { notify, .. } => *notify,
            _ => true,
        }
    }

    async fn on_event(&self, event: &SessionEvent) -> Result<(), ObserverError> {
        let payload = WebhookPayload {
            event,
            sent_at: Utc::now(),
        };

        tracing::debug!(url = %self.config.url, event = event.name(), "Sending webhook");

        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ObserverError::Timeout
                } else {
                    ObserverError::DeliveryFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ObserverError::DeliveryFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pomodoro::{EndReason, GroupId, Phase, StatsSnapshot};
    use axum::{extract::State, routing::post, Json, Router};
    use tokio::sync::mpsc;

    async fn receiver() -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new()
            .route(
                "/hook",
                post(
                    |State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
                     Json(body): Json<serde_json::Value>| async move {
                        let _ = tx.send(body);
                    },
                ),
            )
            .with_state(tx);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/hook", addr), rx)
    }

    #[tokio::test]
    async fn test_webhook_delivers_event() {
        let (url, mut rx) = receiver().await;
        let observer = WebhookObserver::new(WebhookObserverConfig::new(url)).unwrap();

        let event = SessionEvent::SessionEnded {
            group: GroupId::new("g1").unwrap(),
            reason: EndReason::Stopped,
            final_stats: StatsSnapshot::default(),
        };
        observer.on_event(&event).await.unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(body["event"], "SessionEnded");
        assert_eq!(body["data"]["group"], "g1");
        assert_eq!(body["data"]["reason"], "stopped");
        assert!(body["sent_at"].is_string());
    }

    #[test]
    fn test_webhook_filters_events() {
        let observer =
            WebhookObserver::new(WebhookObserverConfig::new("http://127.0.0.1:1/hook")).unwrap();
        let group = GroupId::new("g1").unwrap();
        let phase_started = |notify| SessionEvent::PhaseStarted {
            group: group.clone(),
            phase: Phase::ShortBreak,
            duration_secs: 300,
            cycle_index: 1,
            auto_mute: false,
            notify,
        };

        assert!(observer.accepts(&phase_started(true)));
        assert!(!observer.accepts(&phase_started(false)));
        assert!(!observer.accepts(&SessionEvent::Tick {
            group: group.clone(),
            phase: Phase::Work,
            remaining_secs: 3,
        }));
        assert!(observer.accepts(&SessionEvent::SessionExpiredIdle { group }));
    }

    #[tokio::test]
    async fn test_webhook_unreachable_is_delivery_failure() {
        let observer =
            WebhookObserver::new(WebhookObserverConfig::new("http://127.0.0.1:1/hook").with_timeout(2))
                .unwrap();
        let event = SessionEvent::SessionExpiredIdle {
            group: GroupId::new("g1").unwrap(),
        };
        assert!(observer.on_event(&event).await.is_err());
    }
}
