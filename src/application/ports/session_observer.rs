//! Session Observer Port - 事件观察者
//!
//! 静音控制、私信通知等外部协作者通过此接口接收会话事件。
//! 投递是尽力而为的：观察者失败不会回滚或阻塞计时状态机

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pomodoro::SessionEvent;

/// 观察者错误
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Request timeout")]
    Timeout,
}

/// Session Observer Port
#[async_trait]
pub trait SessionObserverPort: Send + Sync {
    /// 观察者名称（用于日志）
    fn name(&self) -> &'static str;

    /// 是否关心该事件（默认不接收 Tick）
    fn accepts(&self, event: &SessionEvent) -> bool {
        !event.is_tick()
    }

    /// 处理事件
    async fn on_event(&self, event: &SessionEvent) -> Result<(), ObserverError>;
}
