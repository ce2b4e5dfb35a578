//! Event Publisher Implementation
//!
//! 会话事件推送：按分组广播、全局广播、观察者回调

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::SessionObserverPort;
use crate::domain::pomodoro::{GroupId, SessionEvent};

/// 广播通道容量
const CHANNEL_CAPACITY: usize = 100;

/// 事件发布器
///
/// 发布永不阻塞：广播无接收者时丢弃，观察者在独立任务中执行
pub struct EventPublisher {
    /// group -> broadcast sender（该分组的全部事件，含 Tick）
    group_channels: DashMap<GroupId, broadcast::Sender<SessionEvent>>,
    /// 全局通道（生命周期事件，不含 Tick）
    global_channel: broadcast::Sender<SessionEvent>,
    observers: Vec<Arc<dyn SessionObserverPort>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_observers(Vec::new())
    }

    pub fn with_observers(observers: Vec<Arc<dyn SessionObserverPort>>) -> Self {
        let (global_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            group_channels: DashMap::new(),
            global_channel: global_tx,
            observers,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<SessionEvent> {
        self.global_channel.subscribe()
    }

    /// 订阅分组事件（通道不存在时创建）
    pub fn subscribe(&self, group: &GroupId) -> broadcast::Receiver<SessionEvent> {
        self.group_channels
            .entry(group.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 没有订阅者时移除分组通道
    pub fn release(&self, group: &GroupId) {
        let removed = self
            .group_channels
            .remove_if(group, |_, sender| sender.receiver_count() == 0)
            .is_some();
        if removed {
            tracing::debug!(group = %group, "Group event channel released");
        }
    }

    /// 发布事件
    pub fn publish(&self, event: SessionEvent) {
        if let Some(sender) = self.group_channels.get(event.group()) {
            if let Err(e) = sender.send(event.clone()) {
                tracing::trace!(
                    group = %event.group(),
                    error = %e,
                    "Failed to publish group event (no receivers)"
                );
            }
        }

        if !event.is_tick() {
            if let Err(e) = self.global_channel.send(event.clone()) {
                tracing::trace!(
                    event = event.name(),
                    error = %e,
                    "Failed to publish global event (no receivers)"
                );
            }
        }

        self.notify_observers(&event);
    }

    /// 每个观察者在独立任务中处理，失败只记录日志
    fn notify_observers(&self, event: &SessionEvent) {
        for observer in &self.observers {
            if !observer.accepts(event) {
                continue;
            }

            let handle = match tokio::runtime::Handle::try_current() {
                Ok(handle) => handle,
                Err(_) => {
                    tracing::warn!(
                        observer = observer.name(),
                        event = event.name(),
                        "No runtime available, observer notification dropped"
                    );
                    continue;
                }
            };

            let observer = observer.clone();
            let event = event.clone();
            handle.spawn(async move {
                if let Err(e) = observer.on_event(&event).await {
                    tracing::warn!(
                        observer = observer.name(),
                        event = event.name(),
                        group = %event.group(),
                        error = %e,
                        "Observer failed to handle event"
                    );
                }
            });
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
