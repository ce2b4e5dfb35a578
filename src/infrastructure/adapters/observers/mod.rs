//! Observer Adapters - 会话事件观察者实现

mod tracing_observer;
mod webhook_observer;

pub use tracing_observer::TracingObserver;
pub use webhook_observer::{WebhookObserver, WebhookObserverConfig};
