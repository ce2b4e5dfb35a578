//! Events Layer - 会话事件分发
//!
//! 广播通道（WebSocket 推送）+ 观察者扇出

mod publisher;

pub use publisher::EventPublisher;
