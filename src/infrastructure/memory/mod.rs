//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionManager，管理所有分组的存活会话

mod live_session;
mod session_manager;

pub use live_session::{EndHook, LiveSession, LiveSessionConfig};
pub use session_manager::InMemorySessionManager;
