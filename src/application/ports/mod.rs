//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod session_manager;
mod session_observer;

pub use session_manager::{
    CreateMode, CreateSession, SessionError, SessionManagerPort, SessionSnapshot,
};
pub use session_observer::{ObserverError, SessionObserverPort};
