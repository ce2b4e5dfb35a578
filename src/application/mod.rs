//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SessionManager、SessionObserver）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    ControlAction,
    ControlSessionCommand,
    EditSettingsCommand,
    PresenceAction,
    PresenceCommand,
    StartSessionCommand,
    StopSessionCommand,
    StopSessionResponse,
    // Handlers
    handlers::{
        ControlSessionHandler, EditSettingsHandler, PresenceHandler, SessionDefaults,
        StartSessionHandler, StopSessionHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Session manager
    CreateMode,
    CreateSession,
    SessionError,
    SessionManagerPort,
    SessionSnapshot,
    // Session observer
    ObserverError,
    SessionObserverPort,
};

pub use queries::{
    GetSession,
    ListSessions,
    // Handlers
    handlers::{GetSessionHandler, ListSessionsHandler},
};
