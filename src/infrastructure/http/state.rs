//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ControlSessionHandler, EditSettingsHandler, PresenceHandler, SessionDefaults,
    StartSessionHandler, StopSessionHandler,
    // Query handlers
    GetSessionHandler, ListSessionsHandler,
    // Ports
    SessionManagerPort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub start_session_handler: StartSessionHandler,
    pub control_session_handler: ControlSessionHandler,
    pub stop_session_handler: StopSessionHandler,
    pub edit_settings_handler: EditSettingsHandler,
    pub presence_handler: PresenceHandler,

    // ========== Query Handlers ==========
    pub get_session_handler: GetSessionHandler,
    pub list_sessions_handler: ListSessionsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
        defaults: SessionDefaults,
    ) -> Self {
        Self {
            // Ports
            session_manager: session_manager.clone(),
            event_publisher,

            // Command handlers
            start_session_handler: StartSessionHandler::new(session_manager.clone(), defaults),
            control_session_handler: ControlSessionHandler::new(session_manager.clone()),
            stop_session_handler: StopSessionHandler::new(session_manager.clone()),
            edit_settings_handler: EditSettingsHandler::new(session_manager.clone()),
            presence_handler: PresenceHandler::new(session_manager.clone()),

            // Query handlers
            get_session_handler: GetSessionHandler::new(session_manager.clone()),
            list_sessions_handler: ListSessionsHandler::new(session_manager),
        }
    }
}
