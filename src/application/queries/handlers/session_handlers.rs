//! Session Query Handlers

use std::sync::Arc;

use crate::application::commands::parse_group;
use crate::application::error::ApplicationError;
use crate::application::ports::{SessionManagerPort, SessionSnapshot};
use crate::application::queries::{GetSession, ListSessions};

/// GetSession Handler
pub struct GetSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(&self, query: GetSession) -> Result<SessionSnapshot, ApplicationError> {
        let group = parse_group(&query.group)?;
        Ok(self.session_manager.get(&group)?)
    }
}

/// ListSessions Handler
pub struct ListSessionsHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl ListSessionsHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(&self, _query: ListSessions) -> Vec<SessionSnapshot> {
        self.session_manager.list_all()
    }
}
