//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::SessionError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 会话已锁定，无权操作
    #[error("Locked: {0}")]
    Locked(String),

    /// 资源冲突
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(group) => Self::not_found("Session", group.as_str()),
            SessionError::AlreadyActive(group) => {
                Self::Conflict(format!("session already active in group {}", group))
            }
            SessionError::Locked(group) => Self::Locked(format!(
                "session in group {} is locked to its controller",
                group
            )),
            SessionError::InvalidState { reason, .. } => Self::InvalidState(reason),
            SessionError::InvalidSettings(e) => Self::ValidationError(e.to_string()),
            SessionError::Internal(message) => Self::InternalError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pomodoro::{GroupId, SettingsError};

    #[test]
    fn test_session_error_mapping() {
        let group = GroupId::new("g1").unwrap();

        assert!(matches!(
            ApplicationError::from(SessionError::NotFound(group.clone())),
            ApplicationError::NotFound { resource_type: "Session", .. }
        ));
        assert!(matches!(
            ApplicationError::from(SessionError::AlreadyActive(group.clone())),
            ApplicationError::Conflict(_)
        ));
        assert!(matches!(
            ApplicationError::from(SessionError::Locked(group.clone())),
            ApplicationError::Locked(_)
        ));
        assert!(matches!(
            ApplicationError::from(SessionError::InvalidSettings(SettingsError::NonPositiveCycles)),
            ApplicationError::ValidationError(_)
        ));

        let err = ApplicationError::from(SessionError::invalid_state(&group, "cannot pause while stopped"));
        assert_eq!(err.to_string(), "Invalid state: cannot pause while stopped");
    }
}
