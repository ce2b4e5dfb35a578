//! Pomodoro Context - Errors

use thiserror::Error;

/// 设置校验错误（用户可修正，不会导致进程崩溃）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} 必须大于 0 秒")]
    NonPositiveDuration { field: &'static str },

    #[error("{field} 不能超过 {max} 秒")]
    DurationTooLong { field: &'static str, max: u64 },

    #[error("循环次数必须至少为 1")]
    NonPositiveCycles,
}
