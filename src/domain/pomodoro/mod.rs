//! Pomodoro Context - 番茄钟限界上下文
//!
//! 职责:
//! - 会话设置的校验
//! - 专注/休息阶段的循环簿记
//! - 会话统计
//! - 对外事件定义

mod aggregate;
mod errors;
mod events;
mod settings;
mod stats;
mod value_objects;

pub use aggregate::{PhaseChange, PomodoroCycle};
pub use errors::SettingsError;
pub use events::{EndReason, SessionEvent};
pub use settings::{Settings, SettingsDraft, SettingsPatch, DEFAULT_MAX_INTERVAL_SECS};
pub use stats::{Stats, StatsSnapshot};
pub use value_objects::{
    Completion, GroupId, ParticipantId, Phase, RunState, SessionKind, SkipCredit,
};
