//! Session Commands - 会话相关命令

use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::ports::CreateMode;
use crate::domain::pomodoro::{GroupId, ParticipantId, SettingsPatch, StatsSnapshot};

/// 开始会话命令
///
/// `settings` 中未提供的字段使用服务默认值
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub group: String,
    pub controller: String,
    pub settings: SettingsPatch,
    pub mode: CreateMode,
}

/// 运行控制动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Pause,
    Resume,
    Skip,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
            ControlAction::Skip => "skip",
        }
    }
}

/// 暂停/恢复/跳过命令
#[derive(Debug, Clone)]
pub struct ControlSessionCommand {
    pub group: String,
    pub actor: String,
    pub action: ControlAction,
}

/// 停止会话命令
#[derive(Debug, Clone)]
pub struct StopSessionCommand {
    pub group: String,
    pub actor: String,
}

/// 停止会话响应
#[derive(Debug, Clone, Serialize)]
pub struct StopSessionResponse {
    pub group: GroupId,
    pub final_stats: StatsSnapshot,
}

/// 修改设置命令
#[derive(Debug, Clone)]
pub struct EditSettingsCommand {
    pub group: String,
    pub actor: String,
    pub patch: SettingsPatch,
}

/// 在场动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceAction {
    Join,
    Leave,
}

/// 加入/离开命令
#[derive(Debug, Clone)]
pub struct PresenceCommand {
    pub group: String,
    pub participant: String,
    pub action: PresenceAction,
}

/// 解析分组 ID
pub(crate) fn parse_group(raw: &str) -> Result<GroupId, ApplicationError> {
    GroupId::new(raw).map_err(ApplicationError::validation)
}

/// 解析参与者 ID
pub(crate) fn parse_participant(raw: &str) -> Result<ParticipantId, ApplicationError> {
    ParticipantId::new(raw).map_err(ApplicationError::validation)
}
