//! Session Manager Port - 会话生命周期管理
//!
//! 定义会话注册表的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::pomodoro::{
    GroupId, ParticipantId, Phase, RunState, Settings, SettingsError, SettingsPatch, StatsSnapshot,
};

/// Session Manager 错误
///
/// 所有错误都可恢复，失败的命令不会改变会话状态
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(GroupId),

    #[error("Session already active: {0}")]
    AlreadyActive(GroupId),

    #[error("Session is locked: {0}")]
    Locked(GroupId),

    #[error("Invalid state for session {group}: {reason}")]
    InvalidState { group: GroupId, reason: String },

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn invalid_state(group: &GroupId, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            group: group.clone(),
            reason: reason.into(),
        }
    }
}

/// 已有会话时的创建策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// 已存在即拒绝
    #[default]
    Reject,
    /// 替换已暂停或已停止的会话（运行中的会话永不替换）
    Replace,
}

/// 创建会话请求
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub group: GroupId,
    pub controller: ParticipantId,
    pub settings: Settings,
    pub mode: CreateMode,
}

/// 会话快照（只读）
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// 会话实例 ID（替换后会变化）
    pub session_id: Uuid,
    pub group: GroupId,
    pub controller: ParticipantId,
    pub phase: Phase,
    pub run_state: RunState,
    pub remaining_secs: u64,
    pub phase_duration_secs: u64,
    pub cycle_index: u32,
    pub settings: Settings,
    pub stats: StatsSnapshot,
    pub participants: Vec<ParticipantId>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Session Manager Port
///
/// 进程内注册表：每个分组最多一个存活会话
pub trait SessionManagerPort: Send + Sync {
    /// 创建会话（已存在时按 `CreateMode` 处理）
    fn get_or_create(&self, request: CreateSession) -> Result<SessionSnapshot, SessionError>;

    /// 获取会话快照
    fn get(&self, group: &GroupId) -> Result<SessionSnapshot, SessionError>;

    /// 暂停当前阶段
    fn pause(&self, group: &GroupId, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError>;

    /// 恢复当前阶段
    fn resume(&self, group: &GroupId, actor: &ParticipantId)
        -> Result<SessionSnapshot, SessionError>;

    /// 跳过当前阶段
    fn skip(&self, group: &GroupId, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError>;

    /// 停止并注销会话，返回最终统计
    fn stop(&self, group: &GroupId, actor: &ParticipantId) -> Result<StatsSnapshot, SessionError>;

    /// 修改设置（仅暂停时允许）
    fn edit(
        &self,
        group: &GroupId,
        actor: &ParticipantId,
        patch: SettingsPatch,
    ) -> Result<SessionSnapshot, SessionError>;

    /// 参与者加入
    fn join(&self, group: &GroupId, participant: ParticipantId)
        -> Result<SessionSnapshot, SessionError>;

    /// 参与者离开
    fn leave(&self, group: &GroupId, participant: &ParticipantId)
        -> Result<SessionSnapshot, SessionError>;

    /// 销毁并注销会话（幂等），返回是否确实移除
    fn remove(&self, group: &GroupId) -> bool;

    /// 清理空闲会话，返回被清理的分组
    fn sweep_idle(&self, idle_timeout: Duration) -> Vec<GroupId>;

    /// 检查分组是否有会话
    fn is_active(&self, group: &GroupId) -> bool;

    /// 获取所有会话快照
    fn list_all(&self) -> Vec<SessionSnapshot>;
}
