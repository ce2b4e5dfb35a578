//! Pomodoro Context - Domain Events
//!
//! 会话向外部协作者（静音控制、私信通知、显示更新）发出的事件

use serde::Serialize;

use super::{GroupId, Phase, StatsSnapshot};

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// 用户停止
    Stopped,
    /// 倒计时自然结束
    Completed,
    /// 被新会话替换
    Replaced,
    /// 内部调度故障
    InternalError,
}

/// 会话事件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum SessionEvent {
    /// 新阶段开始
    PhaseStarted {
        group: GroupId,
        phase: Phase,
        duration_secs: u64,
        cycle_index: u32,
        auto_mute: bool,
        notify: bool,
    },
    /// 倒计时心跳
    Tick {
        group: GroupId,
        phase: Phase,
        remaining_secs: u64,
    },
    SessionPaused {
        group: GroupId,
        phase: Phase,
        remaining_secs: u64,
    },
    SessionResumed {
        group: GroupId,
        phase: Phase,
        remaining_secs: u64,
    },
    /// 会话结束（附最终统计）
    SessionEnded {
        group: GroupId,
        reason: EndReason,
        final_stats: StatsSnapshot,
    },
    /// 因空闲被清理
    SessionExpiredIdle { group: GroupId },
}

impl SessionEvent {
    pub fn group(&self) -> &GroupId {
        match self {
            SessionEvent::PhaseStarted { group, .. }
            | SessionEvent::Tick { group, .. }
            | SessionEvent::SessionPaused { group, .. }
            | SessionEvent::SessionResumed { group, .. }
            | SessionEvent::SessionEnded { group, .. }
            | SessionEvent::SessionExpiredIdle { group } => group,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PhaseStarted { .. } => "PhaseStarted",
            SessionEvent::Tick { .. } => "Tick",
            SessionEvent::SessionPaused { .. } => "SessionPaused",
            SessionEvent::SessionResumed { .. } => "SessionResumed",
            SessionEvent::SessionEnded { .. } => "SessionEnded",
            SessionEvent::SessionExpiredIdle { .. } => "SessionExpiredIdle",
        }
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, SessionEvent::Tick { .. })
    }
}
