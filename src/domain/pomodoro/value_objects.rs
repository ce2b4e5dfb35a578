//! Pomodoro Context - Value Objects

use serde::{Deserialize, Serialize};

/// 分组标识（一个 guild 对应一个会话）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("分组 ID 不能为空");
        }
        if id.len() > 128 {
            return Err("分组 ID 长度不能超过128字符");
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 参与者标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("参与者 ID 不能为空");
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 阶段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// 专注
    Work,
    /// 短休息
    ShortBreak,
    /// 长休息
    LongBreak,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Work)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 运行状态（与 Phase 组合成会话的复合状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Paused,
    /// 终态
    Stopped,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        }
    }
}

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// 专注与休息交替循环
    #[default]
    Pomodoro,
    /// 单次倒计时，结束即终止会话
    Countdown,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Pomodoro => "pomodoro",
            SessionKind::Countdown => "countdown",
        }
    }
}

/// 跳过专注阶段时的统计计入策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCredit {
    /// 不计入
    #[default]
    None,
    /// 只计入已经过的时间，不增加完成次数
    Elapsed,
    /// 按完整阶段计入
    Full,
}

impl SkipCredit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(SkipCredit::None),
            "elapsed" => Some(SkipCredit::Elapsed),
            "full" => Some(SkipCredit::Full),
            _ => None,
        }
    }
}

/// 阶段结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// 倒计时自然结束
    Natural,
    /// 用户跳过
    Skipped,
}
