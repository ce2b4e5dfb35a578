//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{CreateSession, SessionManagerPort, SessionSnapshot};
use crate::domain::pomodoro::{SettingsDraft, DEFAULT_MAX_INTERVAL_SECS};

/// 创建会话时使用的默认设置
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub settings: SettingsDraft,
    /// 单个阶段的时长上限（秒）
    pub max_interval_secs: u64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            settings: SettingsDraft::default(),
            max_interval_secs: DEFAULT_MAX_INTERVAL_SECS,
        }
    }
}

/// StartSession Handler - 创建会话
pub struct StartSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    defaults: SessionDefaults,
}

impl StartSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>, defaults: SessionDefaults) -> Self {
        Self {
            session_manager,
            defaults,
        }
    }

    pub fn handle(&self, cmd: StartSessionCommand) -> Result<SessionSnapshot, ApplicationError> {
        let group = parse_group(&cmd.group)?;
        let controller = parse_participant(&cmd.controller)?;

        // 默认值 + 请求覆盖，整体重新校验
        let settings = self
            .defaults
            .settings
            .clone()
            .validate(self.defaults.max_interval_secs)
            .and_then(|base| base.apply(cmd.settings, self.defaults.max_interval_secs))
            .map_err(|e| ApplicationError::validation(e.to_string()))?;

        let snapshot = self.session_manager.get_or_create(CreateSession {
            group,
            controller,
            settings,
            mode: cmd.mode,
        })?;

        tracing::info!(
            group = %snapshot.group,
            session_id = %snapshot.session_id,
            controller = %snapshot.controller,
            mode = ?cmd.mode,
            "Pomodoro session started"
        );

        Ok(snapshot)
    }
}

/// ControlSession Handler - 暂停/恢复/跳过
pub struct ControlSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl ControlSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(&self, cmd: ControlSessionCommand) -> Result<SessionSnapshot, ApplicationError> {
        let group = parse_group(&cmd.group)?;
        let actor = parse_participant(&cmd.actor)?;

        let snapshot = match cmd.action {
            ControlAction::Pause => self.session_manager.pause(&group, &actor),
            ControlAction::Resume => self.session_manager.resume(&group, &actor),
            ControlAction::Skip => self.session_manager.skip(&group, &actor),
        }?;

        tracing::debug!(
            group = %group,
            actor = %actor,
            action = cmd.action.as_str(),
            "Session control applied"
        );

        Ok(snapshot)
    }
}

/// StopSession Handler - 停止并注销会话
pub struct StopSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl StopSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(&self, cmd: StopSessionCommand) -> Result<StopSessionResponse, ApplicationError> {
        let group = parse_group(&cmd.group)?;
        let actor = parse_participant(&cmd.actor)?;

        let final_stats = self.session_manager.stop(&group, &actor)?;

        Ok(StopSessionResponse { group, final_stats })
    }
}

/// EditSettings Handler - 修改暂停中的会话设置
pub struct EditSettingsHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl EditSettingsHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(&self, cmd: EditSettingsCommand) -> Result<SessionSnapshot, ApplicationError> {
        let group = parse_group(&cmd.group)?;
        let actor = parse_participant(&cmd.actor)?;

        Ok(self.session_manager.edit(&group, &actor, cmd.patch)?)
    }
}

/// Presence Handler - 参与者加入/离开
pub struct PresenceHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl PresenceHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(&self, cmd: PresenceCommand) -> Result<SessionSnapshot, ApplicationError> {
        let group = parse_group(&cmd.group)?;
        let participant = parse_participant(&cmd.participant)?;

        let snapshot = match cmd.action {
            PresenceAction::Join => self.session_manager.join(&group, participant)?,
            PresenceAction::Leave => self.session_manager.leave(&group, &participant)?,
        };
        Ok(snapshot)
    }
}
