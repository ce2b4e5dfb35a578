//! In-Memory Session Manager Implementation

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{EndHook, LiveSession, LiveSessionConfig};
use crate::application::ports::{
    CreateMode, CreateSession, SessionError, SessionManagerPort, SessionSnapshot,
};
use crate::domain::pomodoro::{
    EndReason, GroupId, ParticipantId, RunState, SettingsPatch, StatsSnapshot,
};
use crate::infrastructure::events::EventPublisher;

/// 内存会话管理器
///
/// 锁顺序固定为 注册表分片 -> 会话互斥锁，会话内部从不回调注册表
pub struct InMemorySessionManager {
    sessions: Arc<DashMap<GroupId, Arc<LiveSession>>>,
    config: LiveSessionConfig,
    events: Arc<EventPublisher>,
}

impl InMemorySessionManager {
    pub fn new(config: LiveSessionConfig, events: Arc<EventPublisher>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config,
            events,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn events(&self) -> &Arc<EventPublisher> {
        &self.events
    }

    fn session(&self, group: &GroupId) -> Result<Arc<LiveSession>, SessionError> {
        self.sessions
            .get(group)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SessionError::NotFound(group.clone()))
    }

    /// 在会话上执行命令
    ///
    /// 命令与空闲清理竞争失败时（会话已被清理并注销）报告 NotFound
    fn with_session<T>(
        &self,
        group: &GroupId,
        op: impl FnOnce(&LiveSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.session(group)?;
        match op(session.as_ref()) {
            Err(SessionError::InvalidState { .. })
                if session.run_state() == RunState::Stopped && !self.is_registered(&session) =>
            {
                Err(SessionError::NotFound(group.clone()))
            }
            result => result,
        }
    }

    fn is_registered(&self, session: &Arc<LiveSession>) -> bool {
        self.sessions
            .get(session.group())
            .map(|current| Arc::ptr_eq(current.value(), session))
            .unwrap_or(false)
    }

    fn spawn(&self, request: &CreateSession) -> Result<Arc<LiveSession>, SessionError> {
        LiveSession::start_with_end_hook(
            request.group.clone(),
            request.controller.clone(),
            request.settings.clone(),
            self.config.clone(),
            self.events.clone(),
            Some(self.end_hook()),
        )
    }

    /// 会话自行结束（倒计时完成）时从注册表注销
    fn end_hook(&self) -> EndHook {
        let sessions = Arc::downgrade(&self.sessions);
        let events = self.events.clone();
        Arc::new(move |session: &Arc<LiveSession>| {
            if let Some(sessions) = sessions.upgrade() {
                unregister(&sessions, &events, session);
            }
        })
    }

    fn unregister(&self, session: &Arc<LiveSession>) {
        unregister(&self.sessions, &self.events, session);
    }
}

/// 注销指定实例（仅当注册表中仍是同一个实例时）
fn unregister(
    sessions: &DashMap<GroupId, Arc<LiveSession>>,
    events: &EventPublisher,
    session: &Arc<LiveSession>,
) {
    let removed = sessions
        .remove_if(session.group(), |_, current| Arc::ptr_eq(current, session))
        .is_some();
    if removed {
        tracing::debug!(group = %session.group(), "Session unregistered");
        events.release(session.group());
    }
}

impl SessionManagerPort for InMemorySessionManager {
    fn get_or_create(&self, request: CreateSession) -> Result<SessionSnapshot, SessionError> {
        // entry 持有分片写锁，同一分组的并发创建只有一个成功
        match self.sessions.entry(request.group.clone()) {
            Entry::Vacant(entry) => {
                let session = self.spawn(&request)?;
                let snapshot = session.snapshot();
                entry.insert(session);
                tracing::info!(group = %request.group, "Session created");
                Ok(snapshot)
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get().clone();
                let run_state = existing.run_state();
                // 锁定的存活会话对非控制者一律报告 Locked
                if run_state != RunState::Stopped {
                    existing.authorize(&request.controller)?;
                }
                match run_state {
                    // 已停止的残留实例（调度故障）直接覆盖
                    RunState::Stopped => {}
                    RunState::Running => {
                        return Err(SessionError::AlreadyActive(request.group.clone()));
                    }
                    RunState::Paused => {
                        if request.mode == CreateMode::Reject {
                            return Err(SessionError::AlreadyActive(request.group.clone()));
                        }
                        existing.terminate(EndReason::Replaced);
                        tracing::info!(
                            group = %request.group,
                            previous = %existing.id(),
                            "Paused session replaced"
                        );
                    }
                }

                let session = self.spawn(&request)?;
                let snapshot = session.snapshot();
                entry.insert(session);
                Ok(snapshot)
            }
        }
    }

    fn get(&self, group: &GroupId) -> Result<SessionSnapshot, SessionError> {
        Ok(self.session(group)?.snapshot())
    }

    fn pause(&self, group: &GroupId, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError> {
        self.with_session(group, |s| s.pause(actor))
    }

    fn resume(
        &self,
        group: &GroupId,
        actor: &ParticipantId,
    ) -> Result<SessionSnapshot, SessionError> {
        self.with_session(group, |s| s.resume(actor))
    }

    fn skip(&self, group: &GroupId, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError> {
        let session = self.session(group)?;
        let snapshot = self.with_session(group, |s| s.skip(actor))?;
        // 跳过单次倒计时即结束会话
        if snapshot.run_state == RunState::Stopped {
            self.unregister(&session);
        }
        Ok(snapshot)
    }

    fn stop(&self, group: &GroupId, actor: &ParticipantId) -> Result<StatsSnapshot, SessionError> {
        let session = self.session(group)?;
        let stats = session.stop(actor)?;
        self.unregister(&session);
        Ok(stats)
    }

    fn edit(
        &self,
        group: &GroupId,
        actor: &ParticipantId,
        patch: SettingsPatch,
    ) -> Result<SessionSnapshot, SessionError> {
        self.with_session(group, |s| s.edit(actor, patch))
    }

    fn join(
        &self,
        group: &GroupId,
        participant: ParticipantId,
    ) -> Result<SessionSnapshot, SessionError> {
        self.with_session(group, |s| s.join(participant))
    }

    fn leave(
        &self,
        group: &GroupId,
        participant: &ParticipantId,
    ) -> Result<SessionSnapshot, SessionError> {
        self.with_session(group, |s| s.leave(participant))
    }

    fn remove(&self, group: &GroupId) -> bool {
        match self.sessions.remove(group) {
            Some((_, session)) => {
                session.terminate(EndReason::Stopped);
                self.events.release(group);
                tracing::info!(group = %group, "Session removed");
                true
            }
            None => false,
        }
    }

    fn sweep_idle(&self, idle_timeout: Duration) -> Vec<GroupId> {
        let mut expired = Vec::new();

        // 在分片锁内判定并终止，清理与命令之间不会出现半注销的会话
        // 已停止的残留实例同样按空闲阈值判定
        self.sessions.retain(|group, session| {
            let keep = !session.expire_if_idle(idle_timeout);
            if !keep {
                expired.push(group.clone());
            }
            keep
        });

        for group in &expired {
            self.events.release(group);
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Idle sessions swept");
        }
        expired
    }

    fn is_active(&self, group: &GroupId) -> bool {
        self.sessions.contains_key(group)
    }

    fn list_all(&self) -> Vec<SessionSnapshot> {
        let sessions: Vec<Arc<LiveSession>> =
            self.sessions.iter().map(|e| e.value().clone()).collect();
        let mut snapshots: Vec<SessionSnapshot> = sessions.iter().map(|s| s.snapshot()).collect();
        snapshots.sort_by(|a, b| a.group.cmp(&b.group));
        snapshots
    }
}
