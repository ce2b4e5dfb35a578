//! Live Session - 单个分组的计时状态机
//!
//! 每个会话一个互斥域：命令与计时器通知在同一把锁下串行处理

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::application::ports::{SessionError, SessionSnapshot};
use crate::domain::pomodoro::{
    Completion, EndReason, GroupId, ParticipantId, Phase, PomodoroCycle, RunState, SessionEvent,
    Settings, SettingsPatch, StatsSnapshot,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::timer::{Countdown, SignalKind, TimerSignal};

/// 会话运行参数
#[derive(Debug, Clone)]
pub struct LiveSessionConfig {
    /// Tick 通知间隔
    pub tick_interval: Duration,
    /// 单个阶段的时长上限（秒），用于修改设置时重新校验
    pub max_interval_secs: u64,
}

impl Default for LiveSessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            max_interval_secs: crate::domain::pomodoro::DEFAULT_MAX_INTERVAL_SECS,
        }
    }
}

/// 会话因自身计时结束后的回调，在会话锁之外调用
pub type EndHook = Arc<dyn Fn(&Arc<LiveSession>) + Send + Sync>;

/// 存活会话
///
/// 复合状态 = 逻辑阶段（Work/ShortBreak/LongBreak）× 运行状态（Running/Paused/Stopped）
pub struct LiveSession {
    id: Uuid,
    group: GroupId,
    controller: ParticipantId,
    created_at: DateTime<Utc>,
    config: LiveSessionConfig,
    signals: mpsc::UnboundedSender<TimerSignal>,
    events: Arc<EventPublisher>,
    on_end: Option<EndHook>,
    state: Mutex<SessionState>,
}

struct SessionState {
    cycle: PomodoroCycle,
    timer: Countdown,
    run_state: RunState,
    participants: BTreeSet<ParticipantId>,
    last_activity: Instant,
    last_activity_at: DateTime<Utc>,
}

impl SessionState {
    fn touch(&mut self) {
        self.last_activity = Instant::now();
        self.last_activity_at = Utc::now();
    }
}

impl LiveSession {
    /// 创建会话并立即进入 Work/Running
    ///
    /// 必须在 tokio 运行时内调用
    pub fn start(
        group: GroupId,
        controller: ParticipantId,
        settings: Settings,
        config: LiveSessionConfig,
        events: Arc<EventPublisher>,
    ) -> Result<Arc<Self>, SessionError> {
        Self::start_with_end_hook(group, controller, settings, config, events, None)
    }

    /// 同 [`LiveSession::start`]，会话在计时器通知中结束时调用 `on_end`
    pub fn start_with_end_hook(
        group: GroupId,
        controller: ParticipantId,
        settings: Settings,
        config: LiveSessionConfig,
        events: Arc<EventPublisher>,
        on_end: Option<EndHook>,
    ) -> Result<Arc<Self>, SessionError> {
        let (signals, signal_rx) = mpsc::unbounded_channel();

        let cycle = PomodoroCycle::new(settings);
        let mut timer = Countdown::new(config.tick_interval, signals.clone());
        timer
            .start(Duration::from_secs(cycle.duration_of(Phase::Work)))
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        let mut participants = BTreeSet::new();
        participants.insert(controller.clone());

        let now = Utc::now();
        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            group,
            controller,
            created_at: now,
            config,
            signals,
            events,
            on_end,
            state: Mutex::new(SessionState {
                cycle,
                timer,
                run_state: RunState::Running,
                participants,
                last_activity: Instant::now(),
                last_activity_at: now,
            }),
        });

        tokio::spawn(drive(Arc::downgrade(&session), signal_rx));

        {
            let state = session.state.lock();
            tracing::info!(
                session_id = %session.id,
                group = %session.group,
                controller = %session.controller,
                kind = state.cycle.settings().kind().as_str(),
                work_secs = state.cycle.settings().work_secs(),
                cycles = state.cycle.settings().cycles(),
                "Session started"
            );
            session.publish_phase_started(&state);
        }

        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    pub fn controller(&self) -> &ParticipantId {
        &self.controller
    }

    pub fn run_state(&self) -> RunState {
        self.state.lock().run_state
    }

    /// 锁定的会话只允许控制者修改
    pub fn authorize(&self, actor: &ParticipantId) -> Result<(), SessionError> {
        let state = self.state.lock();
        self.check_actor(&state, actor)
    }

    pub fn pause(&self, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock();
        self.check_actor(&state, actor)?;
        if state.run_state != RunState::Running {
            return Err(self.invalid(&state, "pause"));
        }

        let remaining = state
            .timer
            .pause()
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        state.run_state = RunState::Paused;
        state.touch();

        let phase = state.cycle.phase();
        tracing::info!(group = %self.group, phase = %phase, remaining_secs = ceil_secs(remaining), "Session paused");
        self.events.publish(SessionEvent::SessionPaused {
            group: self.group.clone(),
            phase,
            remaining_secs: ceil_secs(remaining),
        });
        Ok(self.snapshot_of(&state))
    }

    pub fn resume(&self, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock();
        self.check_actor(&state, actor)?;
        if state.run_state != RunState::Paused {
            return Err(self.invalid(&state, "resume"));
        }

        if let Err(e) = state.timer.resume() {
            tracing::error!(group = %self.group, error = %e, "Failed to resume timer");
            self.fail(&mut state);
            return Err(SessionError::Internal(e.to_string()));
        }
        state.run_state = RunState::Running;
        state.touch();

        let phase = state.cycle.phase();
        let remaining_secs = ceil_secs(state.timer.remaining());
        tracing::info!(group = %self.group, phase = %phase, remaining_secs, "Session resumed");
        self.events.publish(SessionEvent::SessionResumed {
            group: self.group.clone(),
            phase,
            remaining_secs,
        });
        Ok(self.snapshot_of(&state))
    }

    /// 跳过当前阶段，按自然结束的规则进入下一阶段
    pub fn skip(&self, actor: &ParticipantId) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock();
        self.check_actor(&state, actor)?;
        if state.run_state == RunState::Stopped {
            return Err(self.invalid(&state, "skip"));
        }

        state
            .timer
            .cancel()
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        state.touch();
        tracing::info!(group = %self.group, phase = %state.cycle.phase(), "Phase skipped");

        self.advance(&mut state, Completion::Skipped)?;
        Ok(self.snapshot_of(&state))
    }

    /// 停止会话（重复调用返回相同的最终统计）
    pub fn stop(&self, actor: &ParticipantId) -> Result<StatsSnapshot, SessionError> {
        let mut state = self.state.lock();
        if state.run_state == RunState::Stopped {
            return Ok(state.cycle.stats().snapshot());
        }
        self.check_actor(&state, actor)?;
        state.touch();
        Ok(self.finish(&mut state, EndReason::Stopped))
    }

    /// 不做权限检查的终止（替换、注销时使用）
    pub fn terminate(&self, reason: EndReason) -> StatsSnapshot {
        let mut state = self.state.lock();
        if state.run_state == RunState::Stopped {
            return state.cycle.stats().snapshot();
        }
        self.finish(&mut state, reason)
    }

    /// 修改设置：必须先暂停，当前阶段保留剩余时间，新时长从下一阶段生效
    pub fn edit(
        &self,
        actor: &ParticipantId,
        patch: SettingsPatch,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock();
        self.check_actor(&state, actor)?;
        if state.run_state != RunState::Paused {
            return Err(SessionError::invalid_state(
                &self.group,
                format!("settings can only be changed while paused (state: {})", state.run_state.as_str()),
            ));
        }

        let settings = state
            .cycle
            .settings()
            .apply(patch, self.config.max_interval_secs)?;
        state.cycle.reconfigure(settings);
        state.touch();

        tracing::info!(group = %self.group, "Session settings updated");
        Ok(self.snapshot_of(&state))
    }

    pub fn join(&self, participant: ParticipantId) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock();
        if state.run_state == RunState::Stopped {
            return Err(self.invalid(&state, "join"));
        }
        if state.participants.insert(participant.clone()) {
            tracing::debug!(group = %self.group, participant = %participant, "Participant joined");
        }
        state.touch();
        Ok(self.snapshot_of(&state))
    }

    pub fn leave(&self, participant: &ParticipantId) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock();
        if state.run_state == RunState::Stopped {
            return Err(self.invalid(&state, "leave"));
        }
        if state.participants.remove(participant) {
            tracing::debug!(group = %self.group, participant = %participant, "Participant left");
        }
        state.touch();
        Ok(self.snapshot_of(&state))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        self.snapshot_of(&state)
    }

    /// 运行中的会话永远不算空闲
    pub fn is_idle(&self, threshold: Duration) -> bool {
        let state = self.state.lock();
        Self::idle(&state, threshold)
    }

    /// 空闲则终止并发出 SessionExpiredIdle，返回是否已终止
    pub fn expire_if_idle(&self, threshold: Duration) -> bool {
        let mut state = self.state.lock();
        if !Self::idle(&state, threshold) {
            return false;
        }

        if let Err(e) = state.timer.cancel() {
            tracing::debug!(group = %self.group, error = %e, "Timer already terminal on idle expiry");
        }
        state.run_state = RunState::Stopped;

        tracing::info!(group = %self.group, "Session expired (idle)");
        self.events.publish(SessionEvent::SessionExpiredIdle {
            group: self.group.clone(),
        });
        true
    }

    /// 处理计时器通知（由驱动任务调用），返回会话是否因此结束
    fn on_timer_signal(&self, signal: TimerSignal) -> bool {
        let mut state = self.state.lock();
        match state.timer.accept(signal) {
            None => {
                tracing::trace!(group = %self.group, epoch = signal.epoch, "Stale timer signal dropped");
                false
            }
            Some(SignalKind::Tick { remaining }) => {
                self.events.publish(SessionEvent::Tick {
                    group: self.group.clone(),
                    phase: state.cycle.phase(),
                    remaining_secs: ceil_secs(remaining),
                });
                false
            }
            Some(SignalKind::Expired) => {
                tracing::info!(group = %self.group, phase = %state.cycle.phase(), "Phase completed");
                // 失败时 advance 已将会话置为 Stopped 并记录日志
                let _ = self.advance(&mut state, Completion::Natural);
                state.run_state == RunState::Stopped
            }
        }
    }

    fn idle(state: &SessionState, threshold: Duration) -> bool {
        state.run_state != RunState::Running && state.last_activity.elapsed() > threshold
    }

    fn check_actor(&self, state: &SessionState, actor: &ParticipantId) -> Result<(), SessionError> {
        if state.cycle.settings().locked() && actor != &self.controller {
            return Err(SessionError::Locked(self.group.clone()));
        }
        Ok(())
    }

    fn invalid(&self, state: &SessionState, operation: &str) -> SessionError {
        let current = match state.run_state {
            RunState::Stopped => "stopped".to_string(),
            run_state => format!("{}/{}", state.cycle.phase(), run_state.as_str()),
        };
        SessionError::invalid_state(&self.group, format!("cannot {} while {}", operation, current))
    }

    /// 结束当前阶段并以新计时器启动下一阶段（单次倒计时则结束会话）
    fn advance(&self, state: &mut SessionState, completion: Completion) -> Result<(), SessionError> {
        if state.cycle.ends_after_phase() {
            self.finish(state, EndReason::Completed);
            return Ok(());
        }

        let elapsed_secs = state.timer.elapsed().as_secs();
        let change = state
            .cycle
            .complete_phase(completion, elapsed_secs, state.participants.iter());

        let mut timer = Countdown::new(self.config.tick_interval, self.signals.clone());
        if let Err(e) = timer.start(Duration::from_secs(change.duration_secs)) {
            tracing::error!(
                group = %self.group,
                phase = %change.next,
                error = %e,
                "Failed to schedule next phase"
            );
            self.fail(state);
            return Err(SessionError::Internal(e.to_string()));
        }

        state.timer = timer;
        state.run_state = RunState::Running;

        tracing::info!(
            group = %self.group,
            from = %change.previous,
            to = %change.next,
            duration_secs = change.duration_secs,
            credited_secs = change.credited_secs,
            cycle_index = change.cycle_index,
            "Phase started"
        );
        self.publish_phase_started(state);
        Ok(())
    }

    /// 调度故障：视为计时器被取消，进入 Stopped
    fn fail(&self, state: &mut SessionState) {
        self.finish(state, EndReason::InternalError);
    }

    fn finish(&self, state: &mut SessionState, reason: EndReason) -> StatsSnapshot {
        if let Err(e) = state.timer.cancel() {
            tracing::debug!(group = %self.group, error = %e, "Timer already terminal on stop");
        }
        state.run_state = RunState::Stopped;

        let final_stats = state.cycle.stats().snapshot();
        tracing::info!(
            session_id = %self.id,
            group = %self.group,
            reason = ?reason,
            completed_work = final_stats.completed_work,
            focused_secs = final_stats.focused_secs,
            "Session ended"
        );
        self.events.publish(SessionEvent::SessionEnded {
            group: self.group.clone(),
            reason,
            final_stats: final_stats.clone(),
        });
        final_stats
    }

    fn publish_phase_started(&self, state: &SessionState) {
        let settings = state.cycle.settings();
        let phase = state.cycle.phase();
        self.events.publish(SessionEvent::PhaseStarted {
            group: self.group.clone(),
            phase,
            duration_secs: state.cycle.duration_of(phase),
            cycle_index: state.cycle.cycle_index(),
            auto_mute: settings.auto_mute(),
            notify: settings.notify(),
        });
    }

    fn snapshot_of(&self, state: &SessionState) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            group: self.group.clone(),
            controller: self.controller.clone(),
            phase: state.cycle.phase(),
            run_state: state.run_state,
            remaining_secs: ceil_secs(state.timer.remaining()),
            phase_duration_secs: state.timer.total().as_secs(),
            cycle_index: state.cycle.cycle_index(),
            settings: state.cycle.settings().clone(),
            stats: state.cycle.stats().snapshot(),
            participants: state.participants.iter().cloned().collect(),
            created_at: self.created_at,
            last_activity: state.last_activity_at,
        }
    }
}

/// 驱动任务：把计时器通知送入会话的互斥域
async fn drive(session: Weak<LiveSession>, mut signals: mpsc::UnboundedReceiver<TimerSignal>) {
    while let Some(signal) = signals.recv().await {
        let Some(live) = session.upgrade() else {
            break;
        };
        if live.on_timer_signal(signal) {
            if let Some(on_end) = &live.on_end {
                on_end(&live);
            }
            break;
        }
    }
    tracing::trace!("Session driver stopped");
}

/// 向上取整到秒（用于显示）
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
