//! Countdown Timer Implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// 进程内唯一的计时器实例 ID
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// 计时器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// 终态，已触发完成通知
    Expired,
    /// 终态，所有待发通知失效
    Cancelled,
}

/// 计时器错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Cannot {operation} timer in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: TimerState,
    },

    #[error("No async runtime available to schedule timer")]
    Unscheduled,
}

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Tick { remaining: Duration },
    Expired,
}

/// 倒计时任务发出的通知
///
/// 只有 `timer_id` 和 `epoch` 都与当前计时器一致的通知才会被接受
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    pub timer_id: u64,
    pub epoch: u64,
    pub kind: SignalKind,
}

/// 倒计时
///
/// 不变量:
/// - remaining <= total
/// - 只有 Running 时 remaining 才会减少
/// - 每次 arm/disarm 都会递增 epoch，旧通知一律被丢弃
pub struct Countdown {
    id: u64,
    epoch: u64,
    state: TimerState,
    total: Duration,
    /// 最近一次 resume/pause 时冻结的剩余时间
    remaining: Duration,
    resumed_at: Option<Instant>,
    tick_interval: Duration,
    signals: mpsc::UnboundedSender<TimerSignal>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(tick_interval: Duration, signals: mpsc::UnboundedSender<TimerSignal>) -> Self {
        Self {
            id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
            state: TimerState::Idle,
            total: Duration::ZERO,
            remaining: Duration::ZERO,
            resumed_at: None,
            tick_interval,
            signals,
            task: None,
        }
    }

    /// 启动倒计时（仅 Idle 或 Cancelled 时允许）
    pub fn start(&mut self, duration: Duration) -> Result<(), TimerError> {
        if !matches!(self.state, TimerState::Idle | TimerState::Cancelled) {
            return Err(self.invalid("start"));
        }
        self.arm(duration)?;
        self.total = duration;
        self.state = TimerState::Running;
        Ok(())
    }

    /// 暂停并冻结剩余时间
    pub fn pause(&mut self) -> Result<Duration, TimerError> {
        if self.state != TimerState::Running {
            return Err(self.invalid("pause"));
        }
        self.remaining = self.remaining();
        self.disarm();
        self.state = TimerState::Paused;
        Ok(self.remaining)
    }

    /// 以冻结的剩余时间重新计时
    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::Paused {
            return Err(self.invalid("resume"));
        }
        self.arm(self.remaining)?;
        self.state = TimerState::Running;
        Ok(())
    }

    /// 取消（重复取消是空操作）
    pub fn cancel(&mut self) -> Result<(), TimerError> {
        match self.state {
            TimerState::Cancelled => Ok(()),
            TimerState::Expired => Err(self.invalid("cancel")),
            TimerState::Idle | TimerState::Running | TimerState::Paused => {
                self.remaining = self.remaining();
                self.disarm();
                self.state = TimerState::Cancelled;
                Ok(())
            }
        }
    }

    /// 处理倒计时任务发来的通知
    ///
    /// 过期或已失效的通知返回 None；Expired 通知会把计时器转为终态
    pub fn accept(&mut self, signal: TimerSignal) -> Option<SignalKind> {
        if signal.timer_id != self.id
            || signal.epoch != self.epoch
            || self.state != TimerState::Running
        {
            return None;
        }
        if signal.kind == SignalKind::Expired {
            self.remaining = Duration::ZERO;
            self.resumed_at = None;
            self.task = None;
            self.state = TimerState::Expired;
        }
        Some(signal.kind)
    }

    /// 当前剩余时间（Running 时实时计算）
    pub fn remaining(&self) -> Duration {
        match (self.state, self.resumed_at) {
            (TimerState::Running, Some(resumed_at)) => {
                self.remaining.saturating_sub(resumed_at.elapsed())
            }
            _ => self.remaining,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.total.saturating_sub(self.remaining())
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    fn invalid(&self, operation: &'static str) -> TimerError {
        TimerError::InvalidState {
            operation,
            state: self.state,
        }
    }

    /// 调度失败时不修改任何状态
    fn arm(&mut self, remaining: Duration) -> Result<(), TimerError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| TimerError::Unscheduled)?;

        self.disarm();
        let now = Instant::now();
        self.remaining = remaining;
        self.resumed_at = Some(now);

        let task = run_countdown(
            self.id,
            self.epoch,
            now + remaining,
            self.tick_interval,
            self.signals.clone(),
        );
        self.task = Some(handle.spawn(task));
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.resumed_at = None;
        self.epoch += 1;
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Countdown")
            .field("id", &self.id)
            .field("epoch", &self.epoch)
            .field("state", &self.state)
            .field("total", &self.total)
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// 后台倒计时：按 tick 间隔发送心跳，到期发送 Expired
async fn run_countdown(
    timer_id: u64,
    epoch: u64,
    deadline: Instant,
    tick_interval: Duration,
    signals: mpsc::UnboundedSender<TimerSignal>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = tokio::time::sleep_until(deadline) => {
                let signal = TimerSignal { timer_id, epoch, kind: SignalKind::Expired };
                if signals.send(signal).is_err() {
                    tracing::error!(timer_id, epoch, "Timer completion could not be delivered");
                }
                break;
            }
            _ = ticker.tick() => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    continue;
                }
                let signal = TimerSignal { timer_id, epoch, kind: SignalKind::Tick { remaining } };
                if signals.send(signal).is_err() {
                    tracing::debug!(timer_id, epoch, "Timer receiver dropped, stopping countdown");
                    break;
                }
            }
        }
    }
}
