//! Tracing Observer - 把生命周期事件写入日志

use async_trait::async_trait;

use crate::application::ports::{ObserverError, SessionObserverPort};
use crate::domain::pomodoro::SessionEvent;

/// 日志观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[async_trait]
impl SessionObserverPort for TracingObserver {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn on_event(&self, event: &SessionEvent) -> Result<(), ObserverError> {
        match event {
            SessionEvent::PhaseStarted {
                group,
                phase,
                duration_secs,
                auto_mute,
                notify,
                ..
            } => {
                tracing::info!(
                    group = %group,
                    phase = %phase,
                    duration_secs,
                    auto_mute,
                    notify,
                    "[event] phase started"
                );
            }
            SessionEvent::SessionEnded {
                group,
                reason,
                final_stats,
            } => {
                tracing::info!(
                    group = %group,
                    reason = ?reason,
                    completed_work = final_stats.completed_work,
                    focused_secs = final_stats.focused_secs,
                    "[event] session ended"
                );
            }
            other => {
                tracing::debug!(group = %other.group(), event = other.name(), "[event]");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pomodoro::{GroupId, Phase};

    #[tokio::test]
    async fn test_tracing_observer_ignores_ticks() {
        let observer = TracingObserver;
        let tick = SessionEvent::Tick {
            group: GroupId::new("g").unwrap(),
            phase: Phase::Work,
            remaining_secs: 10,
        };
        assert!(!observer.accepts(&tick));

        let expired = SessionEvent::SessionExpiredIdle {
            group: GroupId::new("g").unwrap(),
        };
        assert!(observer.accepts(&expired));
        assert!(observer.on_event(&expired).await.is_ok());
    }
}
