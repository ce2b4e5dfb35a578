//! Idle Sweeper - Background Session Cleanup

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::ports::SessionManagerPort;

/// Sweeper 配置
#[derive(Debug, Clone)]
pub struct IdleSweeperConfig {
    /// 扫描间隔
    pub interval: Duration,
    /// 非运行状态超过该时长即清理
    pub idle_timeout: Duration,
}

impl Default for IdleSweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// 空闲会话清理器
///
/// 只做周期调度，判定与移除由 SessionManager 原子完成
pub struct IdleSweeper {
    config: IdleSweeperConfig,
    session_manager: Arc<dyn SessionManagerPort>,
}

impl IdleSweeper {
    pub fn new(config: IdleSweeperConfig, session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self {
            config,
            session_manager,
        }
    }

    /// 执行一次清理
    pub fn sweep_once(&self) -> usize {
        let expired = self.session_manager.sweep_idle(self.config.idle_timeout);
        for group in &expired {
            tracing::debug!(group = %group, "Idle session expired");
        }
        expired.len()
    }

    /// 启动清理循环，直到 shutdown 变为 true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            idle_timeout_secs = self.config.idle_timeout.as_secs(),
            "IdleSweeper started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即完成，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("IdleSweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{CreateMode, CreateSession};
    use crate::domain::pomodoro::{GroupId, ParticipantId, SettingsDraft};
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::{InMemorySessionManager, LiveSessionConfig};

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_paused_session() {
        let manager =
            InMemorySessionManager::new(LiveSessionConfig::default(), EventPublisher::new().arc())
                .arc();
        let group = GroupId::new("g1").unwrap();
        let owner = ParticipantId::new("owner").unwrap();
        manager
            .get_or_create(CreateSession {
                group: group.clone(),
                controller: owner.clone(),
                settings: SettingsDraft::default().validate(14_400).unwrap(),
                mode: CreateMode::Reject,
            })
            .unwrap();
        manager.pause(&group, &owner).unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = IdleSweeper::new(
            IdleSweeperConfig {
                interval: Duration::from_secs(10),
                idle_timeout: Duration::from_secs(30),
            },
            manager.clone(),
        );
        let handle = tokio::spawn(sweeper.run(shutdown_rx));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(manager.is_active(&group));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!manager.is_active(&group));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_once_with_no_sessions() {
        let manager =
            InMemorySessionManager::new(LiveSessionConfig::default(), EventPublisher::new().arc());
        let sweeper = IdleSweeper::new(IdleSweeperConfig::default(), Arc::new(manager));
        assert_eq!(sweeper.sweep_once(), 0);
    }
}
