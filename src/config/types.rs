//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::domain::pomodoro::{SettingsDraft, SkipCredit, DEFAULT_MAX_INTERVAL_SECS};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 番茄钟默认设置
    #[serde(default)]
    pub pomodoro: PomodoroConfig,

    /// 会话运行配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 外部通知配置
    #[serde(default)]
    pub notify: NotifyConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 番茄钟默认设置（创建请求未提供的字段使用这里的值）
#[derive(Debug, Clone, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_work_secs")]
    pub work_secs: u64,

    #[serde(default = "default_short_break_secs")]
    pub short_break_secs: u64,

    /// 未设置时长休息使用短休息时长
    #[serde(default = "default_long_break_secs")]
    pub long_break_secs: Option<u64>,

    #[serde(default = "default_cycles")]
    pub cycles: u32,

    /// 单个阶段的时长上限（秒）
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,

    /// 跳过专注阶段的统计策略
    #[serde(default)]
    pub skip_credit: SkipCredit,
}

fn default_work_secs() -> u64 {
    25 * 60
}

fn default_short_break_secs() -> u64 {
    5 * 60
}

fn default_long_break_secs() -> Option<u64> {
    Some(20 * 60)
}

fn default_cycles() -> u32 {
    4
}

fn default_max_interval_secs() -> u64 {
    DEFAULT_MAX_INTERVAL_SECS
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            cycles: default_cycles(),
            max_interval_secs: default_max_interval_secs(),
            skip_credit: SkipCredit::default(),
        }
    }
}

impl PomodoroConfig {
    /// 转换为默认设置草稿
    pub fn settings_draft(&self) -> SettingsDraft {
        SettingsDraft {
            work_secs: self.work_secs,
            short_break_secs: self.short_break_secs,
            long_break_secs: self.long_break_secs,
            cycles: self.cycles,
            skip_credit: self.skip_credit,
            ..Default::default()
        }
    }
}

/// 会话运行配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Tick 间隔（毫秒）
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// 非运行状态超过该时长即清理（秒）
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// 清理扫描间隔（秒）
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// 是否启用空闲清理
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_idle_timeout_secs() -> u64 {
    30 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_sweep_enabled() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 外部通知配置
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URL，未设置时不启用
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

fn default_notify_timeout() -> u64 {
    10
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_notify_timeout(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.pomodoro.work_secs, 1500);
        assert_eq!(config.pomodoro.long_break_secs, Some(1200));
        assert_eq!(config.session.tick_interval(), Duration::from_secs(1));
        assert!(config.notify.webhook_url.is_none());
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5070");
    }

    #[test]
    fn test_settings_draft_from_defaults() {
        let draft = PomodoroConfig::default().settings_draft();
        let settings = draft.validate(DEFAULT_MAX_INTERVAL_SECS).unwrap();
        assert_eq!(settings.work_secs(), 1500);
        assert_eq!(settings.short_break_secs(), 300);
        assert_eq!(settings.long_break_secs(), 1200);
        assert_eq!(settings.cycles(), 4);
        assert!(!settings.locked());
    }
}
