//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `POMO_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `POMO_SERVER__PORT=8080`
/// - `POMO_POMODORO__WORK_SECS=3000`
/// - `POMO_SESSION__IDLE_TIMEOUT_SECS=600`
/// - `POMO_NOTIFY__WEBHOOK_URL=http://bot:9000/events`
///
/// # 返回
/// - `Ok(AppConfig)` - 成功加载的配置
/// - `Err(ConfigError)` - 加载失败
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("pomodoro.work_secs", 1500)?
        .set_default("pomodoro.short_break_secs", 300)?
        .set_default("pomodoro.long_break_secs", 1200)?
        .set_default("pomodoro.cycles", 4)?
        .set_default("pomodoro.max_interval_secs", 14400)?
        .set_default("pomodoro.skip_credit", "none")?
        .set_default("session.tick_interval_ms", 1000)?
        .set_default("session.idle_timeout_secs", 1800)?
        .set_default("session.sweep_interval_secs", 60)?
        .set_default("session.sweep_enabled", true)?
        .set_default("notify.timeout_secs", 10)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: POMO_
    // 层级分隔符: __ (双下划线)
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("POMO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证端口范围
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // 验证默认番茄钟设置
    config
        .pomodoro
        .settings_draft()
        .validate(config.pomodoro.max_interval_secs)
        .map_err(|e| ConfigError::ValidationError(format!("Invalid pomodoro defaults: {}", e)))?;

    // 验证会话配置
    if config.session.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Tick interval cannot be 0".to_string(),
        ));
    }
    if config.session.idle_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Idle timeout cannot be 0".to_string(),
        ));
    }
    if config.session.sweep_enabled && config.session.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Sweep interval cannot be 0 when sweep is enabled".to_string(),
        ));
    }

    // 验证 webhook URL
    if let Some(url) = &config.notify.webhook_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "Webhook URL must be http(s): {}",
                url
            )));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!(
        "Pomodoro Defaults: work={}s short_break={}s long_break={:?} cycles={}",
        config.pomodoro.work_secs,
        config.pomodoro.short_break_secs,
        config.pomodoro.long_break_secs,
        config.pomodoro.cycles
    );
    tracing::info!("Max Interval: {}s", config.pomodoro.max_interval_secs);
    tracing::info!("Skip Credit: {:?}", config.pomodoro.skip_credit);
    tracing::info!("Tick Interval: {}ms", config.session.tick_interval_ms);
    tracing::info!("Idle Sweep Enabled: {}", config.session.sweep_enabled);
    if config.session.sweep_enabled {
        tracing::info!("Sweep Interval: {}s", config.session.sweep_interval_secs);
        tracing::info!("Idle Timeout: {}s", config.session.idle_timeout_secs);
    }
    match &config.notify.webhook_url {
        Some(url) => tracing::info!("Webhook: {} (timeout {}s)", url, config.notify.timeout_secs),
        None => tracing::info!("Webhook: disabled"),
    }
    tracing::info!("Log Level: {} (json: {})", config.log.level, config.log.json);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pomodoro::SkipCredit;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_file_overrides_defaults() {
        let file = write_config(
            r#"
[server]
port = 8080

[pomodoro]
work_secs = 3000
skip_credit = "elapsed"

[session]
sweep_enabled = false
sweep_interval_secs = 0
"#,
        );

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.pomodoro.work_secs, 3000);
        assert_eq!(config.pomodoro.short_break_secs, 300);
        assert_eq!(config.pomodoro.skip_credit, SkipCredit::Elapsed);
        assert!(!config.session.sweep_enabled);
    }

    #[test]
    fn test_load_config_rejects_invalid_defaults() {
        let file = write_config(
            r#"
[pomodoro]
work_secs = 20000
"#,
        );
        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_config_rejects_unknown_skip_credit() {
        let file = write_config(
            r#"
[pomodoro]
skip_credit = "half"
"#,
        );
        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_required_file_is_load_error() {
        let err = load_config_from_path(Some(Path::new("/nonexistent/pomodoro.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_session_values() {
        let mut config = AppConfig::default();
        config.session.tick_interval_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.session.idle_timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.session.sweep_interval_secs = 0;
        assert!(validate_config(&config).is_err());
        config.session.sweep_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_bad_webhook_url() {
        let mut config = AppConfig::default();
        config.notify.webhook_url = Some("ftp://bot".to_string());
        assert!(validate_config(&config).is_err());
    }
}
