//! Pomodoro Hub - 分组番茄钟会话服务
//!
//! 启动流程: 配置 -> 日志 -> 观察者 -> 会话注册表 -> 空闲清理 -> HTTP

use std::sync::Arc;

use pomodoro_hub::application::{SessionDefaults, SessionManagerPort, SessionObserverPort};
use pomodoro_hub::config::{load_config, print_config, AppConfig};
use pomodoro_hub::infrastructure::adapters::{
    TracingObserver, WebhookObserver, WebhookObserverConfig,
};
use pomodoro_hub::infrastructure::events::EventPublisher;
use pomodoro_hub::infrastructure::http::{AppState, HttpServer, ServerConfig};
use pomodoro_hub::infrastructure::memory::{InMemorySessionManager, LiveSessionConfig};
use pomodoro_hub::infrastructure::worker::{IdleSweeper, IdleSweeperConfig};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    init_tracing(&config);

    tracing::info!("Pomodoro Hub - 分组番茄钟会话服务");
    print_config(&config);

    // 创建观察者
    let mut observers: Vec<Arc<dyn SessionObserverPort>> = Vec::new();
    observers.push(Arc::new(TracingObserver));
    if let Some(url) = &config.notify.webhook_url {
        let webhook = WebhookObserver::new(
            WebhookObserverConfig::new(url.clone()).with_timeout(config.notify.timeout_secs),
        )?;
        observers.push(Arc::new(webhook));
    }

    // 创建事件发布器
    let event_publisher = EventPublisher::with_observers(observers).arc();

    // 创建内存会话注册表
    let session_config = LiveSessionConfig {
        tick_interval: config.session.tick_interval(),
        max_interval_secs: config.pomodoro.max_interval_secs,
    };
    let session_manager =
        InMemorySessionManager::new(session_config, event_publisher.clone()).arc();

    // 启动空闲清理
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = if config.session.sweep_enabled {
        let sweeper = IdleSweeper::new(
            IdleSweeperConfig {
                interval: config.session.sweep_interval(),
                idle_timeout: config.session.idle_timeout(),
            },
            session_manager.clone(),
        );
        Some(tokio::spawn(sweeper.run(shutdown_rx)))
    } else {
        None
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let defaults = SessionDefaults {
        settings: config.pomodoro.settings_draft(),
        max_interval_secs: config.pomodoro.max_interval_secs,
    };
    let state = AppState::new(session_manager.clone(), event_publisher, defaults);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    // 停止清理任务并结束所有会话
    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper_handle {
        let _ = handle.await;
    }
    for snapshot in session_manager.list_all() {
        session_manager.remove(&snapshot.group);
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志（RUST_LOG 优先于配置）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},pomodoro_hub={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
