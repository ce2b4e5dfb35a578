//! Pomodoro Hub - 分组番茄钟会话服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Pomodoro Context: 设置校验、阶段循环、统计、会话事件
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SessionManager, SessionObserver）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - Timer: 可取消的倒计时
//! - Memory: LiveSession 状态机与会话注册表
//! - Worker: IdleSweeper 空闲清理
//! - Events: 广播推送与观察者扇出
//! - Adapters: Tracing / Webhook 观察者
//! - HTTP: RESTful API + WebSocket

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
