//! Worker Layer - Background Task Processing
//!
//! 实现 IdleSweeper，定期清理空闲会话

mod idle_sweeper;

pub use idle_sweeper::{IdleSweeper, IdleSweeperConfig};
