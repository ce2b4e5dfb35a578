//! Domain Layer - 领域层
//!
//! Pomodoro Context: 设置、阶段循环、统计与会话事件（不依赖时钟与运行时）

pub mod pomodoro;
