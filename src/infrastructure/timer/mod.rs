//! Timer Layer - 可取消的倒计时
//!
//! 基于 tokio 定时器的回调式倒计时，通过 epoch 使过期通知失效

mod countdown;

pub use countdown::{Countdown, SignalKind, TimerError, TimerSignal, TimerState};
