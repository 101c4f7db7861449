//! 批次进度
//!
//! 进度只在一个地方修改：每收割一个结果调用一次 `ProgressTracker::record`。
//! 外部通过回调或 `watch` 订阅读取快照。

use serde::Serialize;
use tokio::sync::watch;

/// 进度快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// round(100 * completed / total)，空批次为 0
    pub percentage: u8,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }

    fn percentage_of(completed: usize, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        ((completed as f64 * 100.0 / total as f64).round()) as u8
    }
}

/// 单个批次的进度记录器
///
/// 创建时把共享的进度通道重置为新批次的初始状态。
pub struct ProgressTracker<'a> {
    state: ProgressState,
    sender: &'a watch::Sender<ProgressState>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(total: usize, sender: &'a watch::Sender<ProgressState>) -> Self {
        let state = ProgressState::new(total);
        sender.send_replace(state);
        Self { state, sender }
    }

    pub fn snapshot(&self) -> ProgressState {
        self.state
    }

    /// 记录一个完成的条目并返回新快照
    pub fn record(&mut self, success: bool) -> ProgressState {
        let state = &mut self.state;
        if state.completed < state.total {
            state.completed += 1;
            if success {
                state.succeeded += 1;
            } else {
                state.failed += 1;
            }
            state.percentage = ProgressState::percentage_of(state.completed, state.total);
        }
        self.sender.send_replace(self.state);
        self.state
    }
}
