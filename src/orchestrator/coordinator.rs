//! 批量生成协调器 - 编排层
//!
//! ## 职责
//!
//! 在有界任务池之上：
//! 1. 为每个条目套上超时
//! 2. 每收割一个结果更新一次进度，并通知调用方
//! 3. 汇总成功 / 失败，生成批次报告
//!
//! 单个条目的错误只出现在报告里，协调器本身从不因此返回错误，也不自动重试。

use crate::config::Config;
use crate::orchestrator::progress::{ProgressState, ProgressTracker};
use crate::orchestrator::task_pool::{StopSignal, TaskPool, WorkError, WorkItem, WorkResult};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// 批次报告
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    /// 按完成顺序排列
    pub results: Vec<WorkResult<T>>,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T> BatchReport<T> {
    fn from_results(results: Vec<WorkResult<T>>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let failed = results.len() - succeeded;
        Self {
            results,
            succeeded,
            failed,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// 失败条目的 ID，可用于单独重试
    pub fn failed_ids(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.id().to_string())
            .collect()
    }

    pub fn succeeded_ids(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.id().to_string())
            .collect()
    }

    /// 成功条目的数据
    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.results.iter().filter_map(|r| r.data())
    }

    pub fn into_successes(self) -> impl Iterator<Item = T> {
        self.results.into_iter().filter_map(|r| match r {
            WorkResult::Success { data, .. } => Some(data),
            WorkResult::Failure { .. } => None,
        })
    }
}

/// 批量生成协调器
pub struct BatchCoordinator {
    label: String,
    limit: usize,
    item_timeout: Option<Duration>,
    stop: StopSignal,
    progress: watch::Sender<ProgressState>,
}

impl BatchCoordinator {
    pub fn new(label: impl Into<String>, limit: usize) -> Self {
        let (progress, _) = watch::channel(ProgressState::default());
        Self {
            label: label.into(),
            limit: limit.max(1),
            item_timeout: None,
            stop: StopSignal::new(),
            progress,
        }
    }

    /// 并发上限与单条超时取自配置
    pub fn from_config(label: impl Into<String>, config: &Config) -> Self {
        Self::new(label, config.concurrency_limit).with_timeout(config.item_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = Some(timeout);
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// 调用方持有的停止信号
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// 订阅进度；每个新批次开始时重置
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.progress.subscribe()
    }

    pub async fn run<P, T, E, F, Fut>(
        &self,
        items: Vec<WorkItem<P>>,
        generate_one: F,
    ) -> BatchReport<T>
    where
        F: Fn(WorkItem<P>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<WorkError>,
    {
        self.run_with_progress(items, generate_one, |_| {}).await
    }

    /// 运行批次，每完成一个条目回调一次 `on_progress`
    pub async fn run_with_progress<P, T, E, F, Fut, C>(
        &self,
        items: Vec<WorkItem<P>>,
        generate_one: F,
        mut on_progress: C,
    ) -> BatchReport<T>
    where
        F: Fn(WorkItem<P>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<WorkError>,
        C: FnMut(ProgressState),
    {
        let total = items.len();
        log_batch_start(&self.label, total, self.limit);

        let mut tracker = ProgressTracker::new(total, &self.progress);
        let pool = TaskPool::new(self.limit).with_stop_signal(self.stop.clone());
        let timeout = self.item_timeout;

        let worker = |item: WorkItem<P>| {
            let fut = generate_one(item);
            async move {
                match timeout {
                    Some(limit) => match tokio::time::timeout(limit, fut).await {
                        Ok(result) => result.map_err(Into::into),
                        Err(_) => Err(WorkError::TimedOut(limit)),
                    },
                    None => fut.await.map_err(Into::into),
                }
            }
        };

        let results = pool
            .run_with(items, worker, |result| {
                if let WorkResult::Failure { id, error } = result {
                    warn!("[{}] ❌ {} 失败: {}", self.label, id, error);
                }
                let state = tracker.record(result.is_success());
                debug!(
                    "[{}] 进度 {}/{} ({}%)",
                    self.label, state.completed, state.total, state.percentage
                );
                on_progress(state);
            })
            .await;

        let report = BatchReport::from_results(results);
        log_batch_complete(&self.label, report.succeeded, report.total());
        report
    }
}

/// 以 `limit` 为并发上限运行一个批次
pub async fn run_batch<P, T, E, F, Fut>(
    items: Vec<WorkItem<P>>,
    generate_one: F,
    limit: usize,
) -> BatchReport<T>
where
    F: Fn(WorkItem<P>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<WorkError>,
{
    BatchCoordinator::new("批量生成", limit)
        .run(items, generate_one)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn ids(n: usize) -> Vec<WorkItem<()>> {
        (1..=n).map(|i| WorkItem::id_only(format!("q-{}", i))).collect()
    }

    #[tokio::test]
    async fn report_counts_partial_failures() {
        let report = run_batch(
            ids(10),
            |item| async move {
                if ["q-2", "q-5", "q-9"].contains(&item.id.as_str()) {
                    anyhow::bail!("模型返回格式错误");
                }
                Ok(item.id.len())
            },
            2,
        )
        .await;

        assert_eq!(report.total(), 10);
        assert_eq!((report.succeeded, report.failed), (7, 3));
        let mut failed = report.failed_ids();
        failed.sort();
        assert_eq!(failed, vec!["q-2", "q-5", "q-9"]);
        assert_eq!(report.succeeded_ids().len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_items_time_out_without_blocking_others() {
        let coordinator = BatchCoordinator::new("超时测试", 2).with_timeout(Duration::from_secs(5));
        let report = coordinator
            .run(ids(4), |item| async move {
                if item.id == "q-1" {
                    sleep(Duration::from_secs(60)).await;
                }
                Ok::<_, anyhow::Error>(())
            })
            .await;

        assert_eq!(report.succeeded, 3);
        let timed_out = report.results.iter().find(|r| r.id() == "q-1").unwrap();
        assert_eq!(
            timed_out.error(),
            Some(&WorkError::TimedOut(Duration::from_secs(5)))
        );
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_finishes_once() {
        let coordinator = BatchCoordinator::new("进度测试", 3);
        let rx = coordinator.subscribe();
        let mut seen = Vec::new();

        coordinator
            .run_with_progress(
                ids(7),
                |item| async move {
                    if item.id.ends_with('3') {
                        Err("失败".to_string())
                    } else {
                        Ok(())
                    }
                },
                |state| seen.push(state),
            )
            .await;

        assert_eq!(seen.len(), 7);
        assert!(seen.windows(2).all(|w| w[0].completed < w[1].completed));
        assert_eq!(seen.iter().filter(|s| s.completed == s.total).count(), 1);
        let last = seen.last().unwrap();
        assert_eq!((last.succeeded, last.failed, last.percentage), (6, 1, 100));
        assert_eq!(*rx.borrow(), *last);
    }

    #[tokio::test]
    async fn stop_signal_drains_in_flight_items() {
        let coordinator = BatchCoordinator::new("停止测试", 1);
        let stop = coordinator.stop_signal();

        let report = coordinator
            .run(ids(4), |item| {
                let stop = stop.clone();
                async move {
                    if item.id == "q-2" {
                        stop.stop();
                    }
                    Ok::<_, String>(())
                }
            })
            .await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed_ids(), vec!["q-3", "q-4"]);
    }

    #[tokio::test]
    async fn empty_batch_reports_nothing() {
        let items = Vec::<WorkItem<()>>::new();
        let report = run_batch(items, |_| async { Ok::<_, String>(()) }, 3).await;
        assert_eq!((report.succeeded, report.failed, report.total()), (0, 0, 0));
    }
}
