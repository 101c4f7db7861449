//! 有界任务池
//!
//! 维护一个最多 `limit` 个成员的在途集合：集合未满且还有未提交条目时立即启动下一个；
//! 集合已满时等待任意一个完成，收割结果后马上补位。每个条目恰好启动一次、
//! 恰好产生一个结果；单个条目失败（包括 panic）不影响其他条目。
//!
//! 结果按完成顺序返回，需要输入顺序的调用方请按 `id` 重新排列。

use futures::future::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 一个批处理条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem<P> {
    pub id: String,
    pub payload: P,
}

impl<P> WorkItem<P> {
    pub fn new(id: impl Into<String>, payload: P) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

impl WorkItem<()> {
    /// 只有 ID 的条目
    pub fn id_only(id: impl Into<String>) -> Self {
        Self::new(id, ())
    }
}

/// 单个条目的失败原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    #[error("{0}")]
    Failed(String),
    #[error("超时 ({0:?})")]
    TimedOut(Duration),
    #[error("任务 panic: {0}")]
    Panicked(String),
    /// 收到停止信号，条目未启动
    #[error("已取消")]
    Cancelled,
}

impl From<anyhow::Error> for WorkError {
    fn from(err: anyhow::Error) -> Self {
        WorkError::Failed(format!("{:#}", err))
    }
}

impl From<String> for WorkError {
    fn from(msg: String) -> Self {
        WorkError::Failed(msg)
    }
}

impl From<&str> for WorkError {
    fn from(msg: &str) -> Self {
        WorkError::Failed(msg.to_string())
    }
}

/// 单个条目的结果
#[derive(Debug, Clone, PartialEq)]
pub enum WorkResult<T> {
    Success { id: String, data: T },
    Failure { id: String, error: WorkError },
}

impl<T> WorkResult<T> {
    pub fn id(&self) -> &str {
        match self {
            WorkResult::Success { id, .. } | WorkResult::Failure { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            WorkResult::Success { data, .. } => Some(data),
            WorkResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&WorkError> {
        match self {
            WorkResult::Success { .. } => None,
            WorkResult::Failure { error, .. } => Some(error),
        }
    }
}

/// 停止信号
///
/// 触发后任务池不再启动新条目，在途条目照常执行完毕。
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 有界任务池
#[derive(Debug, Clone)]
pub struct TaskPool {
    limit: usize,
    stop: StopSignal,
}

impl TaskPool {
    /// `limit` 为 0 时按 1 处理
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            stop: StopSignal::new(),
        }
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 运行全部条目，每个结果产生时回调 `on_result`
    ///
    /// 返回的结果数量总是等于条目数量。
    pub async fn run_with<P, T, E, W, Fut, C>(
        &self,
        items: Vec<WorkItem<P>>,
        worker: W,
        mut on_result: C,
    ) -> Vec<WorkResult<T>>
    where
        W: Fn(WorkItem<P>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<WorkError>,
        C: FnMut(&WorkResult<T>),
    {
        let total = items.len();
        let mut pending = items.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut results = Vec::with_capacity(total);

        loop {
            while in_flight.len() < self.limit && !self.stop.is_stopped() {
                let Some(item) = pending.next() else { break };
                let id = item.id.clone();
                in_flight.push(launch(id, worker(item)));
            }

            match in_flight.next().await {
                Some(result) => {
                    on_result(&result);
                    results.push(result);
                }
                None => break,
            }
        }

        // 停止后未启动的条目
        for item in pending {
            let result = WorkResult::Failure {
                id: item.id,
                error: WorkError::Cancelled,
            };
            on_result(&result);
            results.push(result);
        }

        debug_assert_eq!(results.len(), total);
        results
    }

    pub async fn run<P, T, E, W, Fut>(
        &self,
        items: Vec<WorkItem<P>>,
        worker: W,
    ) -> Vec<WorkResult<T>>
    where
        W: Fn(WorkItem<P>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<WorkError>,
    {
        self.run_with(items, worker, |_| {}).await
    }
}

/// 以 `limit` 为并发上限运行全部条目
pub async fn run_pool<P, T, E, W, Fut>(
    items: Vec<WorkItem<P>>,
    worker: W,
    limit: usize,
) -> Vec<WorkResult<T>>
where
    W: Fn(WorkItem<P>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<WorkError>,
{
    TaskPool::new(limit).run(items, worker).await
}

async fn launch<T, E, Fut>(id: String, fut: Fut) -> WorkResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<WorkError>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(data)) => WorkResult::Success { id, data },
        Ok(Err(e)) => WorkResult::Failure {
            id,
            error: e.into(),
        },
        Err(panic) => WorkResult::Failure {
            id,
            error: WorkError::Panicked(panic_message(panic)),
        },
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知 panic".to_string()
    }
}
