//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `task_pool` - 有界任务池
//! - 在途条目不超过 `limit`
//! - 每个条目恰好启动一次、恰好产生一个结果
//! - 失败（包括 panic）被隔离，不影响兄弟条目
//! - 支持停止信号：不再启动新条目，在途条目照常完成
//!
//! ### `progress` - 批次进度
//! - `ProgressState` 快照，`completed` 单调不减
//!
//! ### `coordinator` - 批量生成协调器
//! - 单条超时、进度回调、批次报告
//!
//! ### `batch_processor` - 应用流水线
//! - 管理应用生命周期（初始化、运行）
//! - 入库 → 问题批次 → 答案批次 → 导出
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (整条流水线)
//!     ↓
//! coordinator (一个批次：Vec<WorkItem>)
//!     ↓
//! task_pool (并发调度)
//!     ↓
//! workflow::{QuestionFlow, DatasetFlow} (处理单个条目)
//!     ↓
//! services (能力层：question / answer / export)
//!     ↓
//! infrastructure / clients (存储、LLM)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：task_pool 管并发，coordinator 管进度和汇总
//! 2. **资源隔离**：只有编排层持有 LLM 客户端和存储
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod coordinator;
pub mod progress;
pub mod task_pool;

// 重新导出主要类型
pub use batch_processor::{App, RunStats};
pub use coordinator::{run_batch, BatchCoordinator, BatchReport};
pub use progress::{ProgressState, ProgressTracker};
pub use task_pool::{run_pool, StopSignal, TaskPool, WorkError, WorkItem, WorkResult};
