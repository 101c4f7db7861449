//! # Easy Dataset
//!
//! 把长篇 Markdown 文档切成有界大小的文本块，再驱动 LLM 为每个文本块生成问答训练数据
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构，外加一个纯函数的分块层：
//!
//! ### 分块层（Chunking）
//! - `chunking/` - 标题索引、边界规划、目录构建、文本块组装，不做 I/O
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 记录存储，只暴露创建 / 读取 / 更新 / 列出能力
//! - `clients/` - LLM 客户端，只暴露 generate 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文本块或单个问题
//! - `QuestionService` - 问题抽取与打标签
//! - `AnswerService` - 回答与思维链优化
//! - `Exporter` - 数据集导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个条目"的完整处理流程
//! - `TaskCtx` - 上下文封装（批次 + 序号 + 记录 ID）
//! - `QuestionFlow` / `DatasetFlow` - 读取 → 生成 → 保存
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/task_pool` - 有界任务池
//! - `orchestrator/coordinator` - 批量生成协调器，超时、进度和批次报告
//! - `orchestrator/batch_processor` - 整条流水线
//!
//! ## 模块结构

pub mod chunking;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use chunking::{build_heading_index, build_toc, chunk_document, plan_boundaries, Chunker};
pub use clients::{LlmProvider, OpenAiClient, Reasoned};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{MemoryStore, RecordKind, RecordStore};
pub use models::{Chunk, Dataset, Question, SourceDocument};
pub use orchestrator::{
    run_batch, run_pool, App, BatchCoordinator, BatchReport, WorkItem, WorkResult,
};
pub use workflow::{DatasetFlow, QuestionFlow, TaskCtx};
