//! 数据集生成流程 - 流程层
//!
//! 核心职责：定义"一个问题"生成训练数据的完整流程
//!
//! 流程顺序：
//! 1. 读取问题及其文本块
//! 2. LLM 回答（带思维链）
//! 3. 保存数据集记录，标记问题已回答
//! 4. 有思维链时优化思维链（失败或超时只记录警告）
//!
//! 数据集一旦保存，本流程就返回成功。思维链优化的超时为单条超时的四分之一。

use anyhow::{Context, Result};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::LlmProvider;
use crate::config::Config;
use crate::infrastructure::{RecordKind, RecordStore};
use crate::models::{Chunk, Dataset, Question};
use crate::services::AnswerService;
use crate::workflow::task_ctx::TaskCtx;

/// 数据集生成流程
pub struct DatasetFlow<'a, L, S> {
    answer_service: AnswerService<'a, L>,
    store: &'a S,
    cot_timeout: Duration,
}

impl<'a, L: LlmProvider, S: RecordStore> DatasetFlow<'a, L, S> {
    pub fn new(llm: &'a L, store: &'a S, config: &Config) -> Self {
        Self {
            answer_service: AnswerService::new(llm, config.language),
            store,
            cot_timeout: config.item_timeout() / 4,
        }
    }

    pub fn with_cot_timeout(mut self, timeout: Duration) -> Self {
        self.cot_timeout = timeout;
        self
    }

    /// 为问题生成一条数据集记录，返回其 ID
    pub async fn run(&self, question_id: &str) -> Result<String> {
        let ctx = TaskCtx::for_record("答案生成", question_id);
        self.run_with_ctx(&ctx).await
    }

    pub async fn run_with_ctx(&self, ctx: &TaskCtx) -> Result<String> {
        let question: Question = self
            .store
            .get_as(RecordKind::Question, &ctx.record_id)
            .await
            .with_context(|| format!("{} 读取问题失败", ctx))?;
        let chunk: Chunk = self
            .store
            .get_as(RecordKind::Chunk, &question.chunk_id)
            .await
            .with_context(|| format!("{} 读取文本块 {} 失败", ctx, question.chunk_id))?;

        let reasoned = self
            .answer_service
            .answer(&chunk.content, &question.question)
            .await
            .with_context(|| format!("{} 生成答案失败", ctx))?;

        let dataset = Dataset {
            id: None,
            question_id: ctx.record_id.clone(),
            question: question.question.clone(),
            answer: reasoned.answer,
            cot: reasoned.reasoning,
            model: self.answer_service.model_name().to_string(),
            chunk_name: chunk.name,
            chunk_content: chunk.content,
            question_label: question.label.clone(),
            confirmed: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let dataset_id = self
            .store
            .create_as(RecordKind::Dataset, &dataset)
            .await
            .with_context(|| format!("{} 保存数据集失败", ctx))?;
        self.store
            .update_record(
                RecordKind::Question,
                &ctx.record_id,
                json!({ "answered": true }),
            )
            .await
            .with_context(|| format!("{} 标记问题失败", ctx))?;

        info!("{} ✓ 已生成数据集 {}", ctx, dataset_id);

        if !dataset.cot.trim().is_empty() {
            self.optimize_cot(ctx, &dataset_id, &dataset).await;
        }

        Ok(dataset_id)
    }

    async fn optimize_cot(&self, ctx: &TaskCtx, dataset_id: &str, dataset: &Dataset) {
        let optimizing = self
            .answer_service
            .optimize_cot(&dataset.question, &dataset.answer, &dataset.cot);
        let optimized = match tokio::time::timeout(self.cot_timeout, optimizing).await {
            Ok(Ok(cot)) if !cot.is_empty() => cot,
            Ok(Ok(_)) => {
                warn!("{} ⚠️ 思维链优化结果为空，保留原思维链", ctx);
                return;
            }
            Err(_) => {
                warn!("{} ⚠️ 思维链优化超时 ({:?})，保留原思维链", ctx, self.cot_timeout);
                return;
            }
            Ok(Err(e)) => {
                warn!("{} ⚠️ 思维链优化失败: {}", ctx, e);
                return;
            }
        };

        match self
            .store
            .update_record(RecordKind::Dataset, dataset_id, json!({ "cot": optimized }))
            .await
        {
            Ok(()) => debug!("{} 思维链已优化", ctx),
            Err(e) => warn!("{} ⚠️ 保存优化后的思维链失败: {}", ctx, e),
        }
    }
}
