//! 问题生成流程 - 流程层
//!
//! 核心职责：定义"一个文本块"生成问题的完整流程
//!
//! 流程顺序：
//! 1. 从存储读取文本块
//! 2. LLM 抽取问题 → 按标签打标签
//! 3. 逐条保存问题

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::LlmProvider;
use crate::config::Config;
use crate::infrastructure::{RecordKind, RecordStore};
use crate::models::{Chunk, Question};
use crate::services::QuestionService;
use crate::utils::truncate_text;
use crate::workflow::task_ctx::TaskCtx;

/// 问题生成流程
///
/// - 编排"读块 → 生成 → 保存"
/// - 不持有任何资源，只借用 LLM 与存储
/// - 失败直接返回给调用方，由批处理层记录
pub struct QuestionFlow<'a, L, S> {
    question_service: QuestionService<'a, L>,
    store: &'a S,
    verbose_logging: bool,
}

impl<'a, L: LlmProvider, S: RecordStore> QuestionFlow<'a, L, S> {
    pub fn new(llm: &'a L, store: &'a S, config: &Config) -> Self {
        Self {
            question_service: QuestionService::new(
                llm,
                config.language,
                config.question_generation_length,
                config.tags.clone(),
            ),
            store,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 为文本块生成问题，返回新问题的 ID
    pub async fn run(&self, chunk_id: &str) -> Result<Vec<String>> {
        let ctx = TaskCtx::for_record("问题生成", chunk_id);
        self.run_with_ctx(&ctx).await
    }

    pub async fn run_with_ctx(&self, ctx: &TaskCtx) -> Result<Vec<String>> {
        let chunk: Chunk = self
            .store
            .get_as(RecordKind::Chunk, &ctx.record_id)
            .await
            .with_context(|| format!("{} 读取文本块失败", ctx))?;

        info!("{} 🔍 {} ({} 字符)", ctx, chunk.name, chunk.size);

        let drafts = self
            .question_service
            .generate_for_chunk(&chunk, None)
            .await
            .with_context(|| format!("{} 生成问题失败", ctx))?;

        if drafts.is_empty() {
            warn!("{} ⚠️ LLM 没有返回任何问题", ctx);
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if self.verbose_logging {
                info!("{}   - {}", ctx, truncate_text(&draft.question, 60));
            }
            let question = Question::from_draft(&ctx.record_id, draft);
            let id = self
                .store
                .create_as(RecordKind::Question, &question)
                .await
                .with_context(|| format!("{} 保存问题失败", ctx))?;
            ids.push(id);
        }

        info!("{} ✓ 生成 {} 个问题", ctx, ids.len());
        Ok(ids)
    }
}
