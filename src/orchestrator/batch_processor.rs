//! 批量数据集生成 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责整条流水线的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建 LLM 客户端、存储和分块器
//! 2. **文档入库**：扫描 Markdown 文件，分块并保存文本块和目录
//! 3. **问题批次**：每个文本块一个条目，由 `BatchCoordinator` 限制并发
//! 4. **答案批次**：每个问题一个条目
//! 5. **导出与落盘**：导出数据集，保存存储快照
//! 6. **全局统计**：汇总所有批次的结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个条目的细节，委托 workflow 层
//! - **资源所有者**：唯一持有 LLM 客户端和存储的模块
//! - **部分失败**：单个条目失败只进入批次报告，流水线继续

use crate::chunking::Chunker;
use crate::clients::{LlmProvider, OpenAiClient};
use crate::config::Config;
use crate::infrastructure::{MemoryStore, RecordFilter, RecordKind, RecordStore};
use crate::models::{Dataset, SourceDocument};
use crate::orchestrator::coordinator::{BatchCoordinator, BatchReport};
use crate::orchestrator::task_pool::WorkItem;
use crate::services::Exporter;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::{ingest_document, DatasetFlow, IngestedDocument, QuestionFlow, TaskCtx};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 应用主结构
pub struct App<L = OpenAiClient> {
    config: Config,
    llm: L,
    store: MemoryStore,
    chunker: Chunker,
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub documents: usize,
    pub chunks: usize,
    pub questions: usize,
    pub datasets: usize,
    pub failed: usize,
    /// 导出文件路径，没有数据集时为空
    pub export_path: Option<PathBuf>,
}

impl App<OpenAiClient> {
    /// 初始化应用，使用配置中的 OpenAI 兼容服务
    pub async fn initialize(config: Config) -> Result<Self> {
        let llm = OpenAiClient::new(&config);
        Self::with_llm(config, llm)
    }
}

impl<L: LlmProvider> App<L> {
    /// 使用指定的 LLM 能力创建应用
    pub fn with_llm(config: Config, llm: L) -> Result<Self> {
        config.validate()?;
        let chunker = Chunker::from_config(&config)?;

        init_log_file(&config.output_log_file)?;
        log_startup(
            config.concurrency_limit,
            config.text_split_min_length,
            config.text_split_max_length,
        );

        Ok(Self {
            config,
            llm,
            store: MemoryStore::new(),
            chunker,
        })
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunStats> {
        let documents = self.load_documents().await?;

        if documents.is_empty() {
            warn!("⚠️ 没有找到待处理的 Markdown 文件，程序结束");
            return Ok(RunStats::default());
        }

        let mut stats = RunStats {
            documents: documents.len(),
            ..Default::default()
        };

        // 文档入库
        let ingested = self.ingest_all(&documents).await?;
        let chunk_ids: Vec<String> = ingested
            .iter()
            .flat_map(|doc| doc.chunk_ids.iter().cloned())
            .collect();
        stats.chunks = chunk_ids.len();
        self.write_tocs(&ingested).await?;

        // 问题批次
        let question_report = self.generate_questions(chunk_ids).await;
        stats.failed += question_report.failed;
        let question_ids: Vec<String> = question_report.into_successes().flatten().collect();
        stats.questions = question_ids.len();

        // 答案批次
        let dataset_report = self.generate_datasets(question_ids).await;
        stats.failed += dataset_report.failed;
        stats.datasets = dataset_report.succeeded;

        // 导出与落盘
        stats.export_path = self.export().await?;
        self.store
            .save_to_dir(Path::new(&self.config.output_folder))
            .await
            .context("保存存储快照失败")?;

        print_final_stats(
            stats.chunks,
            stats.questions,
            stats.datasets,
            stats.failed,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载 Markdown 文件
    async fn load_documents(&self) -> Result<Vec<SourceDocument>> {
        info!("\n📁 正在扫描待处理的 Markdown 文件...");
        crate::models::load_all_markdown_files(&self.config.input_folder).await
    }

    async fn ingest_all(&self, documents: &[SourceDocument]) -> Result<Vec<IngestedDocument>> {
        let mut ingested = Vec::with_capacity(documents.len());
        for document in documents {
            let doc = ingest_document(&self.store, &self.chunker, document)
                .await
                .with_context(|| format!("保存 {} 的文本块失败", document.file_name))?;
            ingested.push(doc);
        }
        Ok(ingested)
    }

    /// 每个文档的目录写成 `<输出目录>/toc/<文件名>.json` 和 `.md`
    async fn write_tocs(&self, ingested: &[IngestedDocument]) -> Result<()> {
        let dir = Path::new(&self.config.output_folder).join("toc");
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("创建目录失败: {}", dir.display()))?;

        for doc in ingested.iter().filter(|d| !d.toc.is_empty()) {
            let stem = SourceDocument::new(doc.file_name.as_str(), "").stem();
            let json = serde_json::to_string_pretty(&doc.toc.to_tree())?;
            tokio::fs::write(dir.join(format!("{}.json", stem)), json).await?;
            tokio::fs::write(dir.join(format!("{}.md", stem)), doc.toc.to_outline()).await?;
        }
        Ok(())
    }

    /// 为所有文本块生成问题，成功条目的数据是新问题的 ID
    pub async fn generate_questions(&self, chunk_ids: Vec<String>) -> BatchReport<Vec<String>> {
        let flow = QuestionFlow::new(&self.llm, &self.store, &self.config);
        let coordinator = BatchCoordinator::from_config("问题生成", &self.config);
        let items = positioned_items(chunk_ids);

        coordinator
            .run_with_progress(
                items,
                |item| {
                    let flow = &flow;
                    async move {
                        let (index, total) = item.payload;
                        let ctx = TaskCtx::new("问题生成", index, total, item.id);
                        flow.run_with_ctx(&ctx).await
                    }
                },
                |state| {
                    info!(
                        "[问题生成] 📈 {}/{} ({}%)",
                        state.completed, state.total, state.percentage
                    )
                },
            )
            .await
    }

    /// 为所有问题生成数据集，成功条目的数据是数据集 ID
    pub async fn generate_datasets(&self, question_ids: Vec<String>) -> BatchReport<String> {
        let flow = DatasetFlow::new(&self.llm, &self.store, &self.config);
        let coordinator = BatchCoordinator::from_config("答案生成", &self.config);
        let items = positioned_items(question_ids);

        coordinator
            .run_with_progress(
                items,
                |item| {
                    let flow = &flow;
                    async move {
                        let (index, total) = item.payload;
                        let ctx = TaskCtx::new("答案生成", index, total, item.id);
                        flow.run_with_ctx(&ctx).await
                    }
                },
                |state| {
                    info!(
                        "[答案生成] 📈 {}/{} ({}%)",
                        state.completed, state.total, state.percentage
                    )
                },
            )
            .await
    }

    async fn export(&self) -> Result<Option<PathBuf>> {
        let datasets: Vec<Dataset> = self
            .store
            .list_as(RecordKind::Dataset, &RecordFilter::all())
            .await?;
        if datasets.is_empty() {
            warn!("⚠️ 没有可导出的数据集");
            return Ok(None);
        }

        let path = Exporter::new(self.config.export_format)
            .export_to_dir(&datasets, Path::new(&self.config.output_folder))
            .await?;
        Ok(Some(path))
    }
}

/// 条目数据是 (序号, 总数)，序号从 1 开始
fn positioned_items(ids: Vec<String>) -> Vec<WorkItem<(usize, usize)>> {
    let total = ids.len();
    ids.into_iter()
        .enumerate()
        .map(|(i, id)| WorkItem::new(id, (i + 1, total)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_carry_their_position_in_the_batch() {
        let items = positioned_items(vec!["chunk-1".to_string(), "chunk-2".to_string()]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "chunk-2");
        assert_eq!(items[1].payload, (2, 2));

        let (index, total) = items[0].payload;
        let ctx = TaskCtx::new("问题生成", index, total, items[0].id.as_str());
        assert_eq!(ctx.to_string(), "[问题生成 1/2 #chunk-1]");
    }
}
