//! 问题生成服务 - 业务能力层
//!
//! 只负责"为一个文本块生成并标注问题"，不关心持久化和批处理

use crate::clients::LlmProvider;
use crate::config::Language;
use crate::error::LlmError;
use crate::models::{Chunk, QuestionDraft};
use crate::services::llm_output::{parse_labeled_questions, parse_question_list};
use crate::services::prompts;
use tracing::{debug, warn};

/// 问题生成服务
///
/// 职责：
/// - 按文本长度决定问题数量
/// - 调用 LLM 抽取问题
/// - 用标签列表为问题打标签
pub struct QuestionService<'a, L> {
    llm: &'a L,
    language: Language,
    question_generation_length: usize,
    tags: Vec<String>,
}

impl<'a, L: LlmProvider> QuestionService<'a, L> {
    pub fn new(
        llm: &'a L,
        language: Language,
        question_generation_length: usize,
        tags: Vec<String>,
    ) -> Self {
        Self {
            llm,
            language,
            question_generation_length: question_generation_length.max(1),
            tags,
        }
    }

    /// 每 `question_generation_length` 个字符一个问题，至少一个
    pub fn question_count(&self, chunk_size: usize) -> usize {
        (chunk_size / self.question_generation_length).max(1)
    }

    /// 抽取问题
    pub async fn generate_questions(
        &self,
        chunk: &Chunk,
        number: Option<usize>,
    ) -> Result<Vec<String>, LlmError> {
        let number = number.unwrap_or_else(|| self.question_count(chunk.size));
        debug!("为 {} 生成 {} 个问题", chunk.name, number);

        let prompt = prompts::question_prompt(self.language, &chunk.content, number);
        let response = self.llm.generate(&prompt).await?;
        parse_question_list(&response)
    }

    /// 为问题打标签
    ///
    /// 没有标签时不调用 LLM；标签结果无法解析时保留未标注的问题。
    pub async fn tag_questions(
        &self,
        questions: Vec<String>,
    ) -> Result<Vec<QuestionDraft>, LlmError> {
        let unlabeled = |qs: Vec<String>| -> Vec<QuestionDraft> {
            qs.into_iter()
                .map(|question| QuestionDraft {
                    question,
                    label: None,
                })
                .collect()
        };

        if self.tags.is_empty() || questions.is_empty() {
            return Ok(unlabeled(questions));
        }

        let tags_json = serde_json::to_string(&self.tags).unwrap_or_default();
        let questions_json = serde_json::to_string(&questions).unwrap_or_default();
        let prompt = prompts::label_prompt(self.language, &tags_json, &questions_json);
        let response = self.llm.generate(&prompt).await?;

        match parse_labeled_questions(&response) {
            Ok(drafts) if !drafts.is_empty() => Ok(drafts),
            Ok(_) => {
                warn!("标签结果为空，保留未标注的问题");
                Ok(unlabeled(questions))
            }
            Err(e) => {
                warn!("标签结果解析失败，保留未标注的问题: {}", e);
                Ok(unlabeled(questions))
            }
        }
    }

    /// 抽取并标注问题
    pub async fn generate_for_chunk(
        &self,
        chunk: &Chunk,
        number: Option<usize>,
    ) -> Result<Vec<QuestionDraft>, LlmError> {
        let questions = self.generate_questions(chunk, number).await?;
        self.tag_questions(questions).await
    }
}
