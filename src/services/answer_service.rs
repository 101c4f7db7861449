//! 答案生成服务 - 业务能力层
//!
//! 只负责"回答一个问题"和"优化一段思维链"

use crate::clients::{LlmProvider, Reasoned};
use crate::config::Language;
use crate::error::LlmError;
use crate::services::prompts;
use tracing::debug;

/// 模型有时会把这个小标题带进输出
const COT_HEADING: &str = "优化后的思维链";

pub struct AnswerService<'a, L> {
    llm: &'a L,
    language: Language,
}

impl<'a, L: LlmProvider> AnswerService<'a, L> {
    pub fn new(llm: &'a L, language: Language) -> Self {
        Self { llm, language }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// 基于文本块内容回答问题，同时取回思维链
    pub async fn answer(&self, chunk_content: &str, question: &str) -> Result<Reasoned, LlmError> {
        let prompt = prompts::answer_prompt(self.language, chunk_content, question);
        let reasoned = self.llm.generate_with_reasoning(&prompt).await?;
        if reasoned.answer.trim().is_empty() {
            return Err(LlmError::EmptyContent {
                model: self.llm.model_name().to_string(),
            });
        }
        debug!(
            "答案 {} 字符, 思维链 {} 字符",
            reasoned.answer.chars().count(),
            reasoned.reasoning.chars().count()
        );
        Ok(reasoned)
    }

    /// 优化思维链
    pub async fn optimize_cot(
        &self,
        question: &str,
        answer: &str,
        cot: &str,
    ) -> Result<String, LlmError> {
        let prompt = prompts::optimize_cot_prompt(self.language, question, answer, cot);
        let reasoned = self.llm.generate_with_reasoning(&prompt).await?;
        Ok(reasoned.answer.replace(COT_HEADING, "").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoLlm(&'static str);

    impl LlmProvider for EchoLlm {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn answer_carries_reasoning() {
        let llm = EchoLlm("<think>推理过程</think>最终答案");
        let service = AnswerService::new(&llm, Language::Zh);
        let reasoned = service.answer("内容", "问题").await.unwrap();
        assert_eq!(reasoned.answer, "最终答案");
        assert_eq!(reasoned.reasoning, "推理过程");
        assert_eq!(service.model_name(), "echo");
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let llm = EchoLlm("<think>只有推理</think>");
        let service = AnswerService::new(&llm, Language::Zh);
        assert!(matches!(
            service.answer("内容", "问题").await,
            Err(LlmError::EmptyContent { .. })
        ));
    }

    #[tokio::test]
    async fn optimized_cot_drops_heading_marker() {
        let llm = EchoLlm("优化后的思维链\n先看条件，再推出结论");
        let service = AnswerService::new(&llm, Language::Zh);
        let cot = service.optimize_cot("q", "a", "根据文献……").await.unwrap();
        assert_eq!(cot, "先看条件，再推出结论");
    }
}
