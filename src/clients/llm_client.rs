//! LLM API 客户端
//!
//! 生成流程只依赖 [`LlmProvider`] 能力；[`OpenAiClient`] 用 `async-openai`
//! 对接任何兼容 OpenAI API 的服务。

use crate::config::Config;
use crate::error::LlmError;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use tracing::{debug, warn};

/// 带推理过程的回答
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reasoned {
    pub answer: String,
    /// 思维链；模型没有给出时为空
    pub reasoning: String,
}

/// LLM 生成能力
#[allow(async_fn_in_trait)]
pub trait LlmProvider {
    /// 模型名称，记录到数据集中
    fn model_name(&self) -> &str;

    /// 普通生成
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// 带思维链的生成
    ///
    /// 默认实现从 `<think>…</think>` 中拆出推理过程。
    async fn generate_with_reasoning(&self, prompt: &str) -> Result<Reasoned, LlmError> {
        let raw = self.generate(prompt).await?;
        Ok(split_reasoning(&raw))
    }
}

/// 把 `<think>推理</think>回答` 拆成推理和回答
pub fn split_reasoning(raw: &str) -> Reasoned {
    if let Ok(re) = Regex::new(r"(?s)<think>(.*?)</think>") {
        if let Some(caps) = re.captures(raw) {
            let reasoning = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let answer = re.replace(raw, "").trim().to_string();
            return Reasoned { answer, reasoning };
        }
    }
    Reasoned {
        answer: raw.trim().to_string(),
        reasoning: String::new(),
    }
}

/// OpenAI 兼容客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    /// 发送聊天请求
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::BuildRequest(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::BuildRequest(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::BuildRequest(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::RequestFailed {
                model: self.model_name.clone(),
                source: Box::new(e),
            }
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl LlmProvider for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.send_to_llm(prompt, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_think_block_from_answer() {
        let reasoned = split_reasoning("<think>\n先分析题意\n</think>\n\n答案是 42");
        assert_eq!(reasoned.reasoning, "先分析题意");
        assert_eq!(reasoned.answer, "答案是 42");
    }

    #[test]
    fn no_think_block_means_empty_reasoning() {
        let reasoned = split_reasoning("  just the answer ");
        assert_eq!(reasoned.answer, "just the answer");
        assert!(reasoned.reasoning.is_empty());
    }

    #[test]
    fn client_takes_model_settings_from_config() {
        let config = Config {
            llm_model_name: "qwen-plus".to_string(),
            ..Config::default()
        };
        let client = OpenAiClient::new(&config);
        assert_eq!(client.model_name(), "qwen-plus");
    }

    /// 需要真实的 API：`LLM_API_KEY=... cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_generate_live() {
        crate::utils::init_tracing(true);
        let config = Config::from_env().unwrap();
        let client = OpenAiClient::new(&config);
        let response = client.generate("用一句话介绍你自己").await.unwrap();
        assert!(!response.is_empty());
    }
}
