pub mod llm_client;

pub use llm_client::{split_reasoning, LlmProvider, OpenAiClient, Reasoned};
