use serde::{Deserialize, Serialize};

/// LLM 生成、尚未持久化的问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// 持久化后的问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chunk_id: String,
    pub question: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub answered: bool,
}

impl Question {
    pub fn from_draft(chunk_id: impl Into<String>, draft: QuestionDraft) -> Self {
        Self {
            id: None,
            chunk_id: chunk_id.into(),
            question: draft.question,
            label: draft.label,
            answered: false,
        }
    }
}
