use serde::{Deserialize, Serialize};

/// 一条问答训练数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question_id: String,
    pub question: String,
    pub answer: String,
    /// 思维链，优化完成前可能为空
    #[serde(default)]
    pub cot: String,
    pub model: String,
    pub chunk_name: String,
    pub chunk_content: String,
    #[serde(default)]
    pub question_label: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    pub created_at: String,
}
