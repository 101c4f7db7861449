use serde::{Deserialize, Serialize};
use std::path::Path;

/// 待分块的源文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub file_name: String,
    pub content: String,
}

impl SourceDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// 不带扩展名的文件名，用于生成文本块名称
    pub fn stem(&self) -> String {
        file_stem(&self.file_name)
    }
}

/// 文本块
///
/// 同一文档的所有文本块按 `ordinal` 顺序拼接，得到的正好是原文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// 存储层分配的 ID，持久化之前为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 从 1 开始的序号
    pub ordinal: usize,
    /// `<源文件名>-part-<序号>`
    pub name: String,
    pub source_file_name: String,
    pub content: String,
    /// 本块包含的标题
    #[serde(default)]
    pub summary: String,
    /// 字符数
    pub size: usize,
}

impl Chunk {
    pub fn new(
        ordinal: usize,
        source_file_name: &str,
        content: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            id: None,
            ordinal,
            name: format!("{}-part-{}", file_stem(source_file_name), ordinal),
            source_file_name: source_file_name.to_string(),
            size: content.chars().count(),
            content,
            summary: summary.into(),
        }
    }
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}
