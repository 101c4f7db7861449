//! 数据集导出
//!
//! 把 Dataset 记录渲染成 Alpaca 或 ShareGPT 风格，写成 JSON 数组或 JSONL。

use crate::error::{AppError, AppResult};
use crate::models::Dataset;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// 样本风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportStyle {
    #[default]
    Alpaca,
    ShareGpt,
}

/// 文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Json,
    Jsonl,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Json => "json",
            FileType::Jsonl => "jsonl",
        }
    }
}

/// 导出格式，字符串形式如 `alpaca-json`、`sharegpt-jsonl`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct ExportFormat {
    pub style: ExportStyle,
    pub file_type: FileType,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let (style, file_type) = normalized
            .split_once('-')
            .unwrap_or((normalized.as_str(), "json"));

        let style = match style {
            "alpaca" => ExportStyle::Alpaca,
            "sharegpt" => ExportStyle::ShareGpt,
            other => return Err(format!("未知导出风格: {}", other)),
        };
        let file_type = match file_type {
            "json" => FileType::Json,
            "jsonl" => FileType::Jsonl,
            other => return Err(format!("未知文件类型: {}", other)),
        };
        Ok(Self { style, file_type })
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 数据集导出器
pub struct Exporter {
    format: ExportFormat,
    confirmed_only: bool,
    system_prompt: Option<String>,
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            confirmed_only: false,
            system_prompt: None,
        }
    }

    /// 只导出已确认的记录
    pub fn confirmed_only(mut self, confirmed_only: bool) -> Self {
        self.confirmed_only = confirmed_only;
        self
    }

    /// 为每条样本附加系统提示词
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        self
    }

    fn sample(&self, dataset: &Dataset) -> JsonValue {
        match self.format.style {
            ExportStyle::Alpaca => json!({
                "instruction": dataset.question,
                "input": "",
                "output": dataset.answer,
                "system": self.system_prompt.clone().unwrap_or_default(),
            }),
            ExportStyle::ShareGpt => {
                let mut messages = Vec::with_capacity(3);
                if let Some(system) = &self.system_prompt {
                    messages.push(json!({ "role": "system", "content": system }));
                }
                messages.push(json!({ "role": "user", "content": dataset.question }));
                messages.push(json!({ "role": "assistant", "content": dataset.answer }));
                json!({ "messages": messages })
            }
        }
    }

    /// 渲染为文件内容
    pub fn render(&self, datasets: &[Dataset]) -> AppResult<String> {
        let samples: Vec<JsonValue> = datasets
            .iter()
            .filter(|d| !self.confirmed_only || d.confirmed)
            .map(|d| self.sample(d))
            .collect();

        let rendered = match self.format.file_type {
            FileType::Json => serde_json::to_string_pretty(&samples)?,
            FileType::Jsonl => {
                let mut lines = Vec::with_capacity(samples.len());
                for sample in &samples {
                    lines.push(serde_json::to_string(sample)?);
                }
                lines.join("\n")
            }
        };
        Ok(rendered)
    }

    /// 写入 `<dir>/datasets-<时间戳>.<扩展名>`，返回文件路径
    pub async fn export_to_dir(&self, datasets: &[Dataset], dir: &Path) -> AppResult<PathBuf> {
        let content = self.render(datasets)?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;

        let file_name = format!(
            "datasets-{}.{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S"),
            self.format.file_type.extension()
        );
        let path = dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        info!("📦 已导出 {} 条数据集到 {}", datasets.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(question: &str, confirmed: bool) -> Dataset {
        Dataset {
            id: None,
            question_id: "question-1".to_string(),
            question: question.to_string(),
            answer: format!("{}的答案", question),
            cot: String::new(),
            model: "m".to_string(),
            chunk_name: "doc-part-1".to_string(),
            chunk_content: "内容".to_string(),
            question_label: None,
            confirmed,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn parses_format_strings() {
        assert_eq!(ExportFormat::default(), "alpaca-json".parse().unwrap());
        let format: ExportFormat = "ShareGPT-JSONL".parse().unwrap();
        assert_eq!(format.style, ExportStyle::ShareGpt);
        assert_eq!(format.file_type, FileType::Jsonl);
        assert_eq!("sharegpt".parse::<ExportFormat>().unwrap().file_type, FileType::Json);
        assert!("csv-json".parse::<ExportFormat>().is_err());
        assert!("alpaca-xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn alpaca_json_is_an_array() {
        let exporter = Exporter::new(ExportFormat::default());
        let out = exporter.render(&[dataset("q1", false)]).unwrap();
        let parsed: Vec<JsonValue> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["instruction"], "q1");
        assert_eq!(parsed[0]["output"], "q1的答案");
    }

    #[test]
    fn sharegpt_jsonl_one_line_per_sample() {
        let exporter = Exporter::new("sharegpt-jsonl".parse().unwrap()).with_system_prompt("你是助手");
        let out = exporter
            .render(&[dataset("q1", true), dataset("q2", true)])
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: JsonValue = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["messages"][0]["role"], "system");
        assert_eq!(first["messages"][1]["content"], "q1");
        assert_eq!(first["messages"][2]["role"], "assistant");
    }

    #[test]
    fn confirmed_only_filters() {
        let exporter = Exporter::new(ExportFormat::default()).confirmed_only(true);
        let out = exporter
            .render(&[dataset("q1", true), dataset("q2", false)])
            .unwrap();
        let parsed: Vec<JsonValue> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
