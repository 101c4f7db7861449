//! 程序配置
//!
//! 默认值 → 任务配置文件（TOML，可选）→ 环境变量，后者覆盖前者。

use crate::error::{AppError, AppResult, ConfigError};
use crate::services::exporter::ExportFormat;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 提示词语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 中文
    #[default]
    Zh,
    /// English
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" | "中文" => Ok(Language::Zh),
            "en" | "english" => Ok(Language::En),
            other => Err(format!("未知语言: {}", other)),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 文本块最小长度（字符数）
    pub text_split_min_length: usize,
    /// 文本块最大长度（字符数）
    pub text_split_max_length: usize,
    /// 同时进行的 LLM 调用数量
    pub concurrency_limit: usize,
    /// 单个条目的超时时间（秒）
    pub item_timeout_secs: u64,
    /// 每多少字符生成一个问题
    pub question_generation_length: usize,
    /// 提示词语言
    pub language: Language,
    /// 打标签时可选的标签
    pub tags: Vec<String>,
    /// Markdown 文件所在目录
    pub input_folder: String,
    /// 输出目录（存储快照、导出数据集）
    pub output_folder: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 导出格式
    pub export_format: ExportFormat,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_split_min_length: 1500,
            text_split_max_length: 2000,
            concurrency_limit: 3,
            item_timeout_secs: 180,
            question_generation_length: 240,
            language: Language::Zh,
            tags: Vec::new(),
            input_folder: "input_md".to_string(),
            output_folder: "output".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            export_format: ExportFormat::default(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 8192,
        }
    }
}

impl Config {
    /// 从默认值加载，并用环境变量覆盖
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 任务配置文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::FileParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        Ok(config)
    }

    /// 依次应用配置文件（若提供）与环境变量，并校验
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            text_split_min_length: env_or("TEXT_SPLIT_MIN_LENGTH", self.text_split_min_length)?,
            text_split_max_length: env_or("TEXT_SPLIT_MAX_LENGTH", self.text_split_max_length)?,
            concurrency_limit: env_or("CONCURRENCY_LIMIT", self.concurrency_limit)?,
            item_timeout_secs: env_or("ITEM_TIMEOUT_SECS", self.item_timeout_secs)?,
            question_generation_length: env_or(
                "QUESTION_GENERATION_LENGTH",
                self.question_generation_length,
            )?,
            language: env_or("LANGUAGE", self.language)?,
            tags: match std::env::var("TAGS") {
                Ok(v) => v
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect(),
                Err(_) => self.tags,
            },
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(self.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(self.output_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging)?,
            export_format: env_or("EXPORT_FORMAT", self.export_format)?,
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env_or("LLM_TEMPERATURE", self.llm_temperature)?,
            llm_max_tokens: env_or("LLM_MAX_TOKENS", self.llm_max_tokens)?,
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_split_min_length == 0 {
            return Err(invalid("text_split_min_length", "必须大于 0"));
        }
        if self.text_split_min_length > self.text_split_max_length {
            return Err(invalid(
                "text_split_min_length",
                format!(
                    "不能大于 text_split_max_length ({} > {})",
                    self.text_split_min_length, self.text_split_max_length
                ),
            ));
        }
        if self.concurrency_limit == 0 {
            return Err(invalid("concurrency_limit", "必须至少为 1"));
        }
        if self.question_generation_length == 0 {
            return Err(invalid("question_generation_length", "必须大于 0"));
        }
        if self.item_timeout_secs == 0 {
            return Err(invalid("item_timeout_secs", "必须大于 0"));
        }
        Ok(())
    }

    /// 单个条目的超时时间
    pub fn item_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.item_timeout_secs)
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// 读取并解析环境变量，不存在时返回默认值
fn env_or<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_task_config() {
        let config = Config::default();
        assert_eq!(config.text_split_min_length, 1500);
        assert_eq!(config.text_split_max_length, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let config = Config {
            text_split_min_length: 3000,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "text_split_min_length"
        ));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency_limit: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let config: Config = toml::from_str(
            r#"
            text_split_min_length = 500
            text_split_max_length = 800
            language = "en"
            tags = ["历史", "地理"]
            "#,
        )
        .unwrap();
        assert_eq!(config.text_split_min_length, 500);
        assert_eq!(config.text_split_max_length, 800);
        assert_eq!(config.language, Language::En);
        assert_eq!(config.tags.len(), 2);
        assert_eq!(config.concurrency_limit, 3);
    }

    #[test]
    fn language_parses_common_spellings() {
        assert_eq!("中文".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }
}
