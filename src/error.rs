//! 错误类型
//!
//! 分块错误在调用入口立即返回；单个批处理条目的错误只记录在批次报告中，
//! 不会中断整个批次。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文本分块错误
    #[error("分块错误: {0}")]
    Chunk(#[from] ChunkError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 文本分块错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// 长度窗口非法：要求 0 < min_len <= max_len
    #[error("分块长度窗口非法: min_len={min_len}, max_len={max_len} (要求 0 < min_len <= max_len)")]
    MalformedInput { min_len: usize, max_len: usize },
}

/// LLM 服务错误（模型提供方错误）
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败（网络、鉴权等）
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 构建请求失败
    #[error("构建LLM请求失败: {0}")]
    BuildRequest(String),
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容无法解析
    #[error("LLM返回内容无法解析: {reason} (响应: {response})")]
    MalformedOutput { reason: String, response: String },
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 记录不存在
    #[error("记录不存在: {kind}#{id}")]
    NotFound { kind: String, id: String },
    /// 补丁不是 JSON 对象
    #[error("非法的更新内容 ({kind}#{id}): 必须是 JSON 对象")]
    InvalidPatch { kind: String, id: String },
    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 写入失败
    #[error("写入存储文件失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

impl LlmError {
    /// 创建输出解析错误
    pub fn malformed(reason: impl Into<String>, response: &str) -> Self {
        LlmError::MalformedOutput {
            reason: reason.into(),
            response: crate::utils::logging::truncate_text(response, 200),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(StoreError::Serialization(err))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_message_names_both_bounds() {
        let err = ChunkError::MalformedInput {
            min_len: 10,
            max_len: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("min_len=10"));
        assert!(msg.contains("max_len=5"));
    }

    #[test]
    fn app_error_wraps_domain_errors() {
        let err: AppError = ChunkError::MalformedInput {
            min_len: 0,
            max_len: 5,
        }
        .into();
        assert!(matches!(err, AppError::Chunk(_)));
        assert!(err.to_string().starts_with("分块错误"));

        let err = AppError::file_read_failed(
            "input_md/a.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("input_md/a.md"));
    }

    #[test]
    fn malformed_output_truncates_long_responses() {
        let response = "x".repeat(500);
        match LlmError::malformed("不是 JSON", &response) {
            LlmError::MalformedOutput { response, .. } => {
                assert!(response.chars().count() <= 203);
                assert!(response.ends_with("..."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
