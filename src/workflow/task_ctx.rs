//! 条目处理上下文
//!
//! 封装"我正在处理哪个批次的第几个条目"这一信息

use std::fmt::Display;

/// 条目处理上下文
#[derive(Debug, Clone)]
pub struct TaskCtx {
    /// 批次名称（仅用于日志显示）
    pub batch: &'static str,

    /// 条目在批次中的序号（从1开始）
    pub index: usize,

    /// 条目总数
    pub total: usize,

    /// 被处理记录的 ID
    pub record_id: String,
}

impl TaskCtx {
    pub fn new(
        batch: &'static str,
        index: usize,
        total: usize,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            batch,
            index,
            total,
            record_id: record_id.into(),
        }
    }

    /// 只知道记录 ID 时使用
    pub fn for_record(batch: &'static str, record_id: impl Into<String>) -> Self {
        Self::new(batch, 0, 0, record_id)
    }
}

impl Display for TaskCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.total > 0 {
            write!(
                f,
                "[{} {}/{} #{}]",
                self.batch, self.index, self.total, self.record_id
            )
        } else {
            write!(f, "[{} #{}]", self.batch, self.record_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_when_known() {
        let ctx = TaskCtx::new("问题生成", 2, 5, "chunk-3");
        assert_eq!(ctx.to_string(), "[问题生成 2/5 #chunk-3]");
        assert_eq!(
            TaskCtx::for_record("答案生成", "question-9").to_string(),
            "[答案生成 #question-9]"
        );
    }
}
