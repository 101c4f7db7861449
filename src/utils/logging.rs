/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// 读取 `RUST_LOG`，未设置时使用 `info`（`verbose` 时为 `debug`）。
/// 重复调用是安全的，测试中可以随意调用。
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n数据集生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `min_len` / `max_len`: 分块长度窗口
pub fn log_startup(max_concurrent: usize, min_len: usize, max_len: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档分块与数据集生成");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("✂️ 分块窗口: {}-{} 字符", min_len, max_len);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `label`: 批次名称（如"问题生成"）
/// - `total`: 条目总数
/// - `limit`: 并发上限
pub fn log_batch_start(label: &str, total: usize, limit: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始{}批次: 共 {} 个条目, 并发 {}", label, total, limit);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(label: &str, succeeded: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ {}批次完成: 成功 {}/{}", label, succeeded, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `chunks`: 生成的文本块数量
/// - `questions`: 生成的问题数量
/// - `datasets`: 生成的数据集条目数量
/// - `failed`: 失败条目数量
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    chunks: usize,
    questions: usize,
    datasets: usize,
    failed: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 文本块: {}", chunks);
    info!("❓ 问题: {}", questions);
    info!("✅ 数据集: {}", datasets);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_text("你好世界", 2), "你好...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing(false);
        init_tracing(true);
    }
}
