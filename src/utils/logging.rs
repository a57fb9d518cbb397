/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::models::{QuestionBank, SessionReport};

/// 记录程序启动信息
///
/// # 参数
/// - `bank_path`: 题库文件路径
/// - `result_log`: 结果日志文件路径
pub fn log_startup(bank_path: &str, result_log: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 限时答题模式");
    info!("📁 题库文件: {}", bank_path);
    info!("📝 结果日志: {}", result_log);
    info!("{}", "=".repeat(60));
}

/// 记录题库加载信息
///
/// # 参数
/// - `bank`: 已加载并洗牌的题库
pub fn log_bank_loaded(bank: &QuestionBank) {
    info!("✓ 题库加载完成，共 {} 道题目", bank.len());
    if let Some(first) = bank.get(0) {
        info!("💡 第一题预览: {}", truncate_text(first.text(), 40));
    }
}

/// 记录会话开始信息
///
/// # 参数
/// - `target_count`: 实际要回答的题目数量（已截断到题库大小）
/// - `requested`: 用户请求的题目数量
/// - `duration_secs`: 限时（秒）
pub fn log_session_start(target_count: usize, requested: i64, duration_secs: i64) {
    info!("\n{}", "─".repeat(60));
    if requested > target_count as i64 {
        info!(
            "📋 请求 {} 道题，题库只有 {} 道，已截断",
            requested, target_count
        );
    }
    info!("⏱️ 开始答题: {} 道题 / 限时 {} 秒", target_count, duration_secs);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 会话报告
/// - `log_file_path`: 结果日志文件路径
pub fn print_final_stats(report: &SessionReport, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 答题结束统计 ({})", report.reason);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 答对: {}/{}", report.correct_count, report.asked_count);
    info!("🎯 正确率: {:.2}%", report.accuracy_percent);
    info!("{}", "=".repeat(60));
    info!("\n结果已追加至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
