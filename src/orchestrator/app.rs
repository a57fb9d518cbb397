//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **加载题库**：解析并洗牌，失败时不进入答题
//! 2. **收集参数**：通过展示层询问题目数量与限时
//! 3. **运行会话**：创建新的会话并交给 SessionFlow 驱动
//! 4. **查看日志**：读取结果日志，输出原文或 JSON

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::models::{load_bank, BankParser, ResultRecord, SessionReport};
use crate::services::{Presenter, ResultLog};
use crate::utils::logging::{log_bank_loaded, log_startup, print_final_stats};
use crate::workflow::{QuizSession, SessionFlow};

/// 应用主结构
pub struct App {
    config: Config,
    result_log: Arc<ResultLog>,
}

/// 结果日志汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    pub sessions: usize,
    pub average_accuracy: f64,
}

impl LogSummary {
    fn from_records(records: &[ResultRecord]) -> Self {
        let sessions = records.len();
        let average_accuracy = if sessions == 0 {
            0.0
        } else {
            let total: f64 = records.iter().map(|r| r.accuracy_percent).sum();
            (total / sessions as f64 * 100.0).round() / 100.0
        };
        Self {
            sessions,
            average_accuracy,
        }
    }
}

#[derive(Serialize)]
struct LogExport<'a> {
    summary: LogSummary,
    records: &'a [ResultRecord],
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let result_log = Arc::new(ResultLog::with_path(&config.result_log_file));
        Self { config, result_log }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 加载题库并运行一次答题
    ///
    /// 用户在输入参数时取消返回 `Ok(None)`
    pub async fn run_quiz<P: Presenter>(
        &self,
        bank_path: &str,
        presenter: &mut P,
    ) -> Result<Option<SessionReport>> {
        log_startup(bank_path, &self.config.result_log_file);

        let parser = BankParser::new()
            .lenient(self.config.lenient_parsing)
            .with_optional_seed(self.config.shuffle_seed);
        let bank = load_bank(bank_path, &parser).await?;
        log_bank_loaded(&bank);

        let Some(question_count) = presenter
            .prompt_number("题目数量", self.config.question_count)
            .await?
        else {
            info!("已取消答题");
            return Ok(None);
        };
        let Some(duration_secs) = presenter
            .prompt_number("限时（秒）", self.config.duration_secs)
            .await?
        else {
            info!("已取消答题");
            return Ok(None);
        };

        // 每次答题都使用全新的会话
        let session = QuizSession::new(
            Arc::new(bank),
            self.result_log.clone(),
            self.config.tick_interval(),
        );
        session.start(question_count, duration_secs)?;

        let report = SessionFlow::new(&self.config)
            .run(&session, presenter)
            .await?;

        print_final_stats(&report, &self.config.result_log_file);
        Ok(Some(report))
    }

    /// 输出结果日志
    ///
    /// # 参数
    /// - `json`: 为 true 时输出解析后的记录与汇总（JSON），否则输出原文
    /// - `out`: 输出目标
    pub fn show_log<W: Write>(&self, json: bool, out: &mut W) -> Result<()> {
        let records = self.result_log.read_records()?;
        let summary = LogSummary::from_records(&records);

        if json {
            serde_json::to_writer_pretty(
                &mut *out,
                &LogExport {
                    summary,
                    records: &records,
                },
            )?;
            writeln!(out)?;
            return Ok(());
        }

        match self.result_log.read_raw()? {
            Some(content) if !content.trim().is_empty() => write!(out, "{}", content)?,
            _ => writeln!(out, "暂无答题记录: {}", self.result_log.path().display())?,
        }
        writeln!(out, "{}", "─".repeat(60))?;
        writeln!(
            out,
            "共 {} 次答题，平均正确率 {:.2}%",
            summary.sessions, summary.average_accuracy
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(accuracy: f64) -> ResultRecord {
        ResultRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            asked_count: 4,
            correct_count: 0,
            accuracy_percent: accuracy,
        }
    }

    #[test]
    fn test_log_summary_average() {
        let summary = LogSummary::from_records(&[record(100.0), record(50.0), record(0.0)]);
        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.average_accuracy, 50.0);
    }

    #[test]
    fn test_log_summary_empty() {
        let summary = LogSummary::from_records(&[]);
        assert_eq!(summary.sessions, 0);
        assert_eq!(summary.average_accuracy, 0.0);
    }
}
