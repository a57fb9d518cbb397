//! 会话报告与结果日志记录

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::fmt::Display;
use std::sync::OnceLock;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// 所有题目都已作答
    Completed,
    /// 计时器到期
    TimeExpired,
    /// 用户放弃作答
    Abandoned,
}

impl Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FinishReason::Completed => "全部答完",
            FinishReason::TimeExpired => "时间到",
            FinishReason::Abandoned => "中途放弃",
        };
        f.write_str(text)
    }
}

/// 会话报告：结束时生成一次，之后不可变
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub asked_count: usize,
    pub correct_count: usize,
    /// 百分比，保留两位小数
    pub accuracy_percent: f64,
    pub reason: FinishReason,
}

impl SessionReport {
    pub fn new(asked_count: usize, correct_count: usize, reason: FinishReason) -> Self {
        Self {
            asked_count,
            correct_count,
            accuracy_percent: accuracy_percent(asked_count, correct_count),
            reason,
        }
    }
}

impl Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Questions asked: {}, Correct answers: {}, Accuracy: {:.2}%",
            self.asked_count, self.correct_count, self.accuracy_percent
        )
    }
}

/// 正确率，未答题时为 0，四舍五入到两位小数
pub fn accuracy_percent(asked_count: usize, correct_count: usize) -> f64 {
    if asked_count == 0 {
        return 0.0;
    }
    let raw = correct_count as f64 * 100.0 / asked_count as f64;
    (raw * 100.0).round() / 100.0
}

/// 结果日志中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub timestamp: NaiveDateTime,
    pub asked_count: usize,
    pub correct_count: usize,
    pub accuracy_percent: f64,
}

impl ResultRecord {
    pub fn from_report(report: &SessionReport, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            asked_count: report.asked_count,
            correct_count: report.correct_count,
            accuracy_percent: report.accuracy_percent,
        }
    }

    /// 使用本地时间生成记录
    pub fn now(report: &SessionReport) -> Self {
        Self::from_report(report, chrono::Local::now().naive_local())
    }

    /// 解析日志中的一行，格式不符时返回 None
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = record_regex().captures(line.trim())?;
        Some(Self {
            timestamp: NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).ok()?,
            asked_count: caps[2].parse().ok()?,
            correct_count: caps[3].parse().ok()?,
            accuracy_percent: caps[4].parse().ok()?,
        })
    }
}

impl Display for ResultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - Questions asked: {}, Correct answers: {}, Accuracy: {:.2}%",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.asked_count,
            self.correct_count,
            self.accuracy_percent
        )
    }
}

fn record_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) - Questions asked: (\d+), Correct answers: (\d+), Accuracy: (\d+(?:\.\d+)?)%$",
        )
        .expect("结果日志正则表达式无效")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_accuracy_zero_when_nothing_asked() {
        assert_eq!(accuracy_percent(0, 0), 0.0);
        assert_eq!(SessionReport::new(0, 0, FinishReason::TimeExpired).accuracy_percent, 0.0);
    }

    #[test]
    fn test_accuracy_rounded_to_two_decimals() {
        assert_eq!(accuracy_percent(3, 1), 33.33);
        assert_eq!(accuracy_percent(3, 2), 66.67);
        assert_eq!(accuracy_percent(2, 2), 100.0);
    }

    #[test]
    fn test_record_line_matches_log_format() {
        let report = SessionReport::new(3, 2, FinishReason::Completed);
        let record = ResultRecord::from_report(&report, ts());
        assert_eq!(
            record.to_string(),
            "2024-03-09 14:05:00 - Questions asked: 3, Correct answers: 2, Accuracy: 66.67%"
        );
    }

    #[test]
    fn test_parse_line_reads_back_record() {
        let line = "2024-03-09 14:05:00 - Questions asked: 4, Correct answers: 1, Accuracy: 25.00%";
        let record = ResultRecord::parse_line(line).unwrap();
        assert_eq!(record.timestamp, ts());
        assert_eq!(record.asked_count, 4);
        assert_eq!(record.correct_count, 1);
        assert_eq!(record.accuracy_percent, 25.0);
    }

    #[test]
    fn test_parse_line_rejects_other_text() {
        assert!(ResultRecord::parse_line("").is_none());
        assert!(ResultRecord::parse_line("2024-03-09 - something else").is_none());
    }
}
