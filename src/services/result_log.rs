//! 结果日志服务 - 业务能力层
//!
//! 只负责"追加一条结果记录"和"读回结果日志"，不关心答题流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::models::ResultRecord;

/// 结果持久化接口
///
/// 会话结束时由会话调用一次
pub trait ResultSink: Send + Sync {
    fn append(&self, record: &ResultRecord) -> Result<()>;
}

/// 追加写入的结果日志文件
///
/// 职责：
/// - 每次会话结束追加一行，从不截断
/// - 读取时跳过无法解析的行
pub struct ResultLog {
    log_file_path: PathBuf,
}

impl ResultLog {
    /// 使用默认文件名 quiz_results.log
    pub fn new() -> Self {
        Self::with_path("quiz_results.log")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log_file_path
    }

    /// 读取原始日志内容，文件不存在时返回 None
    pub fn read_raw(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.log_file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("无法读取结果日志: {}", self.log_file_path.display())
            }),
        }
    }

    /// 读取并解析所有记录
    pub fn read_records(&self) -> Result<Vec<ResultRecord>> {
        let Some(content) = self.read_raw()? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match ResultRecord::parse_line(line) {
                Some(record) => records.push(record),
                None => warn!("结果日志第 {} 行无法解析，已跳过", idx + 1),
            }
        }
        Ok(records)
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for ResultLog {
    fn append(&self, record: &ResultRecord) -> Result<()> {
        debug!("追加结果记录: {}", record);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .with_context(|| {
                format!("无法打开结果日志: {}", self.log_file_path.display())
            })?;

        writeln!(file, "{}", record)?;

        Ok(())
    }
}

/// 内存中的结果记录，用于测试和嵌入场景
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ResultRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ResultRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ResultSink for MemorySink {
    fn append(&self, record: &ResultRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
