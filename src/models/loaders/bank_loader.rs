//! 题库文件解析
//!
//! 文件格式（按行解析）：
//!
//! ```text
//! * 注释行
//! @Q
//! 题干，可以跨多行
//! @A
//! 选项 1
//! 选项 2
//! 2          <- 正确选项序号（从 1 开始）
//! @E
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppResult, BankError, QuizError};
use crate::models::question::{Question, QuestionBank};

const QUESTION_MARKER: &str = "@Q";
const ANSWERS_MARKER: &str = "@A";
const END_MARKER: &str = "@E";

/// 题库解析器
#[derive(Debug, Clone, Default)]
pub struct BankParser {
    lenient: bool,
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Outside,
    Text,
    Answers,
}

/// 正在累积的题目块
#[derive(Debug)]
struct OpenBlock {
    number: usize,
    start_line: usize,
    text_parts: Vec<String>,
    answers: Vec<String>,
    correct: Option<i64>,
}

impl OpenBlock {
    fn new(number: usize, start_line: usize) -> Self {
        Self {
            number,
            start_line,
            text_parts: Vec::new(),
            answers: Vec::new(),
            correct: None,
        }
    }

    fn close(self, line: usize) -> Result<Question, BankError> {
        let block = self.number;
        let text = self.text_parts.join(" ");
        if text.is_empty() {
            return Err(BankError::MissingText { block, line });
        }
        if self.answers.len() < 2 {
            return Err(BankError::TooFewAnswers {
                block,
                line,
                count: self.answers.len(),
            });
        }
        let index = self
            .correct
            .ok_or(BankError::MissingCorrectIndex { block, line })?;
        if index < 1 || index as usize > self.answers.len() {
            return Err(BankError::CorrectIndexOutOfRange {
                block,
                line,
                index,
                answers: self.answers.len(),
            });
        }
        Question::new(text, self.answers, index as usize - 1)
    }
}

impl BankParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 宽松模式：新的 @Q 打断未闭合的题目块时丢弃该块而不是报错
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// 固定洗牌种子（测试或复现用）
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 按可选的种子构造
    pub fn with_optional_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// 解析题库文本并洗牌
    ///
    /// 任何一个题目块不合法都会导致整体失败，不返回部分题库
    pub fn parse(&self, raw: &str) -> Result<QuestionBank, BankError> {
        let questions = self.parse_blocks(raw)?;
        let bank = QuestionBank::new(questions)?;
        let bank = match self.seed {
            Some(seed) => bank.shuffle_with(&mut StdRng::seed_from_u64(seed)),
            None => bank.shuffle_with(&mut rand::thread_rng()),
        };
        Ok(bank)
    }

    /// 解析题目块，保持文件中的顺序
    fn parse_blocks(&self, raw: &str) -> Result<Vec<Question>, BankError> {
        let mut questions = Vec::new();
        let mut current: Option<OpenBlock> = None;
        let mut mode = Mode::Outside;
        let mut block_count = 0;

        for (idx, raw_line) in raw.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('*') {
                continue;
            }

            if line.starts_with(QUESTION_MARKER) {
                if let Some(open) = current.take() {
                    // 默认严格：未闭合的块使整个题库加载失败，不产生部分题库；宽松模式才丢弃
                    if !self.lenient {
                        return Err(BankError::UnclosedBlock {
                            block: open.number,
                            line: open.start_line,
                        });
                    }
                    warn!(
                        "⚠️ 第 {} 个题目块未闭合 (第 {} 行)，已丢弃",
                        open.number, open.start_line
                    );
                }
                block_count += 1;
                current = Some(OpenBlock::new(block_count, line_no));
                mode = Mode::Text;
                continue;
            }

            if line.starts_with(ANSWERS_MARKER) {
                if current.is_none() {
                    return Err(unexpected(ANSWERS_MARKER, line_no));
                }
                mode = Mode::Answers;
                continue;
            }

            if line.starts_with(END_MARKER) {
                let open = current
                    .take()
                    .ok_or_else(|| unexpected(END_MARKER, line_no))?;
                questions.push(open.close(line_no)?);
                mode = Mode::Outside;
                continue;
            }

            match (mode, current.as_mut()) {
                (Mode::Text, Some(open)) => open.text_parts.push(line.to_string()),
                (Mode::Answers, Some(open)) => match parse_index_line(line) {
                    Some(index) => open.correct = Some(index),
                    None => open.answers.push(line.to_string()),
                },
                _ => debug!("跳过题目块之外的第 {} 行: {}", line_no, line),
            }
        }

        if let Some(open) = current {
            return Err(BankError::UnclosedBlock {
                block: open.number,
                line: open.start_line,
            });
        }

        Ok(questions)
    }
}

/// 整行是整数时返回其值；超出 i64 的值饱和处理，之后按越界报错
fn parse_index_line(line: &str) -> Option<i64> {
    let digits = line.strip_prefix(['+', '-']).unwrap_or(line);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match line.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if line.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

fn unexpected(marker: &str, line: usize) -> BankError {
    BankError::UnexpectedMarker {
        marker: marker.to_string(),
        line,
    }
}

/// 从文件加载题库
///
/// 文件不存在与内容错误分别返回 `QuizError::File` 与 `QuizError::Bank`
pub async fn load_bank(path: impl AsRef<Path>, parser: &BankParser) -> AppResult<QuestionBank> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| QuizError::file_read_failed(path.display().to_string(), e))?;

    let bank = parser.parse(&content)?;
    info!(
        "成功从 {} 加载 {} 道题目",
        path.file_name().unwrap_or_default().to_string_lossy(),
        bank.len()
    );
    Ok(bank)
}
