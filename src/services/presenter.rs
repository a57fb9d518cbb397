//! 展示服务 - 业务能力层
//!
//! 负责"把一道题展示给用户并拿到选择"，不关心计时与计分

use anyhow::Result;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::warn;

use crate::models::{Question, SessionReport};
use crate::workflow::QuestionCtx;

/// 展示层接口
///
/// 终端、图形界面或 HTTP 处理器都可以实现
#[allow(async_fn_in_trait)]
pub trait Presenter {
    /// 展示一道题，返回所选选项下标（从 0 开始），`None` 表示放弃
    async fn present_question(
        &mut self,
        ctx: &QuestionCtx,
        question: &Question,
    ) -> Result<Option<usize>>;

    /// 展示会话报告
    fn show_summary(&mut self, report: &SessionReport);

    /// 询问一个整数，空输入使用默认值，`None` 表示放弃
    async fn prompt_number(&mut self, label: &str, default: i64) -> Result<Option<i64>>;
}

/// 终端展示
///
/// 输入行来自通道：生产环境由专用线程读取 stdin，
/// 这样等待输入时计时器到期可以直接丢弃等待而不阻塞运行时
pub struct TerminalPresenter<W: Write> {
    input: mpsc::UnboundedReceiver<String>,
    output: W,
}

impl TerminalPresenter<std::io::Stdout> {
    /// 读取标准输入、写入标准输出
    pub fn stdio() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("读取标准输入失败: {}", e);
                        break;
                    }
                }
            }
        });
        Self::new(rx, std::io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(input: mpsc::UnboundedReceiver<String>, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        Ok(self.input.recv().await.map(|line| line.trim().to_string()))
    }
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("q")
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    async fn present_question(
        &mut self,
        ctx: &QuestionCtx,
        question: &Question,
    ) -> Result<Option<usize>> {
        writeln!(self.output, "\n{} {}", ctx, question.text())?;
        for (idx, answer) in question.answers().iter().enumerate() {
            writeln!(self.output, "  {}) {}", idx + 1, answer)?;
        }

        loop {
            let Some(input) = self.ask("请输入选项序号 (q 放弃): ").await? else {
                return Ok(None);
            };
            if is_quit(&input) {
                return Ok(None);
            }
            match input.parse::<usize>() {
                Ok(n) if (1..=question.answers().len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(
                    self.output,
                    "无效输入，请输入 1 到 {} 之间的数字",
                    question.answers().len()
                )?,
            }
        }
    }

    fn show_summary(&mut self, report: &SessionReport) {
        let result = writeln!(
            self.output,
            "\n答题结束 ({})\n已答题目: {}\n答对题目: {}\n正确率: {:.2}%",
            report.reason, report.asked_count, report.correct_count, report.accuracy_percent
        );
        if let Err(e) = result {
            warn!("输出答题报告失败: {}", e);
        }
    }

    async fn prompt_number(&mut self, label: &str, default: i64) -> Result<Option<i64>> {
        loop {
            let prompt = format!("{} [默认 {}]: ", label, default);
            let Some(input) = self.ask(&prompt).await? else {
                return Ok(None);
            };
            if is_quit(&input) {
                return Ok(None);
            }
            if input.is_empty() {
                return Ok(Some(default));
            }
            match input.parse::<i64>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "无效输入，请输入整数")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FinishReason;

    fn presenter(lines: &[&str]) -> TerminalPresenter<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        TerminalPresenter::new(rx, Vec::new())
    }

    fn question() -> Question {
        Question::new("What is 2+2?", vec!["3".into(), "4".into(), "5".into()], 1).unwrap()
    }

    fn output(p: TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(p.into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_present_question_returns_zero_based_choice() {
        let mut p = presenter(&["2"]);
        let ctx = QuestionCtx::new(1, 3);
        let choice = p.present_question(&ctx, &question()).await.unwrap();
        assert_eq!(choice, Some(1));

        let out = output(p);
        assert!(out.contains("[第 1/3 题] What is 2+2?"));
        assert!(out.contains("  2) 4"));
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts() {
        let mut p = presenter(&["9", "abc", "3"]);
        let choice = p
            .present_question(&QuestionCtx::new(1, 1), &question())
            .await
            .unwrap();
        assert_eq!(choice, Some(2));
        assert_eq!(output(p).matches("无效输入").count(), 2);
    }

    #[tokio::test]
    async fn test_quit_and_eof_mean_abandon() {
        let mut p = presenter(&["q"]);
        assert_eq!(
            p.present_question(&QuestionCtx::new(1, 1), &question())
                .await
                .unwrap(),
            None
        );

        let mut p = presenter(&[]);
        assert_eq!(
            p.present_question(&QuestionCtx::new(1, 1), &question())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_prompt_number_default_and_value() {
        let mut p = presenter(&["", "x", "-3"]);
        assert_eq!(p.prompt_number("题目数量", 10).await.unwrap(), Some(10));
        assert_eq!(p.prompt_number("题目数量", 10).await.unwrap(), Some(-3));
    }

    #[test]
    fn test_show_summary_formats_accuracy() {
        let mut p = presenter(&[]);
        p.show_summary(&SessionReport::new(3, 1, FinishReason::TimeExpired));
        let out = output(p);
        assert!(out.contains("时间到"));
        assert!(out.contains("正确率: 33.33%"));
    }
}
