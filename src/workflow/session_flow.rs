//! 答题驱动流程 - 流程层
//!
//! 核心职责：把会话与展示层连接起来
//!
//! 流程顺序：
//! 1. 取下一题 → 展示 → 等待作答（同时监听结束信号）
//! 2. 提交答案 → 继续或结束
//! 3. 展示报告（只展示一次）

use anyhow::Result;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::models::SessionReport;
use crate::services::Presenter;
use crate::utils::truncate_text;
use crate::workflow::quiz_session::{QuizSession, SessionPhase, SubmitOutcome};

/// 答题驱动流程
///
/// - 不持有会话，只负责一问一答的往返
/// - 等待作答时计时器到期，直接放弃等待
/// - 展示层出错时先放弃会话再返回错误，保证计时器不会继续运行
pub struct SessionFlow {
    verbose_logging: bool,
}

impl SessionFlow {
    /// 创建新的答题流程
    pub fn new(config: &Config) -> Self {
        Self {
            verbose_logging: config.verbose_logging,
        }
    }

    /// 驱动一个已经开始的会话直到结束
    pub async fn run<P: Presenter>(
        &self,
        session: &QuizSession,
        presenter: &mut P,
    ) -> Result<SessionReport> {
        if session.phase() == SessionPhase::Idle {
            anyhow::bail!("会话尚未开始");
        }

        let mut finished = session.subscribe();

        while let Some((ctx, question)) = session.next_question() {
            if self.verbose_logging {
                debug!("{} 展示题目: {}", ctx, truncate_text(question.text(), 40));
            }

            let answer = tokio::select! {
                biased;
                _ = finished.wait_for(Option::is_some) => {
                    info!("⏰ 会话已结束，停止等待作答");
                    break;
                }
                answer = presenter.present_question(&ctx, &question) => answer,
            };

            let answer = match answer {
                Ok(answer) => answer,
                Err(e) => {
                    error!("{} 展示题目失败: {:#}", ctx, e);
                    session.abandon();
                    return Err(e.context("展示题目失败"));
                }
            };

            match session.submit_answer(answer) {
                SubmitOutcome::Continue => {}
                SubmitOutcome::Finished(_) | SubmitOutcome::Ignored => break,
            }
        }

        let Some(report) = session.wait_report().await else {
            anyhow::bail!("会话没有产生报告");
        };
        presenter.show_summary(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinishReason, Question, QuestionBank};
    use crate::services::MemorySink;
    use crate::workflow::QuestionCtx;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    /// 按脚本作答的展示层；脚本用完后一直等待
    struct ScriptedPresenter {
        answers: VecDeque<Option<usize>>,
        shown: Vec<usize>,
        summaries: Vec<SessionReport>,
        fail: bool,
    }

    impl ScriptedPresenter {
        fn new(answers: Vec<Option<usize>>) -> Self {
            Self {
                answers: answers.into(),
                shown: Vec::new(),
                summaries: Vec::new(),
                fail: false,
            }
        }
    }

    impl Presenter for ScriptedPresenter {
        async fn present_question(
            &mut self,
            ctx: &QuestionCtx,
            _question: &Question,
        ) -> Result<Option<usize>> {
            self.shown.push(ctx.number);
            if self.fail {
                anyhow::bail!("display closed");
            }
            match self.answers.pop_front() {
                Some(answer) => Ok(answer),
                None => std::future::pending().await,
            }
        }

        fn show_summary(&mut self, report: &SessionReport) {
            self.summaries.push(report.clone());
        }

        async fn prompt_number(&mut self, _label: &str, default: i64) -> Result<Option<i64>> {
            Ok(Some(default))
        }
    }

    fn session() -> (QuizSession, Arc<MemorySink>) {
        // 两道题的正确答案都是下标 0
        let bank = QuestionBank::new(vec![
            Question::new("first", vec!["a".into(), "b".into()], 0).unwrap(),
            Question::new("second", vec!["a".into(), "b".into()], 0).unwrap(),
        ])
        .unwrap();
        let sink = Arc::new(MemorySink::new());
        let session = QuizSession::new(Arc::new(bank), sink.clone(), Duration::from_millis(100));
        (session, sink)
    }

    fn flow() -> SessionFlow {
        SessionFlow::new(&Config::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_to_completion_shows_summary_once() {
        let (session, sink) = session();
        session.start(2, 60).unwrap();
        let mut presenter = ScriptedPresenter::new(vec![Some(0), Some(1)]);

        let report = flow().run(&session, &mut presenter).await.unwrap();

        assert_eq!(report.asked_count, 2);
        assert_eq!(report.correct_count, 1);
        assert_eq!(report.accuracy_percent, 50.0);
        assert_eq!(presenter.shown, vec![1, 2]);
        assert_eq!(presenter.summaries, vec![report]);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_interrupts_waiting_presenter() {
        let (session, sink) = session();
        session.start(2, 5).unwrap();
        // 答完第一题后展示层一直不返回
        let mut presenter = ScriptedPresenter::new(vec![Some(0)]);

        let report = flow().run(&session, &mut presenter).await.unwrap();

        assert_eq!(report.reason, FinishReason::TimeExpired);
        assert_eq!(report.asked_count, 1);
        assert_eq!(presenter.summaries.len(), 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandon_ends_run() {
        let (session, _) = session();
        session.start(2, 60).unwrap();
        let mut presenter = ScriptedPresenter::new(vec![None]);

        let report = flow().run(&session, &mut presenter).await.unwrap();
        assert_eq!(report.reason, FinishReason::Abandoned);
        assert_eq!(report.asked_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presenter_error_abandons_session() {
        let (session, sink) = session();
        session.start(2, 60).unwrap();
        let mut presenter = ScriptedPresenter::new(Vec::new());
        presenter.fail = true;

        assert!(flow().run(&session, &mut presenter).await.is_err());
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(session.report().unwrap().reason, FinishReason::Abandoned);
        assert_eq!(sink.records().len(), 1);
        assert!(presenter.summaries.is_empty());
    }

    #[tokio::test]
    async fn test_idle_session_rejected() {
        let (session, _) = session();
        let mut presenter = ScriptedPresenter::new(Vec::new());
        assert!(flow().run(&session, &mut presenter).await.is_err());
    }
}
