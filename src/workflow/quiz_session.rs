//! 答题会话状态机 - 流程层
//!
//! 状态：Idle → Running → Finished（终态）
//!
//! 答题流程与计时器是两条独立的控制线，二者共享的只有阶段与计分，
//! 全部放在同一把锁里。结束转换在锁内决定，胜出的一方在锁外
//! 执行一次副作用：取消计时器、写结果日志、发布报告。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::SessionError;
use crate::infrastructure::SessionClock;
use crate::models::{FinishReason, Question, QuestionBank, ResultRecord, SessionReport};
use crate::services::ResultSink;
use crate::utils::logging::log_session_start;
use crate::workflow::question_ctx::QuestionCtx;

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Finished,
}

/// 提交答案的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 还有题目，继续取下一题
    Continue,
    /// 本次提交结束了会话
    Finished(SessionReport),
    /// 会话已结束或没有待回答的题目，提交被忽略
    Ignored,
}

/// 会话状态快照（只读）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub target_count: usize,
    pub cursor: usize,
    pub asked_count: usize,
    pub correct_count: usize,
}

/// 锁保护的可变状态
struct SessionState {
    phase: SessionPhase,
    target_count: usize,
    cursor: usize,
    asked_count: usize,
    correct_count: usize,
    /// 已展示、尚未作答的题目在题库中的下标
    pending: Option<usize>,
    clock: Option<SessionClock>,
}

/// 结束转换的胜出者需要在锁外完成的工作
struct Finish {
    report: SessionReport,
    clock: Option<SessionClock>,
}

impl SessionState {
    fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            target_count: 0,
            cursor: 0,
            asked_count: 0,
            correct_count: 0,
            pending: None,
            clock: None,
        }
    }

    /// 只有 Running 状态能结束，重复调用返回 None
    fn finish(&mut self, reason: FinishReason) -> Option<Finish> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.phase = SessionPhase::Finished;
        self.pending = None;
        Some(Finish {
            report: SessionReport::new(self.asked_count, self.correct_count, reason),
            clock: self.clock.take(),
        })
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            target_count: self.target_count,
            cursor: self.cursor,
            asked_count: self.asked_count,
            correct_count: self.correct_count,
        }
    }
}

/// 会话与计时器回调共享的部分
struct Shared {
    state: Mutex<SessionState>,
    sink: Arc<dyn ResultSink>,
    finished: watch::Sender<Option<SessionReport>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self, reason: FinishReason) -> Option<SessionReport> {
        let finish = self.lock().finish(reason)?;
        Some(self.deliver(finish))
    }

    fn deliver(&self, finish: Finish) -> SessionReport {
        if let Some(clock) = finish.clock {
            clock.cancel();
        }

        let report = finish.report;
        info!("🏁 会话结束 ({}): {}", report.reason, report);

        // 计时器到期时在计时任务内同步追加一行；失败只记录日志，不影响结束
        if let Err(e) = self.sink.append(&ResultRecord::now(&report)) {
            error!("写入结果日志失败: {:#}", e);
        }

        self.finished.send_replace(Some(report.clone()));
        report
    }
}

/// 一次答题会话
///
/// 每次开始答题都创建新的会话，计数不会在会话之间复用
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    shared: Arc<Shared>,
    tick: Duration,
}

impl QuizSession {
    /// 创建处于 Idle 状态的会话
    ///
    /// # 参数
    /// - `bank`: 已洗牌的题库
    /// - `sink`: 结果持久化
    /// - `tick`: 计时器轮询间隔
    pub fn new(bank: Arc<QuestionBank>, sink: Arc<dyn ResultSink>, tick: Duration) -> Self {
        let (finished, _) = watch::channel(None);
        Self {
            bank,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::idle()),
                sink,
                finished,
            }),
            tick,
        }
    }

    /// 开始答题并启动计时器
    ///
    /// 题目数量会截断到题库大小；参数无效或不在 tokio 运行时内时会话保持 Idle
    pub fn start(&self, question_count: i64, duration_secs: i64) -> Result<(), SessionError> {
        if question_count < 1 || duration_secs < 1 {
            return Err(SessionError::InvalidParameters {
                question_count,
                duration_secs,
            });
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(SessionError::NoRuntime);
        }

        let mut state = self.shared.lock();
        if state.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }

        let target_count = (question_count as u64).min(self.bank.len() as u64) as usize;
        let weak = Arc::downgrade(&self.shared);
        let clock = SessionClock::start(
            Duration::from_secs(duration_secs as u64),
            self.tick,
            move || {
                if let Some(shared) = weak.upgrade() {
                    shared.finish(FinishReason::TimeExpired);
                }
            },
        );

        *state = SessionState {
            phase: SessionPhase::Running,
            target_count,
            clock: Some(clock),
            ..SessionState::idle()
        };

        log_session_start(target_count, question_count, duration_secs);
        Ok(())
    }

    /// 取下一道题
    ///
    /// 上一题尚未作答时返回同一道题；已答满或会话不在运行时返回 None
    pub fn next_question(&self) -> Option<(QuestionCtx, Question)> {
        let mut state = self.shared.lock();
        if state.phase != SessionPhase::Running {
            return None;
        }

        let index = match state.pending {
            Some(index) => index,
            None => {
                if state.asked_count >= state.target_count || state.cursor >= self.bank.len() {
                    return None;
                }
                let index = state.cursor;
                state.cursor += 1;
                state.pending = Some(index);
                index
            }
        };

        let ctx = QuestionCtx::new(state.asked_count + 1, state.target_count);
        self.bank.get(index).map(|q| (ctx, q.clone()))
    }

    /// 提交当前题目的答案，`None` 表示放弃并结束会话
    pub fn submit_answer(&self, selected: Option<usize>) -> SubmitOutcome {
        let finish = {
            let mut state = self.shared.lock();
            if state.phase != SessionPhase::Running {
                debug!("会话已不在运行，忽略提交: {:?}", selected);
                return SubmitOutcome::Ignored;
            }

            match selected {
                None => {
                    info!("用户放弃作答");
                    state.finish(FinishReason::Abandoned)
                }
                Some(choice) => {
                    let Some(index) = state.pending.take() else {
                        warn!("当前没有待回答的题目，忽略提交");
                        return SubmitOutcome::Ignored;
                    };

                    let question = self.bank.get(index);
                    let correct = question.is_some_and(|q| q.is_correct(choice));
                    if correct {
                        state.correct_count += 1;
                    }
                    state.asked_count += 1;
                    if correct {
                        debug!("第 {}/{} 题 ✓ 正确", state.asked_count, state.target_count);
                    } else {
                        debug!(
                            "第 {}/{} 题 ✗ 错误，正确答案: {}",
                            state.asked_count,
                            state.target_count,
                            question.and_then(Question::correct_answer).unwrap_or("-")
                        );
                    }

                    if state.asked_count < state.target_count {
                        return SubmitOutcome::Continue;
                    }
                    state.finish(FinishReason::Completed)
                }
            }
        };

        match finish {
            Some(finish) => SubmitOutcome::Finished(self.shared.deliver(finish)),
            None => SubmitOutcome::Ignored,
        }
    }

    /// 放弃作答
    pub fn abandon(&self) -> Option<SessionReport> {
        match self.submit_answer(None) {
            SubmitOutcome::Finished(report) => Some(report),
            _ => None,
        }
    }

    /// 强制结束（计时器到期走的路径），已结束时返回 None
    pub fn force_finish(&self) -> Option<SessionReport> {
        self.shared.finish(FinishReason::TimeExpired)
    }

    /// 订阅结束事件，值变为 Some 即会话结束
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionReport>> {
        self.shared.finished.subscribe()
    }

    /// 等待会话结束并返回报告
    ///
    /// 对从未开始的会话会一直等待
    pub async fn wait_report(&self) -> Option<SessionReport> {
        let mut rx = self.subscribe();
        let report = rx.wait_for(Option::is_some).await.ok()?;
        report.clone()
    }

    pub fn report(&self) -> Option<SessionReport> {
        self.shared.finished.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.lock().phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock().snapshot()
    }
}
