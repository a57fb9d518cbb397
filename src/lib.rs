//! # Timed Quiz
//!
//! 限时选择题答题程序
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - `SessionClock`，独立任务中的可取消倒计时
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Presenter` / `TerminalPresenter` - 展示题目、收集选择
//! - `ResultSink` / `ResultLog` - 追加写入答题结果
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次答题"的完整过程
//! - `QuizSession` - 状态机（Idle → Running → Finished）
//! - `SessionFlow` - 一问一答往返，监听计时器结束
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 加载题库、收集参数、查看日志
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, BankError, FileError, QuizError, SessionError};
pub use infrastructure::SessionClock;
pub use models::{
    load_bank, BankParser, FinishReason, Question, QuestionBank, ResultRecord, SessionReport,
};
pub use orchestrator::App;
pub use services::{MemorySink, Presenter, ResultLog, ResultSink, TerminalPresenter};
pub use workflow::{QuestionCtx, QuizSession, SessionFlow, SessionPhase, SubmitOutcome};
