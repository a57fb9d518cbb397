//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把题库加载、参数收集、会话驱动与结果日志组合成完整的一次答题。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (加载题库 / 收集参数 / 查看日志)
//!     ↓
//! workflow::SessionFlow (一问一答的往返)
//!     ↓
//! workflow::QuizSession (状态机：计分与结束)
//!     ↓
//! services (能力层：展示 / 结果日志)
//!     ↓
//! infrastructure (基础设施：SessionClock)
//! ```

pub mod app;

pub use app::{App, LogSummary};
