pub mod question_ctx;
pub mod quiz_session;
pub mod session_flow;

pub use question_ctx::QuestionCtx;
pub use quiz_session::{QuizSession, SessionPhase, SessionSnapshot, SubmitOutcome};
pub use session_flow::SessionFlow;
