pub mod loaders;
pub mod question;
pub mod report;

pub use loaders::{load_bank, BankParser};
pub use question::{Question, QuestionBank};
pub use report::{FinishReason, ResultRecord, SessionReport};
