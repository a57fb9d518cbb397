pub mod presenter;
pub mod result_log;

pub use presenter::{Presenter, TerminalPresenter};
pub use result_log::{MemorySink, ResultLog, ResultSink};
