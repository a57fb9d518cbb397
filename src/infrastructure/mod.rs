pub mod session_clock;

pub use session_clock::SessionClock;
