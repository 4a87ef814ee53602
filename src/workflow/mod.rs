pub mod card_ctx;
pub mod executor;
pub mod mode_runner;
pub mod recall;
pub mod spelling;
pub mod test_mode;

pub use card_ctx::CardCtx;
pub use executor::{strategy_for, BrowserModeExecutor, ModeExecutor};
pub use mode_runner::{ModeRunner, ModeStrategy, RunnerSettings};
pub use recall::RecallStrategy;
pub use spelling::SpellingStrategy;
pub use test_mode::TestStrategy;
