pub mod catalog;
pub mod mode;
pub mod word_table;

pub use catalog::{ClassInfo, SetInfo, SetTask};
pub use mode::{ModeTag, RunOutcome, RunResult, UnknownMode};
pub use word_table::{RawCard, WordTable};
