//! 基础设施层（Infrastructure Layer）
//!
//! 持有唯一的 Page，对上只暴露"页面操作"能力：
//!
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / goto()
//! - `BrowserActions` - 学习模式使用的操作抽象（查找、点击、输入、等待）
//! - `ChromeActions` - 基于 JsExecutor 的 `BrowserActions` 实现

pub mod actions;
pub mod chrome_actions;
pub mod js_executor;

#[cfg(test)]
pub(crate) mod fake;

pub use actions::{BrowserActions, Locator, LocatorChain};
pub use chrome_actions::ChromeActions;
pub use js_executor::JsExecutor;
