//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责多模式、多词集的调度和重试，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理浏览器资源（Browser、JsExecutor、ChromeActions）
//! - 账号确认与登录
//! - 把站点能力和模式执行器交给编排器
//!
//! ### `session` - 学习会话编排器
//! - 每个模式重试直到 100% 或次数用尽
//! - 按 ID 范围遍历词集
//! - 在安全点检查停止信号
//!
//! ### `progress` - 进度事件
//! - 每次尝试、失败、重试都通过 `ProgressSink` 通知上层
//!
//! ## 层次关系
//!
//! ```text
//! app (Browser / 账号 / CLI 入口)
//!     ↓
//! session (处理 Vec<SetInfo> × Vec<ModeTag>)
//!     ↓
//! workflow::ModeRunner (处理单个学习模式)
//!     ↓
//! services (能力层：resolver / vocabulary / catalog)
//!     ↓
//! infrastructure (基础设施：JsExecutor / ChromeActions)
//! ```
//!
//! ## 设计原则
//!
//! 1. **只依赖接口**：session 只认识 `StudySite` 和 `ModeExecutor`
//! 2. **资源隔离**：只有 app 持有 Browser
//! 3. **串行执行**：同一个浏览器上同一时间只有一个学习模式在运行

pub mod app;
pub mod progress;
pub mod session;

// 重新导出主要类型
pub use app::{App, BrowserStudySite};
pub use progress::{ProgressEvent, ProgressSink, TracingProgress};
pub use session::{ModeReport, RangeReport, SessionOrchestrator, SetReport, StudySite};
