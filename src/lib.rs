//! # ClassCard Autopilot
//!
//! 一个驱动浏览器自动完成 ClassCard 单词学习模式的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `BrowserActions` - 查找、点击、输入、等待
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `resolver` - 根据题面在词表中找出答案
//! - `VocabularyExtractor` - 抓取词集的完整词表
//! - `Catalog` - 登录、班级列表、词集列表
//! - `AccountStore` / `ViewResetClient` - 账号文件、学习记录重置
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个学习模式"的完整处理流程
//! - `ModeRunner` - 通用的进入 → 逐张作答 → 退出流程
//! - `RecallStrategy` / `SpellingStrategy` / `TestStrategy` - 各模式的定位器与作答方式
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 多模式、多词集调度，重试到 100%
//! - `orchestrator/app` - 应用入口，管理浏览器资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::open_browser;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{ModeTag, RunOutcome, RunResult, SetInfo, SetTask, WordTable};
pub use orchestrator::{App, RangeReport, SessionOrchestrator, SetReport, StudySite};
pub use services::{resolve, Resolution};
pub use workflow::{ModeExecutor, ModeRunner, ModeStrategy};
