//! 学习模式执行器
//!
//! 把 `ModeTag` 映射到具体策略，并用 `ModeRunner` 跑一次。

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::infrastructure::BrowserActions;
use crate::models::{ModeTag, RunOutcome, WordTable};
use crate::workflow::mode_runner::{ModeRunner, ModeStrategy, RunnerSettings};
use crate::workflow::recall::RecallStrategy;
use crate::workflow::spelling::SpellingStrategy;
use crate::workflow::test_mode::TestStrategy;

/// 执行一次学习模式的能力（编排层只依赖这个接口）
#[async_trait]
pub trait ModeExecutor: Send + Sync {
    async fn execute(&self, mode: ModeTag, table: &WordTable) -> RunOutcome;
}

/// 模式对应的策略
pub fn strategy_for(mode: ModeTag) -> &'static dyn ModeStrategy {
    match mode {
        ModeTag::Recall => &RecallStrategy,
        ModeTag::Spelling => &SpellingStrategy,
        ModeTag::Test => &TestStrategy,
    }
}

/// 在浏览器中执行学习模式
pub struct BrowserModeExecutor {
    browser: Arc<dyn BrowserActions>,
    settings: RunnerSettings,
}

impl BrowserModeExecutor {
    pub fn new(browser: Arc<dyn BrowserActions>, settings: RunnerSettings) -> Self {
        Self { browser, settings }
    }

    pub fn from_config(browser: Arc<dyn BrowserActions>, config: &Config) -> Self {
        Self::new(browser, RunnerSettings::from_config(config))
    }
}

#[async_trait]
impl ModeExecutor for BrowserModeExecutor {
    async fn execute(&self, mode: ModeTag, table: &WordTable) -> RunOutcome {
        let runner = ModeRunner::new(self.browser.as_ref(), self.settings.clone());
        runner.run(strategy_for(mode), table).await
    }
}
