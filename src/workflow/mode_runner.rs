//! 学习模式运行器 - 流程层
//!
//! 三种学习模式共用同一套控制流程：
//!
//! ```text
//! Entering（点击入口/开始按钮）
//!     ↓
//! Running（逐张卡片：读题面 → 解析 → 作答）
//!     ↓
//! Completed / Aborted / Failed
//! ```
//!
//! 模式之间的差异（按钮、题面位置、作答方式）由 `ModeStrategy` 提供。

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ActionError, RunnerError};
use crate::infrastructure::{BrowserActions, Locator, LocatorChain};
use crate::models::{ModeTag, RunOutcome, RunResult, WordTable};
use crate::services::resolver::{resolve, Resolution};
use crate::workflow::card_ctx::CardCtx;

/// 结束学习的按钮
const EXIT_PRIMARY: &str = "a.cc.remote_left[onclick*='study_end']";
/// 打开菜单 → 点击"结束"
const EXIT_MENU: &str = "/html/body/div[1]/div/div[1]/div[1]";
const EXIT_MENU_END: &str = "//*[@id='wrapper-learn']/div[2]/div/div/div/div[5]/a[3]";

/// 运行器的等待与节奏参数
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// 必需按钮的等待时间
    pub entry_timeout: Duration,
    /// 可选按钮的等待时间
    pub optional_timeout: Duration,
    /// 题面、输入框等元素的等待时间
    pub element_timeout: Duration,
    /// 点击后的固定停顿
    pub action_delay: Duration,
    /// 每张卡片之后的停顿
    pub card_delay: Duration,
    /// 允许的未知单词数
    pub unknown_word_limit: usize,
}

impl RunnerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            entry_timeout: config.entry_timeout(),
            optional_timeout: config.optional_timeout(),
            element_timeout: config.element_timeout(),
            action_delay: config.action_delay(),
            card_delay: config.card_delay(),
            unknown_word_limit: config.unknown_word_limit,
        }
    }
}

/// 入口流程中的一步
#[derive(Debug, Clone)]
pub struct EntryStep {
    /// 日志与错误中使用的名称
    pub label: &'static str,
    pub locators: LocatorChain,
    /// 必需的步骤失败时整个运行失败；可选的步骤缺失直接跳过
    pub required: bool,
    /// 点击被遮罩拦截时，关闭遮罩后再试一次
    pub modal_retry: bool,
}

impl EntryStep {
    pub fn required(label: &'static str, locators: impl Into<LocatorChain>) -> Self {
        Self {
            label,
            locators: locators.into(),
            required: true,
            modal_retry: false,
        }
    }

    pub fn optional(label: &'static str, locators: impl Into<LocatorChain>) -> Self {
        Self {
            label,
            locators: locators.into(),
            required: false,
            modal_retry: false,
        }
    }

    pub fn with_modal_retry(mut self) -> Self {
        self.modal_retry = true;
        self
    }
}

/// 进入学习模式的完整流程
#[derive(Debug, Clone, Default)]
pub struct EntryPlan {
    /// 开始前关闭遮罩层的次数
    pub dismiss_attempts: usize,
    pub steps: Vec<EntryStep>,
}

/// 一次作答的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// 已提交答案
    Submitted,
    /// 选项中没有匹配答案（按未知单词处理）
    NoMatch,
}

/// 已解析出的答案
#[derive(Debug, Clone, Copy)]
pub struct Answer<'a> {
    pub prompt: &'a str,
    pub answer: &'a str,
    pub table: &'a WordTable,
}

/// 学习模式策略
///
/// 只描述"按哪个按钮、题面在哪、怎么作答"，流程本身由 `ModeRunner` 负责。
#[async_trait]
pub trait ModeStrategy: Send + Sync {
    fn mode(&self) -> ModeTag;

    fn entry_plan(&self) -> EntryPlan;

    /// 第 card 张卡片的题面位置
    fn prompt_locators(&self, card: usize) -> LocatorChain;

    /// 读题面之前的准备动作
    async fn prepare_card(
        &self,
        _browser: &dyn BrowserActions,
        _ctx: &CardCtx,
        _settings: &RunnerSettings,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    /// 提交解析出的答案
    async fn submit_answer(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        answer: Answer<'_>,
        settings: &RunnerSettings,
    ) -> Result<Submission, ActionError>;

    /// 未知单词的兜底作答
    async fn submit_fallback(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        settings: &RunnerSettings,
    ) -> Result<(), ActionError>;
}

/// 运行中的计数
#[derive(Debug, Default)]
struct RunnerState {
    completed: usize,
    unknown: usize,
    skipped: usize,
}

/// 题面元素的第一行（下面可能还有提示文字）
pub fn prompt_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

/// 学习模式运行器
pub struct ModeRunner<'a> {
    browser: &'a dyn BrowserActions,
    settings: RunnerSettings,
}

impl<'a> ModeRunner<'a> {
    pub fn new(browser: &'a dyn BrowserActions, settings: RunnerSettings) -> Self {
        Self { browser, settings }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// 用给定词表跑完一次学习模式
    pub async fn run(&self, strategy: &dyn ModeStrategy, table: &WordTable) -> RunOutcome {
        let mode = strategy.mode();
        info!("▶️ [{}] 开始学习, 词表共 {} 张卡片", mode.label(), table.len());

        if let Err(reason) = self.enter(strategy).await {
            warn!("❌ {}", reason);
            return RunOutcome::Failed {
                result: RunResult::new(0, table.len()),
                reason,
            };
        }

        let total = table.len();

        let mut state = RunnerState::default();
        for card in 1..=total {
            let ctx = CardCtx::new(mode, card, total);

            if let Err(e) = strategy.prepare_card(self.browser, &ctx, &self.settings).await {
                warn!("{} ⚠️ 准备卡片失败，跳过: {}", ctx, e);
                state.skipped += 1;
                continue;
            }

            let raw = match self
                .browser
                .find_text_first(&strategy.prompt_locators(card), self.settings.element_timeout)
                .await
            {
                Ok((_, text)) => text,
                Err(source) => {
                    let reason = RunnerError::PromptNotFound { mode, card, source };
                    warn!("❌ {}", reason);
                    return RunOutcome::Failed {
                        result: RunResult::new(state.completed, total),
                        reason,
                    };
                }
            };
            let prompt = prompt_line(&raw);
            debug!("{} 题面: '{}'", ctx, prompt);

            let submission = match resolve(prompt, table) {
                Resolution::Answer(answer) => {
                    debug!("{} 答案: '{}'", ctx, answer);
                    let answer = Answer {
                        prompt,
                        answer,
                        table,
                    };
                    match strategy
                        .submit_answer(self.browser, &ctx, answer, &self.settings)
                        .await
                    {
                        Ok(submission) => submission,
                        Err(e) => {
                            warn!("{} ⚠️ 作答失败，跳过: {}", ctx, e);
                            state.skipped += 1;
                            sleep(self.settings.card_delay).await;
                            continue;
                        }
                    }
                }
                Resolution::Unknown => Submission::NoMatch,
            };

            match submission {
                Submission::Submitted => state.completed += 1,
                Submission::NoMatch => {
                    state.unknown += 1;
                    warn!(
                        "{} ❓ 未知单词 '{}' ({}/{})",
                        ctx, prompt, state.unknown, self.settings.unknown_word_limit
                    );

                    if state.unknown > self.settings.unknown_word_limit {
                        let result = RunResult::new(state.completed, total);
                        let reason = RunnerError::UnknownWordLimitExceeded {
                            mode,
                            unknown: state.unknown,
                            limit: self.settings.unknown_word_limit,
                            prompt: prompt.to_string(),
                        };
                        warn!("⛔ {}, 已完成 {}", reason, result);
                        self.exit_sequence(mode).await;
                        return RunOutcome::Aborted { result, reason };
                    }

                    if let Err(e) = strategy
                        .submit_fallback(self.browser, &ctx, &self.settings)
                        .await
                    {
                        warn!("{} ⚠️ 兜底作答失败: {}", ctx, e);
                    }
                }
            }

            sleep(self.settings.card_delay).await;
        }

        let result = RunResult::new(state.completed, total);
        info!(
            "✅ [{}] 学习结束: {} (未知 {}, 跳过 {})",
            mode.label(),
            result,
            state.unknown,
            state.skipped
        );
        self.exit_sequence(mode).await;
        RunOutcome::Completed(result)
    }

    /// 执行入口流程
    async fn enter(&self, strategy: &dyn ModeStrategy) -> Result<(), RunnerError> {
        let mode = strategy.mode();
        let plan = strategy.entry_plan();

        for _ in 0..plan.dismiss_attempts {
            match self.browser.dismiss_overlays().await {
                Ok(0) => break,
                Ok(n) => {
                    debug!("[{}] 关闭了 {} 个遮罩层", mode.label(), n);
                    sleep(self.settings.action_delay).await;
                }
                Err(e) => {
                    debug!("[{}] 关闭遮罩层失败: {}", mode.label(), e);
                    break;
                }
            }
        }

        for step in &plan.steps {
            let timeout = if step.required {
                self.settings.entry_timeout
            } else {
                self.settings.optional_timeout
            };

            let mut clicked = self.browser.click_first(&step.locators, timeout).await;
            if step.modal_retry && matches!(clicked, Err(ActionError::Intercepted { .. })) {
                debug!("[{}] {} 被遮罩拦截，关闭后重试", mode.label(), step.label);
                if let Err(e) = self.browser.dismiss_overlays().await {
                    debug!("[{}] 关闭遮罩层失败: {}", mode.label(), e);
                }
                sleep(self.settings.action_delay).await;
                clicked = self.browser.click_first(&step.locators, timeout).await;
            }

            match clicked {
                Ok(hit) => {
                    debug!("[{}] ✓ {}: {}", mode.label(), step.label, hit);
                    sleep(self.settings.action_delay).await;
                }
                Err(source) if step.required => {
                    return Err(RunnerError::EntryActionUnavailable {
                        mode,
                        action: step.label.to_string(),
                        source,
                    });
                }
                Err(e) => debug!("[{}] 跳过可选步骤 {}: {}", mode.label(), step.label, e),
            }
        }

        Ok(())
    }

    /// 退出学习界面，失败只记日志
    async fn exit_sequence(&self, mode: ModeTag) {
        let timeout = self.settings.optional_timeout;

        match self.browser.click(&Locator::css(EXIT_PRIMARY), timeout).await {
            Ok(()) => {
                debug!("[{}] 已点击结束按钮", mode.label());
                sleep(self.settings.action_delay).await;
                return;
            }
            Err(e) => debug!("[{}] 结束按钮不可用: {}", mode.label(), e),
        }

        let via_menu = async {
            self.browser.click(&Locator::xpath(EXIT_MENU), timeout).await?;
            sleep(self.settings.action_delay).await;
            self.browser
                .click(&Locator::xpath(EXIT_MENU_END), timeout)
                .await
        };
        match via_menu.await {
            Ok(()) => {
                debug!("[{}] 已通过菜单退出", mode.label());
                sleep(self.settings.action_delay).await;
                return;
            }
            Err(e) => warn!("[{}] ⚠️ 找不到退出按钮，尝试后退: {}", mode.label(), e),
        }

        if let Err(e) = self.browser.go_back().await {
            warn!("[{}] ⚠️ 后退失败: {}", mode.label(), e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infrastructure::fake::{FakeBrowser, Recorded};

    pub(crate) fn instant_settings() -> RunnerSettings {
        RunnerSettings {
            entry_timeout: Duration::ZERO,
            optional_timeout: Duration::ZERO,
            element_timeout: Duration::ZERO,
            action_delay: Duration::ZERO,
            card_delay: Duration::ZERO,
            unknown_word_limit: 3,
        }
    }

    pub(crate) fn table(pairs: &[(&str, &str)]) -> WordTable {
        let source = pairs.iter().map(|(s, _)| s.to_string()).collect();
        let target: Vec<String> = pairs.iter().map(|(_, t)| t.to_string()).collect();
        WordTable::new(source, target.clone(), target).unwrap()
    }

    /// 输入型的最小策略
    struct TypedStub {
        modal_retry: bool,
    }

    fn prompt(card: usize) -> Locator {
        Locator::css(format!("#prompt-{}", card))
    }

    fn input(card: usize) -> Locator {
        Locator::css(format!("#input-{}", card))
    }

    #[async_trait]
    impl ModeStrategy for TypedStub {
        fn mode(&self) -> ModeTag {
            ModeTag::Spelling
        }

        fn entry_plan(&self) -> EntryPlan {
            let mut start = EntryStep::required("start", Locator::css("#start"));
            if self.modal_retry {
                start = start.with_modal_retry();
            }
            EntryPlan {
                dismiss_attempts: 0,
                steps: vec![
                    start,
                    EntryStep::optional("confirm", Locator::css("#confirm")),
                ],
            }
        }

        fn prompt_locators(&self, card: usize) -> LocatorChain {
            prompt(card).into()
        }

        async fn submit_answer(
            &self,
            browser: &dyn BrowserActions,
            ctx: &CardCtx,
            answer: Answer<'_>,
            _settings: &RunnerSettings,
        ) -> Result<Submission, ActionError> {
            browser.type_text(&input(ctx.card), answer.answer).await?;
            Ok(Submission::Submitted)
        }

        async fn submit_fallback(
            &self,
            browser: &dyn BrowserActions,
            ctx: &CardCtx,
            _settings: &RunnerSettings,
        ) -> Result<(), ActionError> {
            browser.type_text(&input(ctx.card), "unknown").await
        }
    }

    const STUB: TypedStub = TypedStub { modal_retry: false };

    fn words() -> WordTable {
        table(&[
            ("apple", "사과"),
            ("dog", "개"),
            ("cat", "고양이"),
            ("tree", "나무"),
            ("river", "강"),
        ])
    }

    /// 5 张卡片，题面依次为给定文本，输入框都存在
    fn browser_with_prompts(prompts: &[&str]) -> FakeBrowser {
        let mut browser = FakeBrowser::new();
        for (i, text) in prompts.iter().enumerate() {
            browser = browser
                .with_text(prompt(i + 1), text)
                .with_input(input(i + 1));
        }
        browser
    }

    #[tokio::test]
    async fn test_all_known_prompts_complete() {
        let browser = browser_with_prompts(&["사과", "dog", "고양이\n힌트", "tree", "강"]);
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &words()).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(5, 5)));
        assert_eq!(browser.typed(), vec!["apple", "개", "cat", "나무", "river"]);
        assert!(browser.clicked(&Locator::css(EXIT_PRIMARY)));
    }

    #[tokio::test]
    async fn test_three_unknowns_are_tolerated() {
        let browser = browser_with_prompts(&["사과", "x1", "x2", "tree", "x3"]);
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &words()).await;

        let result = outcome.result();
        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert_eq!(result, RunResult::new(2, 5));
        assert!(result.completed <= result.total);
        assert_eq!(
            browser.typed(),
            vec!["apple", "unknown", "unknown", "나무", "unknown"]
        );
    }

    #[tokio::test]
    async fn test_fourth_unknown_aborts_with_exit_sequence() {
        let browser = browser_with_prompts(&["x1", "x2", "x3", "x4", "강"]);
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &words()).await;

        match &outcome {
            RunOutcome::Aborted { result, reason } => {
                assert_eq!(*result, RunResult::new(0, 5));
                assert!(result.completed < result.total);
                assert_eq!(
                    *reason,
                    RunnerError::UnknownWordLimitExceeded {
                        mode: ModeTag::Spelling,
                        unknown: 4,
                        limit: 3,
                        prompt: "x4".to_string(),
                    }
                );
            }
            other => panic!("expected abort, got {:?}", other),
        }
        // 第 5 张卡片不再处理
        assert_eq!(browser.typed().len(), 3);
        assert!(browser.clicked(&Locator::css(EXIT_PRIMARY)));
    }

    #[tokio::test]
    async fn test_missing_required_entry_fails() {
        let browser =
            browser_with_prompts(&["사과"]).with_unavailable(Locator::css("#start"));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &table(&[("apple", "사과")])).await;

        assert!(matches!(
            outcome.reason(),
            Some(RunnerError::EntryActionUnavailable { action, .. }) if action == "start"
        ));
        assert_eq!(outcome.result(), RunResult::new(0, 1));
        assert!(browser.typed().is_empty());
    }

    #[tokio::test]
    async fn test_missing_optional_entry_is_skipped() {
        let browser =
            browser_with_prompts(&["사과"]).with_unavailable(Locator::css("#confirm"));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &table(&[("apple", "사과")])).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(1, 1)));
    }

    #[tokio::test]
    async fn test_intercepted_entry_retries_after_dismissing() {
        let browser =
            browser_with_prompts(&["사과"]).with_intercept_once(Locator::css("#start"));
        let runner = ModeRunner::new(&browser, instant_settings());

        let strategy = TypedStub { modal_retry: true };
        let outcome = runner.run(&strategy, &table(&[("apple", "사과")])).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(1, 1)));
        let recorded = browser.recorded();
        let dismiss = recorded
            .iter()
            .position(|r| *r == Recorded::DismissOverlays)
            .unwrap();
        let start = recorded
            .iter()
            .position(|r| *r == Recorded::Click(Locator::css("#start")))
            .unwrap();
        assert!(dismiss < start);
    }

    #[tokio::test]
    async fn test_intercepted_entry_without_retry_fails() {
        let browser =
            browser_with_prompts(&["사과"]).with_intercept_once(Locator::css("#start"));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &table(&[("apple", "사과")])).await;

        assert!(matches!(
            outcome,
            RunOutcome::Failed {
                reason: RunnerError::EntryActionUnavailable { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_prompt_fails_without_exit() {
        let browser = FakeBrowser::new()
            .with_text(prompt(1), "사과")
            .with_input(input(1));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner
            .run(&STUB, &table(&[("apple", "사과"), ("dog", "개")]))
            .await;

        match outcome {
            RunOutcome::Failed { result, reason } => {
                assert_eq!(result, RunResult::new(1, 2));
                assert!(matches!(reason, RunnerError::PromptNotFound { card: 2, .. }));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!browser.clicked(&Locator::css(EXIT_PRIMARY)));
    }

    #[tokio::test]
    async fn test_card_action_error_skips_card() {
        // 第 2 张卡片没有输入框
        let browser = FakeBrowser::new()
            .with_text(prompt(1), "사과")
            .with_input(input(1))
            .with_text(prompt(2), "개")
            .with_text(prompt(3), "cat")
            .with_input(input(3));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner
            .run(
                &STUB,
                &table(&[("apple", "사과"), ("dog", "개"), ("cat", "고양이")]),
            )
            .await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(2, 3)));
        assert_eq!(browser.typed(), vec!["apple", "고양이"]);
    }

    #[tokio::test]
    async fn test_exit_falls_back_to_go_back() {
        let browser = browser_with_prompts(&["사과"])
            .with_unavailable(Locator::css(EXIT_PRIMARY))
            .with_unavailable(Locator::xpath(EXIT_MENU));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&STUB, &table(&[("apple", "사과")])).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(1, 1)));
        assert_eq!(browser.recorded().last(), Some(&Recorded::Back));
    }

    #[test]
    fn test_prompt_line_takes_first_line() {
        assert_eq!(prompt_line("  apple \n(n.) 사과"), "apple");
        assert_eq!(prompt_line(""), "");
    }
}
