//! 테스트학습（输入与选择混合）
//!
//! 每道题可能是输入框，也可能是选择题：先试输入框，没有再找选项。

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::error::ActionError;
use crate::infrastructure::{BrowserActions, Locator, LocatorChain};
use crate::models::ModeTag;
use crate::services::resolver::choice_matches;
use crate::workflow::card_ctx::CardCtx;
use crate::workflow::mode_runner::{
    Answer, EntryPlan, EntryStep, ModeStrategy, RunnerSettings, Submission,
};

/// 未知单词时输入的占位答案
pub const SENTINEL_ANSWER: &str = "모름";

/// 开始前关闭遮罩层的次数
const DISMISS_ATTEMPTS: usize = 3;

/// 테스트학습策略
pub struct TestStrategy;

impl TestStrategy {
    pub fn prompt(card: usize) -> Locator {
        Locator::xpath(format!(
            "//*[@id='testForm']/div[{}]/div/div[1]/div[2]/div[2]/div/div",
            card
        ))
    }

    pub fn input(card: usize) -> Locator {
        Locator::xpath(format!(
            "//*[@id='testForm']/div[{}]/div/div[2]/div/div[2]/div[1]/input",
            card
        ))
    }

    pub fn submit(card: usize) -> Locator {
        Locator::xpath(format!(
            "//*[@id='testForm']/div[{}]/div/div[2]/div/div[2]/div[2]/a",
            card
        ))
    }

    pub fn choices(card: usize) -> Locator {
        Locator::xpath(format!(
            "/html/body/div[2]/div/div[2]/div[2]/form/div[{}]/div/div[2]/div/div[1]",
            card
        ))
    }

    /// 输入型题目：输入后点提交。没有输入框时返回 `Ok(false)`
    async fn try_typed(
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        text: &str,
        settings: &RunnerSettings,
    ) -> Result<bool, ActionError> {
        match browser.type_text(&Self::input(ctx.card), text).await {
            Ok(()) => {}
            Err(ActionError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        }
        browser
            .click(&Self::submit(ctx.card), settings.element_timeout)
            .await?;
        debug!("{} 输入型题目已提交", ctx);
        Ok(true)
    }
}

#[async_trait]
impl ModeStrategy for TestStrategy {
    fn mode(&self) -> ModeTag {
        ModeTag::Test
    }

    fn entry_plan(&self) -> EntryPlan {
        EntryPlan {
            dismiss_attempts: DISMISS_ATTEMPTS,
            steps: vec![
                EntryStep::required(
                    "테스트 입구",
                    Locator::xpath("/html/body/div[2]/div/div[2]/div[2]/div"),
                )
                .with_modal_retry(),
                EntryStep::optional(
                    "조건 확인",
                    Locator::css(".btn.btn-success.btn-lg.shadow.w-250.btn-condition-next"),
                ),
                EntryStep::optional(
                    "다시 시작",
                    Locator::css(
                        "#wrapper-test > div > div.quiz-start-div > div.layer.retry-layer.box > div.m-t-xl > a",
                    ),
                ),
                EntryStep::optional(
                    "테스트 시작",
                    Locator::css(".btn.btn-success.btn-xl.shadow.w-250.btn-quiz-start"),
                )
                .with_modal_retry(),
                EntryStep::optional(
                    "응시 확인",
                    LocatorChain::new()
                        .css(".btn.btn-primary.shadow.btn-ok.m-l-xs")
                        .css(".btn.shadow.btn-ok.m-l-xs.btn-danger"),
                ),
                EntryStep::optional(
                    "유의사항 확인",
                    Locator::css(
                        "#alertModal > div.modal-dialog > div > div.text-center.m-t-xl > a",
                    ),
                ),
            ],
        }
    }

    fn prompt_locators(&self, card: usize) -> LocatorChain {
        Self::prompt(card).into()
    }

    /// 先点开题目卡片
    async fn prepare_card(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        settings: &RunnerSettings,
    ) -> Result<(), ActionError> {
        browser
            .click(&Self::prompt(ctx.card), settings.element_timeout)
            .await?;
        sleep(settings.action_delay).await;
        Ok(())
    }

    async fn submit_answer(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        answer: Answer<'_>,
        settings: &RunnerSettings,
    ) -> Result<Submission, ActionError> {
        if Self::try_typed(browser, ctx, answer.answer, settings).await? {
            return Ok(Submission::Submitted);
        }

        let container = Self::choices(ctx.card);
        let options = browser.child_texts(&container).await?;
        match options
            .iter()
            .position(|choice| choice_matches(choice, answer.prompt, answer.answer, answer.table))
        {
            Some(index) => {
                debug!("{} 选择第 {} 项: '{}'", ctx, index + 1, options[index]);
                browser.click_child(&container, index).await?;
                Ok(Submission::Submitted)
            }
            None => Ok(Submission::NoMatch),
        }
    }

    async fn submit_fallback(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        settings: &RunnerSettings,
    ) -> Result<(), ActionError> {
        if Self::try_typed(browser, ctx, SENTINEL_ANSWER, settings).await? {
            return Ok(());
        }
        browser.click_child(&Self::choices(ctx.card), 0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;
    use crate::infrastructure::fake::{FakeBrowser, Recorded};
    use crate::models::{RunOutcome, RunResult};
    use crate::workflow::mode_runner::tests::{instant_settings, table};
    use crate::workflow::mode_runner::ModeRunner;

    #[tokio::test]
    async fn test_mixed_typed_and_choice_cards() {
        let words = table(&[("apple", "사과"), ("dog", "개")]);
        let browser = FakeBrowser::new()
            .with_text(TestStrategy::prompt(1), "apple\n1/2")
            .with_input(TestStrategy::input(1))
            .with_text(TestStrategy::prompt(2), "개")
            .with_children(TestStrategy::choices(2), &["cat", "dog"]);
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&TestStrategy, &words).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(2, 2)));
        let recorded = browser.recorded();
        assert!(recorded.contains(&Recorded::Type(TestStrategy::input(1), "사과".to_string())));
        assert!(recorded.contains(&Recorded::Click(TestStrategy::submit(1))));
        assert!(recorded.contains(&Recorded::ClickChild(TestStrategy::choices(2), 1)));
        // 每道题先点开
        assert!(browser.clicked(&TestStrategy::prompt(1)));
        assert!(browser.clicked(&TestStrategy::prompt(2)));
    }

    #[tokio::test]
    async fn test_prelude_dismisses_overlays_and_tolerates_optional_steps() {
        let words = table(&[("apple", "사과")]);
        let browser = FakeBrowser::new()
            .with_unavailable(Locator::css(
                ".btn.btn-success.btn-lg.shadow.w-250.btn-condition-next",
            ))
            .with_unavailable(Locator::css(".btn.btn-primary.shadow.btn-ok.m-l-xs"))
            .with_text(TestStrategy::prompt(1), "사과")
            .with_input(TestStrategy::input(1));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&TestStrategy, &words).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(1, 1)));
        let recorded = browser.recorded();
        assert_eq!(recorded.first(), Some(&Recorded::DismissOverlays));
        assert!(browser.clicked(&Locator::css(".btn.shadow.btn-ok.m-l-xs.btn-danger")));
        assert_eq!(browser.typed(), vec!["apple"]);
    }

    #[tokio::test]
    async fn test_missing_quiz_start_button_is_tolerated() {
        let words = table(&[("apple", "사과")]);
        let browser = FakeBrowser::new()
            .with_unavailable(Locator::css(
                ".btn.btn-success.btn-xl.shadow.w-250.btn-quiz-start",
            ))
            .with_text(TestStrategy::prompt(1), "apple")
            .with_input(TestStrategy::input(1));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&TestStrategy, &words).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(1, 1)));
        assert_eq!(browser.typed(), vec!["사과"]);
    }

    #[tokio::test]
    async fn test_missing_entry_button_fails_run() {
        let words = table(&[("apple", "사과"), ("dog", "개")]);
        let browser = FakeBrowser::new()
            .with_unavailable(Locator::xpath("/html/body/div[2]/div/div[2]/div[2]/div"));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&TestStrategy, &words).await;

        assert!(matches!(
            outcome,
            RunOutcome::Failed {
                result: RunResult { completed: 0, total: 2 },
                reason: RunnerError::EntryActionUnavailable { .. },
            }
        ));
    }

    #[tokio::test]
    async fn test_total_is_word_table_length() {
        let words = table(&[("apple", "사과"), ("dog", "개"), ("cat", "고양이")]);
        let browser = FakeBrowser::new()
            .with_text(
                Locator::xpath("/html/body/div[2]/div/div[2]/div[1]/div/span[2]/span"),
                "1",
            )
            .with_text(TestStrategy::prompt(1), "dog")
            .with_input(TestStrategy::input(1))
            .with_text(TestStrategy::prompt(2), "고양이")
            .with_children(TestStrategy::choices(2), &["cat", "dog"])
            .with_text(TestStrategy::prompt(3), "apple")
            .with_input(TestStrategy::input(3));
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&TestStrategy, &words).await;

        assert_eq!(outcome.result().total, words.len());
        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(3, 3)));
    }

    #[tokio::test]
    async fn test_unknown_word_in_choice_card_clicks_first_option() {
        let words = table(&[("apple", "사과")]);
        let browser = FakeBrowser::new()
            .with_text(TestStrategy::prompt(1), "banana")
            .with_children(TestStrategy::choices(1), &["바나나", "사과"]);
        let runner = ModeRunner::new(&browser, instant_settings());

        let outcome = runner.run(&TestStrategy, &words).await;

        assert_eq!(outcome, RunOutcome::Completed(RunResult::new(0, 1)));
        assert!(browser
            .recorded()
            .contains(&Recorded::ClickChild(TestStrategy::choices(1), 0)));
    }
}
