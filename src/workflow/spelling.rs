//! 스펠학습（拼写输入）

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::error::ActionError;
use crate::infrastructure::{BrowserActions, LocatorChain};
use crate::models::ModeTag;
use crate::workflow::card_ctx::CardCtx;
use crate::workflow::mode_runner::{
    Answer, EntryPlan, EntryStep, ModeStrategy, RunnerSettings, Submission,
};

/// 未知单词时输入的占位答案
pub const SENTINEL_ANSWER: &str = "unknown";

/// 스펠학습策略：在输入框中输入配对词并确认
pub struct SpellingStrategy;

impl SpellingStrategy {
    fn entry() -> LocatorChain {
        LocatorChain::new()
            .xpath("/html/body/div[2]/div/div[2]/div[1]/div[3]")
            .xpath("//div[contains(@class, 'set-body')]//a[contains(text(), '스펠')]")
            .xpath("//div[contains(@class, 'set-body')]//div[contains(text(), '스펠')]")
            .xpath("//a[contains(@class, 'btn') and contains(text(), '스펠')]")
            .xpath("//a[contains(text(), '스펠')]")
            .xpath("//a[contains(@href, 'spelling')]")
    }

    fn start() -> LocatorChain {
        LocatorChain::new()
            .xpath("/html/body/div[2]/div[2]/div/div/div/div[4]/a")
            .xpath("//a[contains(text(), '시작')]")
            .xpath("//button[contains(text(), '시작')]")
            .xpath("//a[contains(@class, 'btn') and contains(text(), '시작')]")
    }

    pub fn input(card: usize) -> LocatorChain {
        LocatorChain::new()
            .xpath(format!(
                "/html/body/div[2]/div[1]/div/div[2]/div[2]/div[{}]/div[2]/div/div/div/div[2]/input",
                card
            ))
            .xpath("//input[@type='text']")
            .xpath("//input[contains(@class, 'answer')]")
            .xpath("//input[contains(@placeholder, '단어')]")
    }

    pub fn submit() -> LocatorChain {
        LocatorChain::new()
            .xpath("//*[@id='wrapper-learn']/div/div/div[3]")
            .xpath("//button[contains(text(), '확인')]")
            .xpath("//button[contains(text(), '제출')]")
            .xpath("//a[contains(text(), '확인')]")
    }

    pub fn next() -> LocatorChain {
        LocatorChain::new()
            .xpath("//*[@id='wrapper-learn']/div/div/div[3]/div[2]")
            .xpath("//button[contains(text(), '다음')]")
            .xpath("//a[contains(text(), '다음')]")
    }

    /// 输入 → 确认 → （如果有）下一张
    async fn type_and_submit(
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        text: &str,
        settings: &RunnerSettings,
    ) -> Result<(), ActionError> {
        browser.type_first(&Self::input(ctx.card), text).await?;
        browser
            .click_first(&Self::submit(), settings.element_timeout)
            .await?;
        sleep(settings.action_delay).await;

        if let Ok(hit) = browser
            .click_first(&Self::next(), settings.optional_timeout)
            .await
        {
            debug!("{} 已点击下一张: {}", ctx, hit);
        }
        Ok(())
    }
}

#[async_trait]
impl ModeStrategy for SpellingStrategy {
    fn mode(&self) -> ModeTag {
        ModeTag::Spelling
    }

    fn entry_plan(&self) -> EntryPlan {
        EntryPlan {
            dismiss_attempts: 0,
            steps: vec![
                EntryStep::required("스펠학습 입구", Self::entry()),
                EntryStep::required("스펠학습 시작", Self::start()),
            ],
        }
    }

    fn prompt_locators(&self, card: usize) -> LocatorChain {
        LocatorChain::new()
            .xpath(format!(
                "//*[@id='wrapper-learn']/div[1]/div/div[2]/div[2]/div[{}]/div[1]/div/div/div/div[1]/span",
                card
            ))
            .xpath("//div[contains(@class, 'word')]//span[1]")
            .xpath("//div[contains(@class, 'question')]//span[1]")
            .xpath("//span[contains(@class, 'word')]")
    }

    async fn submit_answer(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        answer: Answer<'_>,
        settings: &RunnerSettings,
    ) -> Result<Submission, ActionError> {
        Self::type_and_submit(browser, ctx, answer.answer, settings).await?;
        Ok(Submission::Submitted)
    }

    async fn submit_fallback(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        settings: &RunnerSettings,
    ) -> Result<(), ActionError> {
        Self::type_and_submit(browser, ctx, SENTINEL_ANSWER, settings).await
    }
}
