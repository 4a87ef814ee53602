//! 리콜학습（选择题）

use async_trait::async_trait;

use crate::error::ActionError;
use crate::infrastructure::{BrowserActions, Locator, LocatorChain};
use crate::models::ModeTag;
use crate::services::resolver::choice_matches;
use crate::workflow::card_ctx::CardCtx;
use crate::workflow::mode_runner::{
    Answer, EntryPlan, EntryStep, ModeStrategy, RunnerSettings, Submission,
};

const ENTRY: &str = "/html/body/div[2]/div/div[2]/div[1]/div[2]";
const START: &str = "#wrapper-learn > div.start-opt-body > div > div > div > div.m-t > a";

/// 리콜학습策略：在选项中点击题面的配对词
pub struct RecallStrategy;

impl RecallStrategy {
    fn card_root(card: usize) -> String {
        format!(
            "//*[@id='wrapper-learn']/div[1]/div/div[2]/div[2]/div[{}]",
            card
        )
    }

    /// 第 card 张卡片的选项容器
    pub fn choices(card: usize) -> Locator {
        Locator::xpath(format!("{}/div[3]", Self::card_root(card)))
    }
}

#[async_trait]
impl ModeStrategy for RecallStrategy {
    fn mode(&self) -> ModeTag {
        ModeTag::Recall
    }

    fn entry_plan(&self) -> EntryPlan {
        EntryPlan {
            dismiss_attempts: 0,
            steps: vec![
                EntryStep::required("리콜학습 입구", Locator::xpath(ENTRY)),
                EntryStep::required("리콜학습 시작", Locator::css(START)),
            ],
        }
    }

    fn prompt_locators(&self, card: usize) -> LocatorChain {
        LocatorChain::new().xpath(format!(
            "{}/div[1]/div/div/div/div[1]/span",
            Self::card_root(card)
        ))
    }

    async fn submit_answer(
        &self,
        browser: &dyn BrowserActions,
        ctx: &CardCtx,
        answer: Answer<'_>,
        _settings: &RunnerSettings,
    ) -> Result<Submission, ActionError> {
        let container = Self::choices(ctx.card);
        let options = browser.child_texts(&container).await?;
        let hit = options
            .iter()
            .position(|choice| choice_matches(choice, answer.prompt, answer.answer, answer.table));

        match hit {
            Some(index) => {
                tracing::debug!("{} 选择第 {} 项: '{}'", ctx, index + 1, options[index]);
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
        _settings: &RunnerSettings,
    ) -> Result<(), ActionError> {
        browser.click_child(&Self::choices(ctx.card), 0).await
    }
}
