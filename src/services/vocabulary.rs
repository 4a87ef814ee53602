//! 词表抓取服务 - 业务能力层
//!
//! 打开词集页面，切换到"全部范围"，读取所有翻转卡片的正反面。

use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ExtractionError;
use crate::infrastructure::{BrowserActions, ChromeActions, LocatorChain};
use crate::models::{RawCard, WordTable};

const RANGE_DROPDOWN: &str = "body > div.test > div.p-b-sm > div.set-body.m-t-25.m-b-lg > div.m-b-md.pos-relative > div.dropdown > a";
const RANGE_ALL: &str = "body > div.test > div.p-b-sm > div.set-body.m-t-25.m-b-lg > div.m-b-md.pos-relative > div.dropdown.open > ul > li:nth-child(1) > a";

/// 一面卡片文本的抓取结果
#[derive(Debug, Deserialize)]
struct SideScrape {
    found: bool,
    #[serde(default)]
    texts: Vec<String>,
}

/// 读取每张卡片某一面文本的脚本
fn side_script(side: &str) -> String {
    format!(
        r#"
        (() => {{
            const body = document.querySelector('.flip-body');
            if (!body) return {{ found: false, texts: [] }};
            const texts = Array.from(body.querySelectorAll('.flip-card')).map(card => {{
                const el = card.querySelector('.{side} .card-text');
                return el ? (el.innerText || el.textContent || '').trim() : '';
            }});
            return {{ found: true, texts }};
        }})()
        "#
    )
}

/// 按位置合并正反面；缺失的一面留空，保证位置对齐
pub fn merge_sides(fronts: Vec<String>, backs: Vec<String>) -> Vec<RawCard> {
    let len = fronts.len().max(backs.len());
    let mut fronts = fronts.into_iter();
    let mut backs = backs.into_iter();
    (0..len)
        .map(|_| RawCard {
            front: fronts.next().unwrap_or_default(),
            back: backs.next().unwrap_or_default(),
        })
        .collect()
}

/// 词表抓取服务
pub struct VocabularyExtractor {
    base_url: String,
    element_timeout: Duration,
    action_delay: Duration,
}

impl VocabularyExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            element_timeout: config.element_timeout(),
            action_delay: config.action_delay(),
        }
    }

    /// 词集页面地址
    pub fn set_url(&self, class_id: &str, set_id: u64) -> String {
        format!("{}/set/{}/{}", self.base_url, set_id, class_id)
    }

    /// 打开词集页面并抓取完整词表
    pub async fn fetch(
        &self,
        actions: &ChromeActions,
        class_id: &str,
        set_id: u64,
    ) -> Result<WordTable, ExtractionError> {
        actions.navigate(&self.set_url(class_id, set_id)).await?;
        sleep(self.action_delay).await;

        // 切换到全部范围
        actions
            .click_first(&LocatorChain::new().css(RANGE_DROPDOWN), self.element_timeout)
            .await?;
        actions
            .click_first(&LocatorChain::new().css(RANGE_ALL), self.element_timeout)
            .await?;
        sleep(self.action_delay / 2).await;

        let fronts = self.scrape_side(actions, set_id, "card-front").await?;

        // 切到目标语言显示（部分页面默认就是，失败不影响）
        let toggle = LocatorChain::new()
            .css("#tab_set_all > div.card-list-title > div > div:nth-child(1) > a")
            .xpath("//a[contains(text(), '한글')]")
            .xpath("//div[@class='card-list-title']//a[1]");
        match actions.click_first(&toggle, Duration::ZERO).await {
            Ok(hit) => {
                debug!("已切换到目标语言: {}", hit);
                sleep(self.action_delay).await;
            }
            Err(e) => warn!("⚠️ 无法切换目标语言显示: {}", e),
        }

        let backs = self.scrape_side(actions, set_id, "card-back").await?;

        let cards = merge_sides(fronts, backs);
        if cards.is_empty() {
            return Err(ExtractionError::NoCards { set_id });
        }

        let table = WordTable::from_cards(&cards);
        info!("📖 词集 {} 共 {} 张卡片", set_id, table.len());
        debug!("源语言: {:?}", table.source_terms());
        debug!("目标语言: {:?}", table.target_terms());
        Ok(table)
    }

    async fn scrape_side(
        &self,
        actions: &ChromeActions,
        set_id: u64,
        side: &str,
    ) -> Result<Vec<String>, ExtractionError> {
        let scrape: SideScrape = actions.executor().eval_as(side_script(side)).await?;
        if !scrape.found {
            return Err(ExtractionError::CardContainerMissing { set_id });
        }
        let blanks = scrape.texts.iter().filter(|t| t.is_empty()).count();
        if blanks > 0 {
            warn!("⚠️ 词集 {} 有 {} 张卡片的 {} 为空", set_id, blanks, side);
        }
        Ok(scrape.texts)
    }
}
