//! 站点目录服务 - 业务能力层
//!
//! 登录、班级列表、词集列表。页面数据先用脚本整体取回，再在 Rust 里解析。

use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AccountError, ActionError, AppError};
use crate::infrastructure::{BrowserActions, ChromeActions, Locator};
use crate::models::{ClassInfo, SetInfo};

/// 班级链接末尾的 ID
const CLASS_ID_PATTERN: &str = r"/([^/?#]+)/?(?:[?#].*)?$";

/// 卡片数文本中的数字
const CARD_COUNT_PATTERN: &str = r"(\d[\d,]*)";

/// "加入班级"入口，班级列表到此为止
const JOIN_CLASS_ID: &str = "joinClass";

/// 页面上的一个链接
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnchorInfo {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub text: String,
}

/// 词集列表中的一项
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetItemInfo {
    #[serde(default)]
    pub idx: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub count: String,
}

/// 站点目录服务
pub struct Catalog {
    base_url: String,
    entry_timeout: Duration,
    action_delay: Duration,
}

impl Catalog {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            entry_timeout: config.entry_timeout(),
            action_delay: config.action_delay(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 登录并返回用户 ID（页面全局变量 `c_u`）
    pub async fn login(
        &self,
        actions: &ChromeActions,
        login_id: &str,
        password: &str,
    ) -> Result<u64, AppError> {
        info!("🔐 正在登录: {}", login_id);
        actions.navigate(&self.url("/Login")).await?;

        let id_input = Locator::css("input[name='login_id']");
        let pw_input = Locator::css("input[name='login_pwd']");
        for input in [&id_input, &pw_input] {
            actions
                .wait_clickable(input, self.entry_timeout)
                .await
                .map_err(AccountError::LoginFormUnavailable)?;
        }

        actions
            .type_text(&id_input, login_id)
            .await
            .map_err(AccountError::LoginFormUnavailable)?;
        actions
            .type_text(&pw_input, password)
            .await
            .map_err(AccountError::LoginFormUnavailable)?;
        sleep(self.action_delay).await;

        actions
            .click(&Locator::css(".btn-login"), self.entry_timeout)
            .await
            .map_err(AccountError::LoginFormUnavailable)?;
        sleep(self.action_delay).await;

        let user_id = actions
            .executor()
            .eval("(() => (typeof c_u === 'undefined' || c_u === null) ? null : String(c_u))()")
            .await?;
        let user_id = user_id
            .as_str()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or(AccountError::LoginRejected)?;

        info!("✅ 登录成功, 用户ID: {}", user_id);
        Ok(user_id)
    }

    /// 当前页面左侧的班级列表
    pub async fn list_classes(&self, actions: &ChromeActions) -> Result<Vec<ClassInfo>, ActionError> {
        let anchors: Vec<AnchorInfo> = actions
            .executor()
            .eval_as(
                r#"
                (() => Array.from(document.querySelectorAll('.left-class-list a')).map(a => ({
                    href: a.getAttribute('href') || '',
                    text: (a.innerText || a.textContent || '').trim(),
                })))()
                "#,
            )
            .await?;
        let classes = parse_class_links(&anchors);
        debug!("找到 {} 个班级", classes.len());
        Ok(classes)
    }

    /// 班级中的词集列表
    pub async fn list_sets(
        &self,
        actions: &ChromeActions,
        class_id: &str,
    ) -> Result<Vec<SetInfo>, ActionError> {
        actions
            .navigate(&self.url(&format!("/ClassMain/{}", class_id)))
            .await?;
        sleep(self.action_delay).await;

        let items: Vec<SetItemInfo> = actions
            .executor()
            .eval_as(
                r#"
                (() => Array.from(document.querySelectorAll('.set-items a')).map(a => {
                    const span = a.querySelector('span');
                    return {
                        idx: a.getAttribute('data-idx') || '',
                        text: (a.innerText || a.textContent || '').trim(),
                        count: span ? (span.innerText || span.textContent || '').trim() : '',
                    };
                }))()
                "#,
            )
            .await?;
        let sets = parse_set_items(&items);
        debug!("班级 {} 有 {} 个词集", class_id, sets.len());
        Ok(sets)
    }
}

/// 解析班级链接，遇到"加入班级"即停止
pub fn parse_class_links(anchors: &[AnchorInfo]) -> Vec<ClassInfo> {
    let re = match Regex::new(CLASS_ID_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            warn!("班级链接正则无效: {}", e);
            return Vec::new();
        }
    };

    let mut classes = Vec::new();
    for anchor in anchors {
        let Some(class_id) = re
            .captures(&anchor.href)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };
        if class_id == JOIN_CLASS_ID {
            break;
        }
        classes.push(ClassInfo {
            class_id,
            name: anchor.text.clone(),
        });
    }
    classes
}

/// 解析词集列表；`data-idx` 不是数字的项会被跳过
pub fn parse_set_items(items: &[SetItemInfo]) -> Vec<SetInfo> {
    let count_re = Regex::new(CARD_COUNT_PATTERN).ok();
    items
        .iter()
        .filter_map(|item| {
            let Ok(set_id) = item.idx.trim().parse::<u64>() else {
                warn!("⚠️ 跳过无法识别的词集: '{}' (data-idx='{}')", item.text, item.idx);
                return None;
            };
            let card_count = count_re
                .as_ref()
                .and_then(|re| re.captures(&item.count))
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().replace(',', "").parse().ok());
            let title = if item.count.is_empty() {
                item.text.trim().to_string()
            } else {
                item.text.replace(&item.count, "").trim().to_string()
            };
            Some(SetInfo {
                set_id,
                title,
                card_count,
            })
        })
        .collect()
}
