//! 内存中的 `BrowserActions` 实现，仅用于测试

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::actions::{BrowserActions, Locator};
use crate::error::ActionError;

/// 记录下来的页面操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Click(Locator),
    ClickChild(Locator, usize),
    Type(Locator, String),
    DismissOverlays,
    Navigate(String),
    Back,
}

/// 默认所有点击都成功；文本、选项、输入框需要事先登记
#[derive(Default)]
pub(crate) struct FakeBrowser {
    texts: HashMap<Locator, String>,
    /// 文本出现之前需要未命中的次数
    misses: Mutex<HashMap<Locator, usize>>,
    lookups: Mutex<HashMap<Locator, usize>>,
    poll_interval: Duration,
    children: HashMap<Locator, Vec<String>>,
    inputs: HashSet<Locator>,
    unavailable: HashSet<Locator>,
    intercept_once: Mutex<HashSet<Locator>>,
    log: Mutex<Vec<Recorded>>,
}

impl FakeBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_text(mut self, locator: Locator, text: &str) -> Self {
        self.texts.insert(locator, text.to_string());
        self
    }

    pub(crate) fn with_text_after(mut self, locator: Locator, text: &str, misses: usize) -> Self {
        self.misses.lock().unwrap().insert(locator.clone(), misses);
        self.texts.insert(locator, text.to_string());
        self
    }

    pub(crate) fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub(crate) fn lookups(&self, locator: &Locator) -> usize {
        self.lookups.lock().unwrap().get(locator).copied().unwrap_or(0)
    }

    pub(crate) fn with_children(mut self, container: Locator, options: &[&str]) -> Self {
        self.children
            .insert(container, options.iter().map(|s| s.to_string()).collect());
        self
    }

    pub(crate) fn with_input(mut self, locator: Locator) -> Self {
        self.inputs.insert(locator);
        self
    }

    pub(crate) fn with_unavailable(mut self, locator: Locator) -> Self {
        self.unavailable.insert(locator);
        self
    }

    pub(crate) fn with_intercept_once(self, locator: Locator) -> Self {
        self.intercept_once.lock().unwrap().insert(locator);
        self
    }

    pub(crate) fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn clicked(&self, locator: &Locator) -> bool {
        self.recorded()
            .iter()
            .any(|r| matches!(r, Recorded::Click(l) if l == locator))
    }

    pub(crate) fn typed(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Type(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: Recorded) {
        self.log.lock().unwrap().push(action);
    }
}

#[async_trait]
impl BrowserActions for FakeBrowser {
    async fn find_text(&self, locator: &Locator) -> Result<String, ActionError> {
        *self.lookups.lock().unwrap().entry(locator.clone()).or_default() += 1;
        if let Some(left) = self.misses.lock().unwrap().get_mut(locator) {
            if *left > 0 {
                *left -= 1;
                return Err(ActionError::NotFound {
                    locator: locator.to_string(),
                });
            }
        }
        self.texts
            .get(locator)
            .cloned()
            .ok_or_else(|| ActionError::NotFound {
                locator: locator.to_string(),
            })
    }

    async fn click(&self, locator: &Locator, _timeout: Duration) -> Result<(), ActionError> {
        if self.unavailable.contains(locator) {
            return Err(ActionError::NotFound {
                locator: locator.to_string(),
            });
        }
        if self.intercept_once.lock().unwrap().remove(locator) {
            return Err(ActionError::Intercepted {
                locator: locator.to_string(),
            });
        }
        self.record(Recorded::Click(locator.clone()));
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), ActionError> {
        if !self.inputs.contains(locator) {
            return Err(ActionError::NotFound {
                locator: locator.to_string(),
            });
        }
        self.record(Recorded::Type(locator.clone(), text.to_string()));
        Ok(())
    }

    async fn wait_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        if self.unavailable.contains(locator) {
            return Err(ActionError::Timeout {
                locator: locator.to_string(),
                waited: timeout,
            });
        }
        Ok(())
    }

    async fn child_texts(&self, container: &Locator) -> Result<Vec<String>, ActionError> {
        self.children
            .get(container)
            .cloned()
            .ok_or_else(|| ActionError::NotFound {
                locator: container.to_string(),
            })
    }

    async fn click_child(&self, container: &Locator, index: usize) -> Result<(), ActionError> {
        match self.children.get(container) {
            Some(options) if index < options.len() => {
                self.record(Recorded::ClickChild(container.clone(), index));
                Ok(())
            }
            _ => Err(ActionError::NotFound {
                locator: format!("{} > div[{}]", container, index),
            }),
        }
    }

    async fn dismiss_overlays(&self) -> Result<usize, ActionError> {
        self.record(Recorded::DismissOverlays);
        Ok(0)
    }

    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        self.record(Recorded::Navigate(url.to_string()));
        Ok(())
    }

    async fn go_back(&self) -> Result<(), ActionError> {
        self.record(Recorded::Back);
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
