//! 页面操作能力 - 基础设施层
//!
//! 学习模式只依赖这里的 `BrowserActions`，不直接接触 Page。
//! 不稳定的元素用 `LocatorChain` 描述：按顺序尝试，第一个可用的生效。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::ActionError;

/// 元素定位器
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// (类型, 表达式)，供脚本使用
    pub fn parts(&self) -> (&'static str, &str) {
        match self {
            Locator::Css(s) => ("css", s),
            Locator::XPath(s) => ("xpath", s),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, expr) = self.parts();
        write!(f, "{}:{}", kind, expr)
    }
}

/// 有序的备选定位器列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorChain(Vec<Locator>);

impl LocatorChain {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn css(mut self, selector: impl Into<String>) -> Self {
        self.0.push(Locator::css(selector));
        self
    }

    pub fn xpath(mut self, expr: impl Into<String>) -> Self {
        self.0.push(Locator::xpath(expr));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locator> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn primary(&self) -> Option<&Locator> {
        self.0.first()
    }

    /// 链上全部失败时使用的错误
    fn exhausted(&self) -> ActionError {
        ActionError::NotFound {
            locator: self.to_string(),
        }
    }
}

impl From<Locator> for LocatorChain {
    fn from(locator: Locator) -> Self {
        Self(vec![locator])
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|l| l.to_string()).collect();
        write!(f, "[{}]", parts.join(" | "))
    }
}

/// 浏览器操作能力
///
/// 所有等待都必须带超时。实现方持有唯一的浏览器句柄，调用方串行使用。
#[async_trait]
pub trait BrowserActions: Send + Sync {
    /// 读取元素文本，元素不存在时返回 `NotFound`
    async fn find_text(&self, locator: &Locator) -> Result<String, ActionError>;

    /// 等待元素可点击后点击
    async fn click(&self, locator: &Locator, timeout: Duration) -> Result<(), ActionError>;

    /// 在输入框中输入文本
    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), ActionError>;

    /// 等待元素可点击
    async fn wait_clickable(&self, locator: &Locator, timeout: Duration)
        -> Result<(), ActionError>;

    /// 容器内所有 div 子元素的文本（选择题选项）
    async fn child_texts(&self, container: &Locator) -> Result<Vec<String>, ActionError>;

    /// 点击容器内第 index 个 div 子元素
    async fn click_child(&self, container: &Locator, index: usize) -> Result<(), ActionError>;

    /// 关闭当前显示的弹窗/遮罩层，返回关闭的数量
    async fn dismiss_overlays(&self) -> Result<usize, ActionError>;

    /// 导航到 URL
    async fn navigate(&self, url: &str) -> Result<(), ActionError>;

    /// 浏览器后退
    async fn go_back(&self) -> Result<(), ActionError>;

    /// 等待类操作的轮询间隔
    fn poll_interval(&self) -> Duration;

    /// 在超时内等待元素出现非空文本
    async fn wait_text(&self, locator: &Locator, timeout: Duration) -> Result<String, ActionError> {
        let deadline = Instant::now() + timeout;
        loop {
            let last = match self.find_text(locator).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => ActionError::NotFound {
                    locator: locator.to_string(),
                },
                Err(e) if e.is_unavailable() => e,
                Err(e) => return Err(e),
            };
            if Instant::now() >= deadline {
                return Err(match last {
                    ActionError::NotFound { .. } if !timeout.is_zero() => ActionError::Timeout {
                        locator: locator.to_string(),
                        waited: timeout,
                    },
                    other => other,
                });
            }
            sleep(self.poll_interval().min(timeout)).await;
        }
    }

    /// 依次尝试链上的定位器读取文本，第一个非空的生效
    async fn find_text_first(
        &self,
        chain: &LocatorChain,
        timeout: Duration,
    ) -> Result<(Locator, String), ActionError> {
        for locator in chain.iter() {
            match self.wait_text(locator, timeout).await {
                Ok(text) => return Ok((locator.clone(), text)),
                Err(e) if e.is_unavailable() => {
                    tracing::trace!("定位器不可用 {}: {}", locator, e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(chain.exhausted())
    }

    /// 依次尝试链上的定位器点击，第一个成功的生效
    ///
    /// 链上只有一个定位器时原样返回它的错误（例如 `Intercepted`），方便调用方区分。
    async fn click_first(
        &self,
        chain: &LocatorChain,
        timeout: Duration,
    ) -> Result<Locator, ActionError> {
        let mut last_error = None;
        for locator in chain.iter() {
            match self.click(locator, timeout).await {
                Ok(()) => return Ok(locator.clone()),
                Err(e) if e.is_unavailable() => {
                    tracing::trace!("定位器不可用 {}: {}", locator, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        match last_error {
            Some(e) if chain.len() == 1 => Err(e),
            Some(ActionError::Intercepted { locator }) => Err(ActionError::Intercepted { locator }),
            _ => Err(chain.exhausted()),
        }
    }

    /// 依次尝试链上的定位器输入文本
    async fn type_first(&self, chain: &LocatorChain, text: &str) -> Result<Locator, ActionError> {
        for locator in chain.iter() {
            match self.type_text(locator, text).await {
                Ok(()) => return Ok(locator.clone()),
                Err(e) if e.is_unavailable() => {
                    tracing::trace!("输入框不可用 {}: {}", locator, e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(chain.exhausted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::FakeBrowser;

    #[test]
    fn test_chain_display() {
        let chain = LocatorChain::new().css("#a").xpath("//b");
        assert_eq!(chain.to_string(), "[css:#a | xpath://b]");
        assert_eq!(chain.primary(), Some(&Locator::css("#a")));
    }

    #[tokio::test]
    async fn test_find_text_first_skips_missing_locators() {
        let browser = FakeBrowser::new().with_text(Locator::xpath("//second"), "apple");
        let chain = LocatorChain::new().css("#first").xpath("//second");

        let (hit, text) = browser
            .find_text_first(&chain, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(hit, Locator::xpath("//second"));
        assert_eq!(text, "apple");
    }

    #[tokio::test]
    async fn test_click_first_reports_exhausted_chain() {
        let missing = LocatorChain::new().css("#a").css("#b");
        let browser = FakeBrowser::new()
            .with_unavailable(Locator::css("#a"))
            .with_unavailable(Locator::css("#b"));

        let err = browser
            .click_first(&missing, Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_wait_text_polls_at_browser_interval() {
        let browser = FakeBrowser::new()
            .with_poll_interval(Duration::from_millis(1))
            .with_text_after(Locator::css("#late"), "apple", 3);

        let started = Instant::now();
        let text = browser
            .wait_text(&Locator::css("#late"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(text, "apple");
        assert_eq!(browser.lookups(&Locator::css("#late")), 4);
        // 3 次未命中，按 1ms 间隔远小于 200ms × 3
        assert!(started.elapsed() < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_wait_text_with_zero_timeout_tries_once() {
        let browser = FakeBrowser::new();
        let err = browser
            .wait_text(&Locator::css("#nothing"), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound { .. }));
    }
}
