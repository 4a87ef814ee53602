//! 基于 JsExecutor 的页面操作实现
//!
//! 每个操作都是一段自包含的脚本：先定位元素，再检查可见性与遮挡，最后执行动作。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use super::actions::{BrowserActions, Locator};
use super::js_executor::JsExecutor;
use crate::error::ActionError;

/// 所有脚本共用的辅助函数
const PRELUDE: &str = r#"
    const __ccFind = (kind, sel) => kind === 'xpath'
        ? document.evaluate(sel, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue
        : document.querySelector(sel);
    const __ccVisible = (el) => {
        const r = el.getBoundingClientRect();
        const s = window.getComputedStyle(el);
        return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';
    };
    const __ccProbe = (el) => {
        if (!__ccVisible(el) || el.disabled) return 'not_interactable';
        el.scrollIntoView({ block: 'center' });
        const r = el.getBoundingClientRect();
        const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2);
        if (hit && hit !== el && !el.contains(hit) && !hit.contains(el)) return 'intercepted';
        return 'ok';
    };
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScriptStatus {
    Ok,
    NotFound,
    NotInteractable,
    Intercepted,
}

#[derive(Debug, Deserialize)]
struct ScriptReply {
    status: ScriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    texts: Vec<String>,
    #[serde(default)]
    count: usize,
}

impl ScriptReply {
    fn check(self, locator: &str) -> Result<Self, ActionError> {
        let locator = locator.to_string();
        match self.status {
            ScriptStatus::Ok => Ok(self),
            ScriptStatus::NotFound => Err(ActionError::NotFound { locator }),
            ScriptStatus::NotInteractable => Err(ActionError::NotInteractable { locator }),
            ScriptStatus::Intercepted => Err(ActionError::Intercepted { locator }),
        }
    }
}

/// Chrome 页面操作
pub struct ChromeActions {
    executor: JsExecutor,
    poll_interval: Duration,
}

impl ChromeActions {
    pub fn new(executor: JsExecutor, poll_interval: Duration) -> Self {
        Self {
            executor,
            poll_interval,
        }
    }

    /// 底层执行器（词表抓取等需要直接跑脚本的服务使用）
    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 生成"定位元素后执行 body"的脚本，body 中可以使用变量 `el`
    fn element_script(locator: &Locator, body: &str) -> Result<String, ActionError> {
        let (kind, expr) = locator.parts();
        let expr = serde_json::to_string(expr).map_err(|e| ActionError::Script(e.to_string()))?;
        Ok(format!(
            r#"
            (() => {{
                {PRELUDE}
                const el = __ccFind('{kind}', {expr});
                if (!el) return {{ status: 'not_found' }};
                {body}
            }})()
            "#
        ))
    }

    async fn run(&self, locator: &Locator, body: &str) -> Result<ScriptReply, ActionError> {
        let script = Self::element_script(locator, body)?;
        let reply: ScriptReply = self.executor.eval_as(script).await?;
        trace!("{} -> {:?}", locator, reply.status);
        reply.check(&locator.to_string())
    }
}

#[async_trait]
impl BrowserActions for ChromeActions {
    async fn find_text(&self, locator: &Locator) -> Result<String, ActionError> {
        let reply = self
            .run(
                locator,
                "return { status: 'ok', text: (el.innerText || el.textContent || '').trim() };",
            )
            .await?;
        Ok(reply.text.unwrap_or_default())
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> Result<(), ActionError> {
        self.wait_clickable(locator, timeout).await?;
        self.run(
            locator,
            r#"
            const state = __ccProbe(el);
            if (state !== 'ok') return { status: state };
            el.click();
            return { status: 'ok' };
            "#,
        )
        .await?;
        debug!("已点击: {}", locator);
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), ActionError> {
        let value = serde_json::to_string(text).map_err(|e| ActionError::Script(e.to_string()))?;
        let body = format!(
            r#"
            if (!__ccVisible(el) || el.disabled || el.readOnly) return {{ status: 'not_interactable' }};
            el.focus();
            el.click();
            const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
            const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
            setter.call(el, {value});
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            el.dispatchEvent(new KeyboardEvent('keyup', {{ bubbles: true }}));
            return {{ status: 'ok' }};
            "#
        );
        self.run(locator, &body).await?;
        debug!("已输入 '{}': {}", text, locator);
        Ok(())
    }

    async fn wait_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        let deadline = Instant::now() + timeout;
        loop {
            // 被遮挡也算可点击，遮挡在真正点击时再报告
            match self
                .run(locator, "return { status: __ccVisible(el) && !el.disabled ? 'ok' : 'not_interactable' };")
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) if e.is_unavailable() => {
                    if Instant::now() >= deadline {
                        return Err(if timeout.is_zero() {
                            e
                        } else {
                            ActionError::Timeout {
                                locator: locator.to_string(),
                                waited: timeout,
                            }
                        });
                    }
                }
                Err(e) => return Err(e),
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn child_texts(&self, container: &Locator) -> Result<Vec<String>, ActionError> {
        let reply = self
            .run(
                container,
                r#"
                const texts = Array.from(el.getElementsByTagName('div'))
                    .map(d => (d.innerText || d.textContent || '').trim());
                return { status: 'ok', texts };
                "#,
            )
            .await?;
        Ok(reply.texts)
    }

    async fn click_child(&self, container: &Locator, index: usize) -> Result<(), ActionError> {
        let body = format!(
            r#"
            const items = el.getElementsByTagName('div');
            if ({index} >= items.length) return {{ status: 'not_found' }};
            const item = items[{index}];
            const state = __ccProbe(item);
            if (state !== 'ok') return {{ status: state }};
            item.click();
            return {{ status: 'ok' }};
            "#
        );
        self.run(container, &body).await?;
        debug!("已点击选项 {}: {}", index, container);
        Ok(())
    }

    async fn dismiss_overlays(&self) -> Result<usize, ActionError> {
        let script = format!(
            r#"
            (() => {{
                {PRELUDE}
                let count = 0;
                document.querySelectorAll('.modal, .modal-backdrop, .overlay, .popup, .modal-footer').forEach(o => {{
                    if (!__ccVisible(o)) return;
                    const btns = [...o.querySelectorAll('a'), ...o.querySelectorAll('button')].filter(__ccVisible);
                    if (btns.length > 0) {{
                        btns[btns.length - 1].click();
                        count += 1;
                    }}
                }});
                return {{ status: 'ok', count }};
            }})()
            "#
        );
        let reply: ScriptReply = self.executor.eval_as(script).await?;
        if reply.count > 0 {
            debug!("关闭了 {} 个遮罩层", reply.count);
        }
        Ok(reply.count)
    }

    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        self.executor.goto(url).await
    }

    async fn go_back(&self) -> Result<(), ActionError> {
        self.executor.eval("(() => { history.back(); return true; })()").await?;
        sleep(self.poll_interval).await;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_script_escapes_selector() {
        let locator = Locator::xpath("//a[contains(text(), \"시작\")]");
        let script = ChromeActions::element_script(&locator, "return { status: 'ok' };").unwrap();
        assert!(script.contains(r#"__ccFind('xpath', "//a[contains(text(), \"시작\")]")"#));
    }

    #[test]
    fn test_reply_status_maps_to_errors() {
        let reply: ScriptReply = serde_json::from_str(r#"{"status":"intercepted"}"#).unwrap();
        assert_eq!(
            reply.check("css:#start").unwrap_err(),
            ActionError::Intercepted {
                locator: "css:#start".to_string()
            }
        );

        let reply: ScriptReply =
            serde_json::from_str(r#"{"status":"ok","texts":["a","b"]}"#).unwrap();
        assert_eq!(reply.check("css:#x").unwrap().texts, vec!["a", "b"]);
    }
}
