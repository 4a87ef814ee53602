use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, BrowserError};

/// 连接到已打开调试端口的浏览器，复用第一个页面（没有则新建）
pub async fn connect_to_browser(port: u16) -> Result<(Browser, Page), AppError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    let page = match pages.into_iter().next() {
        Some(page) => {
            if let Ok(Some(title)) = page.get_title().await {
                info!("✓ 复用已有页面: {}", title);
            }
            page
        }
        None => {
            debug!("没有可用页面，创建空白页面");
            browser.new_page("about:blank").await.map_err(|e| {
                error!("创建空白页面失败: {}", e);
                BrowserError::PageCreationFailed {
                    source: Box::new(e),
                }
            })?
        }
    };

    Ok((browser, page))
}
