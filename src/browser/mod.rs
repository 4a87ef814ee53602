//! 浏览器获取：连接已有浏览器或自行启动

mod connection;
mod headless;

use chromiumoxide::{Browser, Page};

use crate::config::Config;
use crate::error::AppError;

pub use connection::connect_to_browser;
pub use headless::{launch_browser, LaunchOptions};

/// 根据配置获取浏览器：设置了调试端口就连接，否则启动
pub async fn open_browser(config: &Config) -> Result<(Browser, Page), AppError> {
    match config.browser_debug_port {
        Some(port) => connect_to_browser(port).await,
        None => {
            launch_browser(LaunchOptions {
                headless: config.headless,
                chrome_executable: config.chrome_executable.as_deref(),
            })
            .await
        }
    }
}
