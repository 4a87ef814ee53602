//! 学习记录重置接口
//!
//! 直接调用站点接口重置某个词集的学习次数。调用即忘：失败只记日志。

use tracing::{info, warn};

use crate::config::Config;

/// 接口中的 activity 编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewActivity {
    /// 암기학습
    Memorize,
}

impl ViewActivity {
    pub fn code(self) -> u8 {
        match self {
            ViewActivity::Memorize => 3,
        }
    }
}

/// 一次重置请求的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewReset {
    pub user_id: u64,
    pub set_id: u64,
    pub class_id: String,
    pub view_count: u32,
    pub activity: ViewActivity,
}

impl ViewReset {
    /// 表单字段
    pub fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("set_idx", self.set_id.to_string()),
            ("activity", self.activity.code().to_string()),
            ("user_idx", self.user_id.to_string()),
            ("view_cnt", self.view_count.to_string()),
            ("class_idx", self.class_id.clone()),
        ]
    }
}

/// 学习记录重置客户端
pub struct ViewResetClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ViewResetClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.url("/ViewSetAsync/resetAllLog"),
        }
    }

    /// 发送重置请求，不返回结果
    pub async fn reset(&self, request: &ViewReset) {
        let result = self
            .client
            .post(&self.endpoint)
            .form(&request.form())
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => info!(
                "✓ 已请求重置学习记录: 词集 {} (次数 {})",
                request.set_id, request.view_count
            ),
            Err(e) => warn!("⚠️ 重置学习记录失败 ({}): {}", self.endpoint, e),
        }
    }
}
