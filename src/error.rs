use std::time::Duration;

use thiserror::Error;

use crate::models::ModeTag;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 页面操作错误
    #[error("页面操作错误: {0}")]
    Action(#[from] ActionError),
    /// 词表提取错误
    #[error("词表提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 学习模式错误
    #[error("学习模式错误: {0}")]
    Runner(#[from] RunnerError),
    /// 账号错误
    #[error("账号错误: {0}")]
    Account(#[from] AccountError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("IO错误: {0}")]
    Io(std::io::Error),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 单个页面操作的错误
///
/// 由 `BrowserActions` 返回。单张卡片上的这类错误在学习模式里只会导致跳过该卡片。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// 元素不存在
    #[error("未找到元素: {locator}")]
    NotFound { locator: String },
    /// 等待超时
    #[error("等待元素超时 ({waited:?}): {locator}")]
    Timeout { locator: String, waited: Duration },
    /// 元素存在但不可交互（隐藏或禁用）
    #[error("元素不可交互: {locator}")]
    NotInteractable { locator: String },
    /// 点击被遮罩层拦截
    #[error("点击被遮罩层拦截: {locator}")]
    Intercepted { locator: String },
    /// 脚本执行失败
    #[error("执行脚本失败: {0}")]
    Script(String),
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    Navigation { url: String, reason: String },
}

impl ActionError {
    /// 是否属于"元素暂时不可用"一类（可以换下一个定位器再试）
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ActionError::NotFound { .. }
                | ActionError::Timeout { .. }
                | ActionError::NotInteractable { .. }
                | ActionError::Intercepted { .. }
        )
    }
}

/// 词表提取错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// 找不到卡片容器
    #[error("找不到卡片容器 (.flip-body): 词集 {set_id}")]
    CardContainerMissing { set_id: u64 },
    /// 卡片列表为空
    #[error("词集 {set_id} 没有任何卡片")]
    NoCards { set_id: u64 },
    /// 三个词列表长度不一致
    #[error("词表长度不一致: 源语言 {source_len}, 目标语言 {target_len}, 例句 {example_len}")]
    LengthMismatch {
        source_len: usize,
        target_len: usize,
        example_len: usize,
    },
    /// 页面操作失败
    #[error("提取过程中页面操作失败: {0}")]
    Action(#[from] ActionError),
}

/// 学习模式运行失败的原因
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunnerError {
    /// 进入学习模式所需的按钮在超时内不可用
    #[error("[{mode}] 入口按钮不可用: {action} ({source})")]
    EntryActionUnavailable {
        mode: ModeTag,
        action: String,
        #[source]
        source: ActionError,
    },
    /// 找不到当前卡片的题面
    #[error("[{mode}] 第 {card} 张卡片找不到题面: {source}")]
    PromptNotFound {
        mode: ModeTag,
        card: usize,
        #[source]
        source: ActionError,
    },
    /// 未知单词超过容忍上限
    #[error("[{mode}] 未知单词超过上限 ({unknown}/{limit}), 最后一个: '{prompt}'")]
    UnknownWordLimitExceeded {
        mode: ModeTag,
        unknown: usize,
        limit: usize,
        prompt: String,
    },
}

/// 账号错误
#[derive(Debug, Error)]
pub enum AccountError {
    /// 登录表单不可用
    #[error("登录表单不可用: {0}")]
    LoginFormUnavailable(ActionError),
    /// 登录被拒绝（页面上没有用户ID）
    #[error("登录失败，请确认账号密码，或网站阻止了自动登录")]
    LoginRejected,
    /// 账号文件读取失败
    #[error("读取账号文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 账号文件写入失败
    #[error("写入账号文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 账号文件格式错误
    #[error("账号文件格式错误 ({path}): {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for ActionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ActionError::Script(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Action(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Other(format!("TOML解析失败: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        AppError::api_request_failed(endpoint, err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        let not_found = ActionError::NotFound {
            locator: "css:#x".to_string(),
        };
        let script = ActionError::Script("boom".to_string());
        assert!(not_found.is_unavailable());
        assert!(!script.is_unavailable());
    }

    #[test]
    fn test_runner_error_message_names_mode() {
        let err = RunnerError::UnknownWordLimitExceeded {
            mode: ModeTag::Spelling,
            unknown: 4,
            limit: 3,
            prompt: "banana".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("spelling"));
        assert!(msg.contains("banana"));
    }
}
