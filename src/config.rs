use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 站点根地址
    pub base_url: String,
    /// 浏览器调试端口（设置后连接已打开的浏览器，否则自行启动）
    pub browser_debug_port: Option<u16>,
    /// 自行启动时是否使用无头模式
    pub headless: bool,
    /// 自行启动时使用的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// 账号文件
    pub account_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 重试与容忍度 ---
    /// 每个模式的最大尝试次数
    pub max_attempts: usize,
    /// 单次运行允许的未知单词数
    pub unknown_word_limit: usize,
    // --- 等待时间 ---
    pub entry_timeout_secs: u64,
    pub optional_timeout_secs: u64,
    pub element_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// 点击/导航后的固定停顿
    pub action_delay_ms: u64,
    /// 每张卡片作答后的停顿
    pub card_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.classcard.net".to_string(),
            browser_debug_port: None,
            headless: false,
            chrome_executable: None,
            account_file: "config.json".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            max_attempts: 5,
            unknown_word_limit: 3,
            entry_timeout_secs: 10,
            optional_timeout_secs: 3,
            element_timeout_secs: 5,
            poll_interval_ms: 200,
            action_delay_ms: 1000,
            card_delay_ms: 1500,
        }
    }
}

impl Config {
    /// 默认配置 + 环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载（缺省字段使用默认值），再应用环境变量
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("CLASSCARD_BASE_URL") {
            self.base_url = v;
        }
        if let Some(port) = env_parse::<u16>("BROWSER_DEBUG_PORT")? {
            self.browser_debug_port = Some(port);
        }
        if let Some(headless) = env_parse("HEADLESS")? {
            self.headless = headless;
        }
        if let Ok(v) = std::env::var("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Ok(v) = std::env::var("ACCOUNT_FILE") {
            self.account_file = v;
        }
        if let Ok(v) = std::env::var("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(verbose) = env_parse("VERBOSE_LOGGING")? {
            self.verbose_logging = verbose;
        }
        if let Some(n) = env_parse("MAX_ATTEMPTS")? {
            self.max_attempts = n;
        }
        if let Some(n) = env_parse("UNKNOWN_WORD_LIMIT")? {
            self.unknown_word_limit = n;
        }
        if let Some(ms) = env_parse("ACTION_DELAY_MS")? {
            self.action_delay_ms = ms;
        }
        if let Some(ms) = env_parse("CARD_DELAY_MS")? {
            self.card_delay_ms = ms;
        }
        Ok(self)
    }

    /// 站点内路径转完整 URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs)
    }

    pub fn optional_timeout(&self) -> Duration {
        Duration::from_secs(self.optional_timeout_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    pub fn card_delay(&self) -> Duration {
        Duration::from_millis(self.card_delay_ms)
    }
}

fn env_parse<T: FromStr>(var_name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(None),
    }
}
