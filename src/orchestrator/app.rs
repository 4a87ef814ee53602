//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、获取浏览器、创建 JsExecutor / ChromeActions
//! 2. **账号**：读取或确认账号，登录并记住用户 ID
//! 3. **目录**：班级列表、词集列表
//! 4. **学习**：把站点能力和模式执行器交给 `SessionOrchestrator`
//! 5. **资源管理**：唯一持有 Browser 的模块

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{ChromeActions, JsExecutor};
use crate::models::{ClassInfo, ModeTag, SetInfo, SetTask, WordTable};
use crate::orchestrator::progress::{ProgressSink, TracingProgress};
use crate::orchestrator::session::{RangeReport, SessionOrchestrator, SetReport, StudySite};
use crate::services::{
    verify_credentials, AccountStore, Catalog, Credentials, ViewActivity, ViewReset,
    ViewResetClient, VocabularyExtractor,
};
use crate::utils::logging::{append_report, init_log_file, log_startup, print_final_stats};
use crate::workflow::BrowserModeExecutor;

/// 基于浏览器的站点能力
pub struct BrowserStudySite {
    actions: Arc<ChromeActions>,
    catalog: Catalog,
    vocabulary: VocabularyExtractor,
}

impl BrowserStudySite {
    pub fn new(actions: Arc<ChromeActions>, config: &Config) -> Self {
        Self {
            actions,
            catalog: Catalog::new(config),
            vocabulary: VocabularyExtractor::new(config),
        }
    }
}

#[async_trait]
impl StudySite for BrowserStudySite {
    async fn list_sets(&self, class_id: &str) -> Result<Vec<SetInfo>, AppError> {
        Ok(self.catalog.list_sets(&self.actions, class_id).await?)
    }

    async fn fetch_word_table(&self, task: &SetTask) -> Result<WordTable, AppError> {
        Ok(self
            .vocabulary
            .fetch(&self.actions, &task.class_id, task.set_id)
            .await?)
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    actions: Arc<ChromeActions>,
    catalog: Catalog,
    http: reqwest::Client,
    orchestrator: SessionOrchestrator,
    user_id: Option<u64>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        log_startup(&config);

        let (browser, page) = browser::open_browser(&config).await?;

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(page);
        let actions = Arc::new(ChromeActions::new(executor, config.poll_interval()));

        let site = Arc::new(BrowserStudySite::new(actions.clone(), &config));
        let modes = Arc::new(BrowserModeExecutor::from_config(actions.clone(), &config));
        let progress: Arc<dyn ProgressSink> = Arc::new(TracingProgress);
        let orchestrator = SessionOrchestrator::new(site, modes, progress, config.max_attempts);

        Ok(Self {
            catalog: Catalog::new(&config),
            http: reqwest::Client::new(),
            config,
            _browser: browser,
            actions,
            orchestrator,
            user_id: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 确定要使用的账号
    ///
    /// 命令行给出的账号先经过登录接口确认，确认后保存到账号文件；
    /// 否则读取账号文件。
    pub async fn resolve_credentials(
        &self,
        id: Option<String>,
        pw: Option<String>,
    ) -> Result<Credentials> {
        let store = AccountStore::from_config(&self.config);

        if let (Some(id), Some(pw)) = (id, pw) {
            let credentials = Credentials { id, pw };
            if !verify_credentials(&self.http, &self.config, &credentials).await? {
                return Err(anyhow!("账号或密码错误: {}", credentials.id));
            }
            store.save(&credentials)?;
            info!("💾 账号已保存至: {}", store.path().display());
            return Ok(credentials);
        }

        store.load()?.ok_or_else(|| {
            anyhow!(
                "没有可用的账号，请使用 --id/--pw 或在 {} 中填写",
                store.path().display()
            )
        })
    }

    /// 登录并记住用户 ID
    pub async fn login(&mut self, credentials: &Credentials) -> Result<u64> {
        let user_id = self
            .catalog
            .login(&self.actions, &credentials.id, &credentials.pw)
            .await?;
        self.user_id = Some(user_id);
        Ok(user_id)
    }

    /// 班级列表（登录后的首页）
    pub async fn classes(&self) -> Result<Vec<ClassInfo>> {
        Ok(self.catalog.list_classes(&self.actions).await?)
    }

    /// 班级中的词集
    pub async fn sets(&self, class_id: &str) -> Result<Vec<SetInfo>> {
        Ok(self.catalog.list_sets(&self.actions, class_id).await?)
    }

    /// 对单个词集执行学习模式
    pub async fn run(&self, class_id: &str, set_id: u64, modes: &[ModeTag]) -> SetReport {
        self.orchestrator.run(class_id, set_id, modes).await
    }

    /// 对 ID 范围内的词集执行学习模式
    pub async fn run_range(
        &self,
        class_id: &str,
        start: u64,
        end: u64,
        modes: &[ModeTag],
        token: &CancellationToken,
    ) -> Result<RangeReport> {
        Ok(self
            .orchestrator
            .run_range(class_id, start, end, modes, token)
            .await?)
    }

    /// 重置词集的学习记录
    pub async fn reset_views(&self, class_id: &str, set_id: u64, view_count: u32) -> Result<()> {
        let user_id = self
            .user_id
            .ok_or_else(|| anyhow!("尚未登录，无法重置学习记录"))?;
        let client = ViewResetClient::new(self.http.clone(), &self.config);
        client
            .reset(&ViewReset {
                user_id,
                set_id,
                class_id: class_id.to_string(),
                view_count,
                activity: ViewActivity::Memorize,
            })
            .await;
        Ok(())
    }

    /// 输出并保存最终统计
    pub fn finish(&self, report: &RangeReport) {
        print_final_stats(report, &self.config.output_log_file);
        if let Err(e) = append_report(&self.config.output_log_file, report) {
            warn!("⚠️ 写入日志文件失败: {}", e);
        }
    }
}
