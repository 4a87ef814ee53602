//! 学习会话编排器 - 编排层
//!
//! ## 职责
//!
//! - 对一个词集依次执行请求的学习模式
//! - 每个模式最多尝试 `max_attempts` 次，直到完成率达到 100%
//! - 每次尝试前重新抓取词表（页面导航后旧词表作废）
//! - 按词集 ID 范围批量执行，并在安全点检查停止信号
//!
//! ## 停止检查点
//!
//! ```text
//! 每个词集之前 → 每个模式之前 → 每次重试之前
//! ```
//!
//! 单次学习模式运行中途不会被打断。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::AppError;
use crate::models::{ModeTag, RunResult, SetInfo, SetTask, WordTable};
use crate::orchestrator::progress::{ProgressEvent, ProgressSink};
use crate::workflow::ModeExecutor;

/// 站点能力：列出词集、抓取词表
#[async_trait]
pub trait StudySite: Send + Sync {
    async fn list_sets(&self, class_id: &str) -> Result<Vec<SetInfo>, AppError>;

    /// 导航到词集页面并抓取词表
    async fn fetch_word_table(&self, task: &SetTask) -> Result<WordTable, AppError>;
}

/// 单个学习模式的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeReport {
    /// 最后一次观察到的结果
    pub result: RunResult,
    /// 实际尝试次数（含抓取词表失败的尝试）
    pub attempts: usize,
    /// 是否达到 100%
    pub succeeded: bool,
    /// 最后一次失败的原因
    pub last_error: Option<String>,
}

/// 单个词集的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetReport {
    pub set_id: u64,
    pub title: String,
    pub modes: BTreeMap<ModeTag, ModeReport>,
}

impl SetReport {
    fn new(task: &SetTask) -> Self {
        Self {
            set_id: task.set_id,
            title: task.title.clone(),
            modes: BTreeMap::new(),
        }
    }

    /// 各模式的结果
    pub fn results(&self) -> BTreeMap<ModeTag, RunResult> {
        self.modes.iter().map(|(m, r)| (*m, r.result)).collect()
    }
}

/// 范围执行的结果，按词集枚举顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeReport {
    pub sets: Vec<SetReport>,
    /// 是否因停止请求提前结束
    pub cancelled: bool,
}

impl RangeReport {
    pub fn set(&self, set_id: u64) -> Option<&SetReport> {
        self.sets.iter().find(|s| s.set_id == set_id)
    }

    pub fn set_ids(&self) -> Vec<u64> {
        self.sets.iter().map(|s| s.set_id).collect()
    }
}

/// 学习会话编排器
pub struct SessionOrchestrator {
    site: Arc<dyn StudySite>,
    executor: Arc<dyn ModeExecutor>,
    progress: Arc<dyn ProgressSink>,
    max_attempts: usize,
}

impl SessionOrchestrator {
    pub fn new(
        site: Arc<dyn StudySite>,
        executor: Arc<dyn ModeExecutor>,
        progress: Arc<dyn ProgressSink>,
        max_attempts: usize,
    ) -> Self {
        Self {
            site,
            executor,
            progress,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 对单个词集执行学习模式
    pub async fn run(&self, class_id: &str, set_id: u64, modes: &[ModeTag]) -> SetReport {
        let task = SetTask {
            class_id: class_id.to_string(),
            set_id,
            title: String::new(),
            modes: modes.to_vec(),
        };
        self.run_task(&task, &CancellationToken::new()).await
    }

    /// 对 ID 在 [start, end] 范围内的词集依次执行
    pub async fn run_range(
        &self,
        class_id: &str,
        start: u64,
        end: u64,
        modes: &[ModeTag],
        token: &CancellationToken,
    ) -> Result<RangeReport, AppError> {
        let sets = self.site.list_sets(class_id).await?;
        let selected: Vec<&SetInfo> = sets
            .iter()
            .filter(|s| (start..=end).contains(&s.set_id))
            .collect();
        debug!(
            "班级 {} 共 {} 个词集，范围 [{}, {}] 内 {} 个",
            class_id,
            sets.len(),
            start,
            end,
            selected.len()
        );

        let mut report = RangeReport::default();
        for set in selected {
            if token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let task = SetTask::new(class_id, set, modes);
            let set_report = self.run_task(&task, token).await;
            if !set_report.modes.is_empty() {
                report.sets.push(set_report);
            }
        }

        if token.is_cancelled() {
            report.cancelled = true;
            self.progress.report(&ProgressEvent::Cancelled);
        }
        Ok(report)
    }

    /// 执行一个词集任务的所有模式
    pub async fn run_task(&self, task: &SetTask, token: &CancellationToken) -> SetReport {
        self.progress.report(&ProgressEvent::SetStarted {
            set_id: task.set_id,
            title: task.title.clone(),
        });

        let mut report = SetReport::new(task);
        for &mode in &task.modes {
            if token.is_cancelled() {
                break;
            }
            let mode_report = self.run_mode(task, mode, token).await;
            report.modes.insert(mode, mode_report);
        }

        self.progress.report(&ProgressEvent::SetFinished {
            report: report.clone(),
        });
        report
    }

    /// 单个模式的重试循环
    async fn run_mode(&self, task: &SetTask, mode: ModeTag, token: &CancellationToken) -> ModeReport {
        self.progress.report(&ProgressEvent::ModeStarted {
            set_id: task.set_id,
            mode,
        });

        let mut report = ModeReport {
            result: RunResult::default(),
            attempts: 0,
            succeeded: false,
            last_error: None,
        };

        for attempt in 1..=self.max_attempts {
            if attempt > 1 && token.is_cancelled() {
                break;
            }
            report.attempts = attempt;

            let table = match self.site.fetch_word_table(task).await {
                Ok(table) => table,
                Err(e) => {
                    self.progress.report(&ProgressEvent::FetchFailed {
                        set_id: task.set_id,
                        mode,
                        attempt,
                        error: e.to_string(),
                    });
                    report.last_error = Some(e.to_string());
                    continue;
                }
            };

            let outcome = self.executor.execute(mode, &table).await;
            report.result = outcome.result();
            report.last_error = outcome.reason().map(|r| r.to_string());

            self.progress.report(&ProgressEvent::AttemptFinished {
                set_id: task.set_id,
                mode,
                attempt,
                max_attempts: self.max_attempts,
                outcome: outcome.label(),
                result: report.result,
                reason: report.last_error.clone(),
            });

            if report.result.is_complete() {
                report.succeeded = true;
                break;
            }
        }

        self.progress.report(&ProgressEvent::ModeFinished {
            set_id: task.set_id,
            mode,
            report: report.clone(),
        });
        report
    }
}
