//! 进度事件
//!
//! 编排层每次尝试、失败、重试都会发出一个事件。
//! 命令行用 `TracingProgress` 输出日志。

use tracing::{info, warn};

use crate::models::{ModeTag, RunResult};
use crate::orchestrator::session::{ModeReport, SetReport};
use crate::utils::logging::log_set_start;

/// 进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// 开始处理一个词集
    SetStarted { set_id: u64, title: String },
    /// 开始一个学习模式
    ModeStarted { set_id: u64, mode: ModeTag },
    /// 抓取词表失败（计为一次失败的尝试）
    FetchFailed {
        set_id: u64,
        mode: ModeTag,
        attempt: usize,
        error: String,
    },
    /// 一次尝试结束
    AttemptFinished {
        set_id: u64,
        mode: ModeTag,
        attempt: usize,
        max_attempts: usize,
        outcome: &'static str,
        result: RunResult,
        reason: Option<String>,
    },
    /// 学习模式结束（成功或重试用尽）
    ModeFinished {
        set_id: u64,
        mode: ModeTag,
        report: ModeReport,
    },
    /// 词集处理完毕
    SetFinished { report: SetReport },
    /// 收到停止请求
    Cancelled,
}

/// 进度接收方
///
/// 在编排流程中同步调用，实现方不应阻塞。
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

/// 以日志形式输出进度
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::SetStarted { set_id, title } => log_set_start(*set_id, title),
            ProgressEvent::ModeStarted { set_id, mode } => {
                info!("[세트 {}] ▶️ {}", set_id, mode.label());
            }
            ProgressEvent::FetchFailed {
                set_id,
                mode,
                attempt,
                error,
            } => {
                warn!(
                    "[세트 {}] ⚠️ {} 第 {} 次尝试前抓取词表失败: {}",
                    set_id,
                    mode.label(),
                    attempt,
                    error
                );
            }
            ProgressEvent::AttemptFinished {
                set_id,
                mode,
                attempt,
                max_attempts,
                outcome,
                result,
                reason,
            } => {
                if result.is_complete() {
                    info!(
                        "[세트 {}] ✅ {} 完成: {} (第 {}/{} 次)",
                        set_id,
                        mode.label(),
                        result,
                        attempt,
                        max_attempts
                    );
                } else {
                    warn!(
                        "[세트 {}] 🔁 {} 未完成 [{}]: {} (第 {}/{} 次){}",
                        set_id,
                        mode.label(),
                        outcome,
                        result,
                        attempt,
                        max_attempts,
                        reason
                            .as_deref()
                            .map(|r| format!(" - {}", r))
                            .unwrap_or_default()
                    );
                }
            }
            ProgressEvent::ModeFinished {
                set_id,
                mode,
                report,
            } => {
                if !report.succeeded {
                    warn!(
                        "[세트 {}] ❌ {} 放弃: {} (共尝试 {} 次)",
                        set_id,
                        mode.label(),
                        report.result,
                        report.attempts
                    );
                }
            }
            ProgressEvent::SetFinished { report } => {
                info!("[세트 {}] ✓ 词集处理完毕", report.set_id);
            }
            ProgressEvent::Cancelled => {
                warn!("⏹️ 收到停止请求，中断执行");
            }
        }
    }
}
