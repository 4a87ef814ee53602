//! 学习模式与运行结果

use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// 学习模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeTag {
    /// 리콜학습（选择题）
    Recall,
    /// 스펠학습（拼写输入）
    Spelling,
    /// 테스트（输入与选择混合）
    Test,
}

/// 模式别名（英文 / 韩文界面名称）
static MODE_ALIASES: phf::Map<&'static str, ModeTag> = phf_map! {
    "recall" => ModeTag::Recall,
    "리콜" => ModeTag::Recall,
    "리콜학습" => ModeTag::Recall,
    "spelling" => ModeTag::Spelling,
    "spell" => ModeTag::Spelling,
    "스펠" => ModeTag::Spelling,
    "스펠학습" => ModeTag::Spelling,
    "test" => ModeTag::Test,
    "테스트" => ModeTag::Test,
    "테스트학습" => ModeTag::Test,
};

impl ModeTag {
    pub const ALL: [ModeTag; 3] = [ModeTag::Recall, ModeTag::Spelling, ModeTag::Test];

    /// 规范名称
    pub fn as_str(self) -> &'static str {
        match self {
            ModeTag::Recall => "recall",
            ModeTag::Spelling => "spelling",
            ModeTag::Test => "test",
        }
    }

    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            ModeTag::Recall => "리콜학습",
            ModeTag::Spelling => "스펠학습",
            ModeTag::Test => "테스트학습",
        }
    }

    /// 解析以逗号分隔的模式列表，保持顺序并去重
    pub fn parse_list(s: &str) -> Result<Vec<ModeTag>, UnknownMode> {
        let mut modes = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mode: ModeTag = part.parse()?;
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        Ok(modes)
    }
}

impl fmt::Display for ModeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的模式名称
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("无法识别的学习模式: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for ModeTag {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        MODE_ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// 单次学习模式运行的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// 成功作答的卡片数
    pub completed: usize,
    /// 本次运行时的卡片总数
    pub total: usize,
}

impl RunResult {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// 完成比例，总数为 0 时视为 0
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// 完成百分比
    pub fn percentage(&self) -> f64 {
        self.completion_ratio() * 100.0
    }

    /// 是否全部完成
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%)",
            self.completed,
            self.total,
            self.percentage()
        )
    }
}

/// 学习模式一次运行的最终状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 所有卡片处理完毕（可能有跳过）
    Completed(RunResult),
    /// 未知单词过多，已执行退出流程
    Aborted {
        result: RunResult,
        reason: RunnerError,
    },
    /// 无法进入或无法继续（入口按钮缺失、题面缺失）
    Failed {
        result: RunResult,
        reason: RunnerError,
    },
}

impl RunOutcome {
    pub fn result(&self) -> RunResult {
        match self {
            RunOutcome::Completed(result)
            | RunOutcome::Aborted { result, .. }
            | RunOutcome::Failed { result, .. } => *result,
        }
    }

    pub fn reason(&self) -> Option<&RunnerError> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Aborted { reason, .. } | RunOutcome::Failed { reason, .. } => Some(reason),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Completed(_) => "completed",
            RunOutcome::Aborted { .. } => "aborted",
            RunOutcome::Failed { .. } => "failed",
        }
    }
}
