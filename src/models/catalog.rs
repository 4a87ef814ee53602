use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::ModeTag;

/// 班级
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub class_id: String,
    pub name: String,
}

/// 班级中的一个词集
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetInfo {
    pub set_id: u64,
    pub title: String,
    /// 页面上显示的卡片数（仅用于展示）
    pub card_count: Option<usize>,
}

/// 一次待执行的词集任务：（班级, 词集）加上要跑的模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTask {
    pub class_id: String,
    pub set_id: u64,
    pub title: String,
    pub modes: Vec<ModeTag>,
}

impl SetTask {
    pub fn new(class_id: impl Into<String>, set: &SetInfo, modes: &[ModeTag]) -> Self {
        Self {
            class_id: class_id.into(),
            set_id: set.set_id,
            title: set.title.clone(),
            modes: modes.to_vec(),
        }
    }
}

impl Display for SetTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[班级 {} 词集 {}]", self.class_id, self.set_id)
    }
}
