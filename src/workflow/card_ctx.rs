//! 卡片处理上下文
//!
//! 封装"我正在哪个学习模式的第几张卡片"这一信息

use std::fmt::Display;

use crate::models::ModeTag;

/// 卡片处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardCtx {
    /// 学习模式
    pub mode: ModeTag,

    /// 卡片序号（从1开始，对应页面上的位置）
    pub card: usize,

    /// 本次运行的卡片总数
    pub total: usize,
}

impl CardCtx {
    pub fn new(mode: ModeTag, card: usize, total: usize) -> Self {
        Self { mode, card, total }
    }
}

impl Display for CardCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}/{}]", self.mode.label(), self.card, self.total)
    }
}
