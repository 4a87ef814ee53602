//! 题面解析 - 业务能力层
//!
//! 纯函数：给定页面上显示的题面和词表，找出应该作答的词。
//! 三种学习模式共用同一个 `resolve`。

use crate::models::WordTable;

/// 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'t> {
    /// 配对的另一面
    Answer(&'t str),
    /// 两个词列表中都没有该题面
    Unknown,
}

impl<'t> Resolution<'t> {
    pub fn answer(self) -> Option<&'t str> {
        match self {
            Resolution::Answer(answer) => Some(answer),
            Resolution::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Resolution::Unknown)
    }
}

/// 题面是否含有区分大小写的字符（视为源语言单词）
pub fn is_cased(prompt: &str) -> bool {
    prompt.chars().any(|c| c.is_uppercase() || c.is_lowercase())
}

/// 在词表中双向查找题面的配对词
///
/// 只做精确匹配，大小写和空白都不处理；重复词取第一个位置。
/// 含大小写字符的题面先查源语言列表，否则先查目标语言列表。
pub fn resolve<'t>(prompt: &str, table: &'t WordTable) -> Resolution<'t> {
    let source = table.source_terms();
    let target = table.target_terms();

    let lookups: [(&'t [String], &'t [String]); 2] = if is_cased(prompt) {
        [(source, target), (target, source)]
    } else {
        [(target, source), (source, target)]
    };

    lookups
        .into_iter()
        .find_map(|(from, to)| {
            from.iter()
                .position(|term| term == prompt)
                .map(|i| Resolution::Answer(to[i].as_str()))
        })
        .unwrap_or(Resolution::Unknown)
}

/// 选择题选项是否对应题面
///
/// 选项可能是答案本身，也可能是题面的配对词经过词表再查一次得到的。
pub fn choice_matches(choice: &str, prompt: &str, answer: &str, table: &WordTable) -> bool {
    choice == answer || resolve(choice, table).answer() == Some(prompt)
}
