use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// 页面上一张翻转卡片的原始文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    /// 正面（源语言单词）
    #[serde(default)]
    pub front: String,
    /// 背面（目标语言释义，可能带换行分隔的例句）
    #[serde(default)]
    pub back: String,
}

/// 一个词集的完整词表
///
/// 三个列表按卡片位置平行排列，长度始终相同。
/// 词表创建后不可修改，需要更新时重新抓取并整体替换。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordTable {
    source_terms: Vec<String>,
    target_terms: Vec<String>,
    target_terms_with_example: Vec<String>,
}

impl WordTable {
    /// 从三个平行列表创建词表
    pub fn new(
        source_terms: Vec<String>,
        target_terms: Vec<String>,
        target_terms_with_example: Vec<String>,
    ) -> Result<Self, ExtractionError> {
        if source_terms.len() != target_terms.len()
            || source_terms.len() != target_terms_with_example.len()
        {
            return Err(ExtractionError::LengthMismatch {
                source_len: source_terms.len(),
                target_len: target_terms.len(),
                example_len: target_terms_with_example.len(),
            });
        }

        Ok(Self {
            source_terms,
            target_terms,
            target_terms_with_example,
        })
    }

    /// 从页面卡片构建词表
    ///
    /// 背面文本按换行拆分：第一行是释义，第二行（如果有）是例句。
    pub fn from_cards(cards: &[RawCard]) -> Self {
        let mut source_terms = Vec::with_capacity(cards.len());
        let mut target_terms = Vec::with_capacity(cards.len());
        let mut with_example = Vec::with_capacity(cards.len());

        for card in cards {
            let mut lines = card.back.split('\n').map(str::trim);
            let meaning = lines.next().unwrap_or_default().to_string();
            let combined = match lines.next() {
                Some(example) => format!("{} {}", meaning, example),
                None => meaning.clone(),
            };

            source_terms.push(card.front.trim().to_string());
            target_terms.push(meaning);
            with_example.push(combined);
        }

        Self {
            source_terms,
            target_terms,
            target_terms_with_example: with_example,
        }
    }

    /// 卡片数量
    pub fn len(&self) -> usize {
        self.source_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_terms.is_empty()
    }

    pub fn source_terms(&self) -> &[String] {
        &self.source_terms
    }

    pub fn target_terms(&self) -> &[String] {
        &self.target_terms
    }

    pub fn target_terms_with_example(&self) -> &[String] {
        &self.target_terms_with_example
    }
}
