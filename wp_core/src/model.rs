/// 单词级别的查词信息（用于输入行高亮）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordInfo {
    /// 在行内的字符范围：[begin, end)
    pub begin: usize,
    pub end: usize,
    /// 行内原文
    pub word: String,
    /// 某个模型里有完全匹配
    pub exact_match: bool,
    /// 某个模型里有以它为前缀的词
    pub partial_match: bool,
    /// 模型看到的 token 与原文不同（被规范化过）
    pub ignored: bool,
}

/// 协调器给 UI 的“快照视图”。
///
/// 每次文本上下文变化都会整体重算并替换，从不原地修改。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choices {
    /// 被拼写检查的词在当前行内的范围
    pub correction_span: Option<(usize, usize)>,
    /// 拼写纠正候选（按推荐度排序）
    pub corrections: Vec<String>,
    /// 预测候选（按推荐度排序）
    pub predictions: Vec<String>,
    /// 当前行每个词的查词信息
    pub word_infos: Vec<WordInfo>,
}

impl Choices {
    pub fn clear_corrections(&mut self) {
        self.correction_span = None;
        self.corrections.clear();
    }
}
