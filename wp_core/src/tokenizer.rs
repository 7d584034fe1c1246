//! 分词器抽象：core 不关心分词来自本地实现还是预测服务。

/// 句首标记：`tokenize_context` 在文本开头和句末标点之后插入它。
pub const SENTENCE_BEGIN: &str = "<s>";

/// 分词结果：`tokens[i]` 对应字符范围 `spans[i]`（半开区间，字符偏移）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<String>,
    pub spans: Vec<(usize, usize)>,
}

impl Tokenized {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// 分词器。
///
/// 约定：
/// - **确定性**：同一段文本必须得到完全相同的结果。`LearnStrategy` 会拿两次独立
///   分词得到的 span 按值比较来判断相邻，分词不稳定会让本该合并的片段各自为政
/// - `spans` 升序、互不重叠，且与 `tokens` 等长
/// - `tokenize_context` 只返回词（含 [`SENTENCE_BEGIN`]），最后一个元素永远是
///   光标处正在输入的半个词；文本以分隔符结尾时它是空串
pub trait Tokenizer {
    fn tokenize(&mut self, text: &str) -> Tokenized;

    fn tokenize_context(&mut self, text: &str) -> Vec<String>;
}
