//! `wp_tokenize`：基于 Unicode 词边界（UAX #29）的本地分词器。
//!
//! 约定：
//! - 输出的 span 都是字符偏移（不是字节偏移）
//! - 含字母或数字的片段才算词：`don't`、`3.14` 各是一个词，空白与标点不算
//! - 纯函数，同样的输入永远得到同样的输出
use unicode_segmentation::UnicodeSegmentation;
use wp_core::tokenizer::{SENTENCE_BEGIN, Tokenized, Tokenizer};

/// 句末标点：之后开始新句子。
const SENTENCE_END: &[char] = &['.', '?', '!'];

/// UAX #29 分词器（无状态）。
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// 切出所有词及其字符范围。
    pub fn tokenize_text(&self, text: &str) -> Tokenized {
        let mut out = Tokenized::default();
        for (begin, end, segment) in segments(text) {
            if is_word(segment) {
                out.tokens.push(segment.to_string());
                out.spans.push((begin, end));
            }
        }
        out
    }

    /// 预测用的上下文 token：开头和每个句末标点之后插入 [`SENTENCE_BEGIN`]，
    /// 最后一个元素是光标处正在输入的半个词（文本不以词结尾时为空串）。
    pub fn tokenize_context(&self, text: &str) -> Vec<String> {
        let mut tokens = vec![SENTENCE_BEGIN.to_string()];
        let mut ends_in_word = false;
        for (_, _, segment) in segments(text) {
            ends_in_word = is_word(segment);
            if ends_in_word {
                tokens.push(segment.to_string());
            } else if segment.contains(SENTENCE_END)
                && tokens.last().is_some_and(|t| t != SENTENCE_BEGIN)
            {
                tokens.push(SENTENCE_BEGIN.to_string());
            }
        }
        if !ends_in_word {
            tokens.push(String::new());
        }
        tokens
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&mut self, text: &str) -> Tokenized {
        self.tokenize_text(text)
    }

    fn tokenize_context(&mut self, text: &str) -> Vec<String> {
        WordTokenizer::tokenize_context(self, text)
    }
}

/// 词边界片段，附带字符范围 [begin, end)。
fn segments(text: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut pos = 0;
    text.split_word_bounds().map(move |segment| {
        let begin = pos;
        pos += segment.chars().count();
        (begin, pos, segment)
    })
}

fn is_word(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(text: &str) -> Vec<String> {
        WordTokenizer::new().tokenize_context(text)
    }

    #[test]
    fn words_and_char_spans() {
        let out = WordTokenizer::new().tokenize_text("word1 word2 word3");
        assert_eq!(out.tokens, vec!["word1", "word2", "word3"]);
        assert_eq!(out.spans, vec![(0, 5), (6, 11), (12, 17)]);
    }

    #[test]
    fn spans_count_chars_not_bytes() {
        let out = WordTokenizer::new().tokenize_text("naïve café, ok");
        assert_eq!(out.tokens, vec!["naïve", "café", "ok"]);
        assert_eq!(out.spans, vec![(0, 5), (6, 10), (12, 14)]);
    }

    #[test]
    fn apostrophes_and_numbers_stay_whole() {
        let out = WordTokenizer::new().tokenize_text("don't pay 3.14 now");
        assert_eq!(out.tokens, vec!["don't", "pay", "3.14", "now"]);
    }

    #[test]
    fn context_ends_with_partial_word() {
        assert_eq!(context("The quick br"), vec!["<s>", "The", "quick", "br"]);
        assert_eq!(context("The quick "), vec!["<s>", "The", "quick", ""]);
    }

    #[test]
    fn context_marks_sentence_starts() {
        assert_eq!(context(""), vec!["<s>", ""]);
        assert_eq!(context("Hi. Th"), vec!["<s>", "Hi", "<s>", "Th"]);
        assert_eq!(context("Really?! "), vec!["<s>", "Really", "<s>", ""]);
    }

    #[test]
    fn deterministic() {
        let mut tokenizer = WordTokenizer::new();
        let text = "Same input, same output.";
        let first = Tokenizer::tokenize(&mut tokenizer, text);
        assert_eq!(first, Tokenizer::tokenize(&mut tokenizer, text));
    }
}
