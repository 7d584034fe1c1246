//! `learn_strategy`：把编辑过的 span 扩展到词边界，切成要学习的词组。
//!
//! 当前实现：
//! - `tokenize_span`：选出与 span 相交的所有 token，并附带“前一个 token”的范围
//! - `get_learn_tokens`：按位置排序后逐个处理，相邻的结果拼接成一整行
//!
//! 相邻判断靠 span 按值比较，依赖 `Tokenizer` 的确定性约定。
use crate::{span::TextSpan, tokenizer::Tokenized, tokenizer::Tokenizer};

/// 一个 span 的分词结果（范围均为文档绝对偏移）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanTokens {
    pub tokens: Vec<String>,
    pub spans: Vec<(usize, usize)>,
    /// 第一个选中 token 之前那个 token 的范围（拼接时的连接键）
    pub span_before: Option<(usize, usize)>,
}

/// 学习策略（纯算法，不持有状态）。
pub struct LearnStrategy<'a, T: ?Sized> {
    /// 分词器引用（分词发生在这里）
    pub tokenizer: &'a mut T,
}

impl<'a, T> LearnStrategy<'a, T>
where
    T: Tokenizer + ?Sized,
{
    pub fn new(tokenizer: &'a mut T) -> Self {
        Self { tokenizer }
    }

    /// 选出与 `span` 相交的 token；`prepend_n > 0` 时再往前多带几个 token。
    ///
    /// 零宽 span 恰好落在 token 边界上时不选中任何 token：单纯挪动光标不该触发学习。
    /// span 不在快照范围内时返回空结果。
    pub fn tokenize_span(&mut self, span: &TextSpan, prepend_n: usize) -> SpanTokens {
        let Some((begin, end)) = span.local_range() else {
            tracing::warn!(
                begin = span.begin(),
                end = span.end(),
                offset = span.offset(),
                "span 超出文本快照，跳过"
            );
            return SpanTokens::default();
        };

        let Tokenized { tokens, spans } = self.tokenizer.tokenize(span.text());
        if tokens.len() != spans.len() {
            tracing::error!(
                tokens = tokens.len(),
                spans = spans.len(),
                "分词结果 token 与 span 数量不一致"
            );
            return SpanTokens::default();
        }

        let mut selected = spans
            .iter()
            .enumerate()
            .filter(|&(_, &(s, e))| begin < e && end > s)
            .map(|(i, _)| i);
        let Some(first) = selected.next() else {
            return SpanTokens::default();
        };
        let last = selected.last().unwrap_or(first);
        let first = first.saturating_sub(prepend_n);

        let offset = span.offset();
        let shift = |(s, e): (usize, usize)| (s + offset, e + offset);
        SpanTokens {
            tokens: tokens[first..=last].to_vec(),
            spans: spans[first..=last].iter().copied().map(shift).collect(),
            span_before: first.checked_sub(1).map(|i| shift(spans[i])),
        }
    }

    /// 把一组 span 变成若干互不相交、按词对齐的词组，每组学习一行。
    ///
    /// 新结果的连接键（`span_before`，没有时取自己第一个 token）若出现在上一组里，
    /// 就从那里截断上一组（丢弃旧的尾巴）并接上新 token；否则另起一组。
    pub fn get_learn_tokens(&mut self, spans: &[TextSpan]) -> Vec<Vec<String>> {
        let mut sorted: Vec<&TextSpan> = spans.iter().collect();
        sorted.sort_by_key(|s| (s.begin(), s.end()));

        let mut groups: Vec<(Vec<String>, Vec<(usize, usize)>)> = Vec::new();
        for span in sorted {
            let SpanTokens {
                tokens,
                spans,
                span_before,
            } = self.tokenize_span(span, 0);
            if tokens.is_empty() {
                continue;
            }

            // 通过 span_before 连上时保留匹配到的那个 token；
            // 同一个词里的两处编辑则靠第一个 token 本身连上
            let found = groups.last().and_then(|(_, group_spans)| {
                let position = |link: (usize, usize)| group_spans.iter().position(|s| *s == link);
                span_before
                    .and_then(|before| position(before).map(|k| k + 1))
                    .or_else(|| position(spans[0]))
            });

            match (found, groups.last_mut()) {
                (Some(keep), Some((group_tokens, group_spans))) => {
                    group_tokens.truncate(keep);
                    group_spans.truncate(keep);
                    group_tokens.extend(tokens);
                    group_spans.extend(spans);
                }
                _ => groups.push((tokens, spans)),
            }
        }

        groups.into_iter().map(|(tokens, _)| tokens).collect()
    }

    /// `get_learn_tokens` 的结果按空格拼成学习用的文本行。
    pub fn get_learn_lines(&mut self, spans: &[TextSpan]) -> Vec<String> {
        self.get_learn_tokens(spans)
            .into_iter()
            .map(|tokens| tokens.join(" "))
            .collect()
    }
}
