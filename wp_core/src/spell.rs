//! 拼写检查：找出光标处（或紧挨在它前面）的词，交给外部拼写检查器。

/// 拼写检查器（外部协作者）。
pub trait SpellChecker {
    /// 按推荐度排序的纠正候选；词拼写正确时返回空列表。
    fn suggestions(&mut self, word: &str) -> Vec<String>;
}

/// 选出要做拼写检查的词（行内字符范围）。
///
/// - 优先取包含光标的词（光标在词尾也算）
/// - 否则取紧挨在光标前、中间只隔一个字符的词（刚敲完空格的情形）
/// - 光标正好在词尾且用户正在输入这个词时不检查，免得边打字边闪红线
pub fn word_to_spell_check(
    spans: &[(usize, usize)],
    cursor: usize,
    is_typing: bool,
) -> Option<(usize, usize)> {
    let span = spans
        .iter()
        .copied()
        .find(|&(begin, end)| begin <= cursor && cursor <= end)
        .or_else(|| {
            spans
                .iter()
                .copied()
                .rev()
                .find(|&(_, end)| end < cursor)
                .filter(|&(_, end)| end + 1 >= cursor)
        })?;
    if span.1 == cursor && is_typing {
        return None;
    }
    Some(span)
}

#[cfg(test)]
mod tests {
    use super::*;

    // "helo wrld"
    const SPANS: &[(usize, usize)] = &[(0, 4), (5, 9)];

    #[test]
    fn suppressed_while_typing_at_word_end() {
        assert_eq!(word_to_spell_check(SPANS, 4, true), None);
        assert_eq!(word_to_spell_check(SPANS, 4, false), Some((0, 4)));
    }

    #[test]
    fn cursor_inside_word() {
        assert_eq!(word_to_spell_check(SPANS, 2, true), Some((0, 4)));
        assert_eq!(word_to_spell_check(SPANS, 7, false), Some((5, 9)));
    }

    #[test]
    fn word_just_before_cursor() {
        // "helo |"
        assert_eq!(word_to_spell_check(&[(0, 4)], 5, true), Some((0, 4)));
        // "helo  |" 隔得太远
        assert_eq!(word_to_spell_check(&[(0, 4)], 6, false), None);
    }

    #[test]
    fn no_words() {
        assert_eq!(word_to_spell_check(&[], 0, false), None);
    }
}
