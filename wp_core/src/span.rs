//! `TextSpan`：一段被编辑过的文本范围。
//!
//! 约定：
//! - `begin/end` 是文档中的**绝对字符偏移**，半开区间 `[begin, end)`
//! - `text` 是创建/刷新时的文本快照，可以比范围本身大得多（通常是整篇文本或整行）
//! - `text_offset` 是 `text` 第一个字符在文档中的绝对偏移，用于和局部下标互相换算
use std::time::Instant;

/// 被编辑过的文本范围（附带文本快照与最近修改时间）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    begin: usize,
    end: usize,
    text: String,
    /// `text` 的字符数（缓存，避免反复 `chars().count()`）
    text_len: usize,
    text_offset: usize,
    last_modified: Instant,
}

impl TextSpan {
    /// 创建范围 `[begin, end)`；`end < begin` 时收缩为空范围。
    pub fn new(begin: usize, end: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            begin,
            end: end.max(begin),
            text_len: text.chars().count(),
            text,
            text_offset: 0,
            last_modified: Instant::now(),
        }
    }

    /// 设置快照在文档中的起始偏移。
    pub fn text_offset(mut self, offset: usize) -> Self {
        self.text_offset = offset;
        self
    }

    /// 设置最近修改时间。
    pub fn modified_at(mut self, at: Instant) -> Self {
        self.last_modified = at;
        self
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// 快照文本（偏移以 `offset()` 为基准）。
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 快照第一个字符的绝对偏移。
    pub fn offset(&self) -> usize {
        self.text_offset
    }

    pub fn last_modified(&self) -> Instant {
        self.last_modified
    }

    /// 把绝对范围换算成快照内的局部范围；范围落在快照之外时返回 `None`。
    pub fn local_range(&self) -> Option<(usize, usize)> {
        let begin = self.begin.checked_sub(self.text_offset)?;
        let end = self.end.checked_sub(self.text_offset)?;
        (end <= self.text_len).then_some((begin, end))
    }

    /// 范围内的文本（快照不覆盖该范围时为 `None`）。
    pub fn span_text(&self) -> Option<String> {
        let (begin, end) = self.local_range()?;
        Some(self.text.chars().skip(begin).take(end - begin).collect())
    }

    /// 两个范围是否重叠或首尾相接（相接的编辑视为同一段连续编辑）。
    pub fn touches(&self, other: &TextSpan) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }

    /// 范围是否包含位置 `pos`（两端都算在内，插入点落在边界上也算）。
    pub fn contains(&self, pos: usize) -> bool {
        self.begin <= pos && pos <= self.end
    }

    pub(crate) fn set_range(&mut self, begin: usize, end: usize) {
        self.begin = begin;
        self.end = end.max(begin);
    }

    pub(crate) fn set_text(&mut self, text: &str, offset: usize) {
        self.text.clear();
        self.text.push_str(text);
        self.text_len = text.chars().count();
        self.text_offset = offset;
    }

    pub(crate) fn touch(&mut self, at: Instant) {
        if at > self.last_modified {
            self.last_modified = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_range_respects_text_offset() {
        let span = TextSpan::new(14, 16, "word3 tail").text_offset(12);
        assert_eq!(span.local_range(), Some((2, 4)));
        assert_eq!(span.span_text().as_deref(), Some("rd"));
    }

    #[test]
    fn local_range_outside_snapshot_is_none() {
        let before = TextSpan::new(3, 5, "abc").text_offset(10);
        assert_eq!(before.local_range(), None);

        let past_end = TextSpan::new(2, 9, "abc");
        assert_eq!(past_end.local_range(), None);
    }

    #[test]
    fn inverted_range_collapses() {
        let span = TextSpan::new(7, 3, "");
        assert_eq!((span.begin(), span.end()), (7, 7));
        assert!(span.is_empty());
    }

    #[test]
    fn touching_spans() {
        let a = TextSpan::new(0, 5, "");
        let b = TextSpan::new(5, 8, "");
        let c = TextSpan::new(9, 9, "");
        assert!(a.touches(&b));
        assert!(!b.touches(&c));
        assert!(b.contains(8));
        assert!(!b.contains(9));
    }
}
