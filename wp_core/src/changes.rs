//! `TextChanges`：自上次提交以来所有编辑过的范围。
//!
//! 不变量：集合内任意两个 span 都不重叠（首尾相接的也会被合并）。
//! 文本提供方每报告一次编辑就调用 `insert/delete`，这里负责平移、裁剪与合并。
use std::time::Instant;

use crate::span::TextSpan;

/// 编辑范围集合，按 `(begin, end)` 升序保存。
#[derive(Debug, Clone, Default)]
pub struct TextChanges {
    spans: Vec<TextSpan>,
}

impl TextChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// 最近一次被修改的 span（时间相同取靠前的一个）。
    pub fn most_recent(&self) -> Option<&TextSpan> {
        let mut most_recent: Option<&TextSpan> = None;
        for span in &self.spans {
            if most_recent.is_none_or(|m| m.last_modified() < span.last_modified()) {
                most_recent = Some(span);
            }
        }
        most_recent
    }

    /// 加入一个 span；与已有 span 重叠或相接时合并。
    pub fn add_span(&mut self, span: TextSpan) {
        self.spans.push(span);
        self.normalize();
    }

    /// 按范围移除 span，返回是否找到。
    pub fn remove_span(&mut self, span: &TextSpan) -> bool {
        let before = self.spans.len();
        self.spans
            .retain(|s| !(s.begin() == span.begin() && s.end() == span.end()));
        self.spans.len() != before
    }

    /// 记录一次插入：在 `pos` 处插入了 `len` 个字符。
    ///
    /// - `snapshot`：插入之后的完整文本（所有 span 的快照都会刷新为它）
    /// - 包含 `pos` 的 span 向后延伸；否则新建 `[pos, pos + len)`
    /// - `pos` 之后的 span 整体右移
    pub fn insert(&mut self, pos: usize, len: usize, snapshot: &str, now: Instant) {
        let mut extended = false;
        for span in &mut self.spans {
            let (begin, end) = (span.begin(), span.end());
            if !extended && span.contains(pos) {
                span.set_range(begin, end + len);
                span.touch(now);
                extended = true;
            } else if begin >= pos {
                span.set_range(begin + len, end + len);
            }
        }
        if !extended {
            self.spans
                .push(TextSpan::new(pos, pos + len, "").modified_at(now));
        }
        self.normalize();
        self.refresh_text(snapshot);
    }

    /// 记录一次删除：删掉了 `[pos, pos + len)`。
    ///
    /// 之后的 span 左移，相交的 span 被裁剪；删除点本身记为一个零宽 span，
    /// 这样被删改过的单词之后仍会被重新学习。
    pub fn delete(&mut self, pos: usize, len: usize, snapshot: &str, now: Instant) {
        let del_end = pos + len;
        let map = |x: usize| {
            if x <= pos {
                x
            } else if x >= del_end {
                x - len
            } else {
                pos
            }
        };
        let mut covered = false;
        for span in &mut self.spans {
            let (begin, end) = (span.begin(), span.end());
            let hit = begin <= del_end && end >= pos;
            span.set_range(map(begin), map(end));
            if hit {
                span.touch(now);
            }
            covered |= span.contains(pos);
        }
        if !covered {
            self.spans.push(TextSpan::new(pos, pos, "").modified_at(now));
        }
        self.normalize();
        self.refresh_text(snapshot);
    }

    /// 刷新所有 span 的文本快照（快照从文档开头算起）。
    pub fn refresh_text(&mut self, snapshot: &str) {
        for span in &mut self.spans {
            span.set_text(snapshot, 0);
        }
    }

    /// 检查不重叠不变量。
    pub fn is_disjoint(&self) -> bool {
        self.spans.windows(2).all(|w| w[0].end() <= w[1].begin())
    }

    /// 排序并合并重叠/相接的 span，合并后取较新的修改时间与较新的快照。
    fn normalize(&mut self) {
        self.spans
            .sort_by(|a, b| (a.begin(), a.end()).cmp(&(b.begin(), b.end())));
        let mut merged: Vec<TextSpan> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            match merged.last_mut() {
                Some(last) if last.touches(&span) => {
                    let end = last.end().max(span.end());
                    let begin = last.begin();
                    if span.last_modified() > last.last_modified() {
                        *last = span;
                    }
                    last.set_range(begin, end);
                }
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ranges(changes: &TextChanges) -> Vec<(usize, usize)> {
        changes.spans().iter().map(|s| (s.begin(), s.end())).collect()
    }

    #[test]
    fn typing_extends_one_span() {
        let t0 = Instant::now();
        let mut changes = TextChanges::new();
        changes.insert(0, 1, "h", t0);
        changes.insert(1, 1, "he", t0);
        changes.insert(2, 1, "hey", t0);
        assert_eq!(ranges(&changes), vec![(0, 3)]);
        assert_eq!(changes.spans()[0].text(), "hey");
    }

    #[test]
    fn insert_before_shifts_later_spans() {
        let t0 = Instant::now();
        let mut changes = TextChanges::new();
        changes.add_span(TextSpan::new(10, 12, "").modified_at(t0));
        changes.insert(2, 3, "xxxxxxxxxxxxxxxx", t0);
        assert_eq!(ranges(&changes), vec![(2, 5), (13, 15)]);
    }

    #[test]
    fn add_span_merges_touching_and_overlapping() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(5);
        let mut changes = TextChanges::new();
        changes.add_span(TextSpan::new(0, 4, "").modified_at(t0));
        changes.add_span(TextSpan::new(4, 6, "").modified_at(t1));
        changes.add_span(TextSpan::new(20, 22, "").modified_at(t0));
        changes.add_span(TextSpan::new(21, 25, "").modified_at(t0));
        assert_eq!(ranges(&changes), vec![(0, 6), (20, 25)]);
        assert_eq!(changes.spans()[0].last_modified(), t1);
    }

    #[test]
    fn delete_clips_and_shifts() {
        let t0 = Instant::now();
        let mut changes = TextChanges::new();
        changes.add_span(TextSpan::new(2, 6, "").modified_at(t0));
        changes.add_span(TextSpan::new(10, 12, "").modified_at(t0));
        // 删除 [4, 8)：第一个 span 被裁剪为 [2, 4)，第二个左移到 [6, 8)
        changes.delete(4, 4, "abcdefgh", t0);
        assert_eq!(ranges(&changes), vec![(2, 4), (6, 8)]);
    }

    #[test]
    fn delete_records_empty_span() {
        let t0 = Instant::now();
        let mut changes = TextChanges::new();
        changes.delete(7, 1, "word1 wrd2", t0);
        assert_eq!(ranges(&changes), vec![(7, 7)]);
    }

    #[test]
    fn remove_span_by_range() {
        let mut changes = TextChanges::new();
        changes.add_span(TextSpan::new(0, 2, ""));
        changes.add_span(TextSpan::new(5, 7, ""));
        assert!(changes.remove_span(&TextSpan::new(5, 7, "other text")));
        assert!(!changes.remove_span(&TextSpan::new(5, 7, "")));
        assert_eq!(ranges(&changes), vec![(0, 2)]);
    }

    #[test]
    fn most_recent_prefers_newest() {
        let t0 = Instant::now();
        let mut changes = TextChanges::new();
        changes.add_span(TextSpan::new(0, 2, "").modified_at(t0 + Duration::from_secs(30)));
        changes.add_span(TextSpan::new(5, 7, "").modified_at(t0));
        let recent = changes.most_recent().map(|s| s.begin());
        assert_eq!(recent, Some(0));
    }
}
