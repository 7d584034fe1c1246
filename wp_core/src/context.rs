//! 文本上下文：协调器从这里读光标附近的文本，也从这里拿 `TextChanges`。
//!
//! 约定：
//! - 所有偏移都是字符偏移
//! - 读取可能失败（无障碍接口读不到、控件已销毁），这时返回 `None`，
//!   协调器把它当作“本轮没有可用数据”跳过
//! - `TextChanges` 归协调器/学习策略独占，提供方只在报告编辑时往里记
use std::{rc::Rc, time::Instant};

use crate::{
    changes::TextChanges,
    clock::Clock,
    key_event::{
        KEYSYM_BACKSPACE, KEYSYM_DELETE, KEYSYM_END, KEYSYM_HOME, KEYSYM_LEFT, KEYSYM_RETURN,
        KEYSYM_RIGHT, KeySink,
    },
    span::TextSpan,
};

/// 编辑类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Delete,
}

/// 最近一次编辑。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    pub kind: EditKind,
    /// 编辑起点（绝对偏移）
    pub begin: usize,
    /// 插入：插入文本之后的位置；删除：删除点
    pub end: usize,
    pub at: Instant,
}

/// 文本上下文提供方（当前获得焦点的文本控件）。
pub trait TextContext {
    /// 光标之前的全部文本。
    fn context(&self) -> Option<String>;
    /// 光标所在行。
    fn line(&self) -> Option<String>;
    /// 光标在行内的偏移。
    fn line_cursor(&self) -> Option<usize>;
    /// 光标的绝对偏移。
    fn cursor(&self) -> Option<usize>;
    /// 光标处的零宽 span，快照为光标所在行。
    fn span_at_cursor(&self) -> Option<TextSpan>;
    fn changes(&self) -> &TextChanges;
    fn changes_mut(&mut self) -> &mut TextChanges;
    fn last_edit(&self) -> Option<EditRecord>;
    /// 清空跟踪状态（不学习）。
    fn reset(&mut self);
}

/// 内存中的编辑缓冲区：既是文本上下文提供方，也是按键注入端。
///
/// 协调器发出的按键经它落到文本上，编辑又被记进 `TextChanges`，
/// 从而闭合“发按键 -> 文本变化 -> 重新预测”的回路。
pub struct EditBuffer {
    text: Vec<char>,
    cursor: usize,
    changes: TextChanges,
    last_edit: Option<EditRecord>,
    /// 下一个字符大写
    shift_latched: bool,
    clock: Rc<dyn Clock>,
}

impl EditBuffer {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            text: Vec::new(),
            cursor: 0,
            changes: TextChanges::new(),
            last_edit: None,
            shift_latched: false,
            clock,
        }
    }

    /// 载入已有内容（光标放在末尾，不算作编辑）。
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.chars().collect();
        self.cursor = self.text.len();
        self
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn is_shift_latched(&self) -> bool {
        self.shift_latched
    }

    /// 移动光标（不算编辑）。
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.text.len());
    }

    /// 在光标处插入文本。
    pub fn insert_text(&mut self, s: &str) {
        let inserted: Vec<char> = s.chars().collect();
        if inserted.is_empty() {
            return;
        }
        let pos = self.cursor;
        let len = inserted.len();
        self.text.splice(pos..pos, inserted);
        self.cursor += len;
        let now = self.clock.now();
        let snapshot = self.text();
        self.changes.insert(pos, len, &snapshot, now);
        self.last_edit = Some(EditRecord {
            kind: EditKind::Insert,
            begin: pos,
            end: pos + len,
            at: now,
        });
    }

    /// 删除光标前 n 个字符（退格）。
    pub fn delete_before(&mut self, n: usize) {
        let n = n.min(self.cursor);
        self.cursor -= n;
        self.delete_at(self.cursor, n);
    }

    /// 删除光标后 n 个字符。
    pub fn delete_after(&mut self, n: usize) {
        let n = n.min(self.text.len() - self.cursor);
        self.delete_at(self.cursor, n);
    }

    fn delete_at(&mut self, pos: usize, n: usize) {
        if n == 0 {
            return;
        }
        self.text.drain(pos..pos + n);
        let now = self.clock.now();
        let snapshot = self.text();
        self.changes.delete(pos, n, &snapshot, now);
        self.last_edit = Some(EditRecord {
            kind: EditKind::Delete,
            begin: pos,
            end: pos,
            at: now,
        });
    }

    /// 光标所在行的范围 [begin, end)。
    fn line_range(&self) -> (usize, usize) {
        let begin = self.text[..self.cursor]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);
        let end = self.text[self.cursor..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.text.len(), |i| self.cursor + i);
        (begin, end)
    }
}

impl TextContext for EditBuffer {
    fn context(&self) -> Option<String> {
        Some(self.text[..self.cursor].iter().collect())
    }

    fn line(&self) -> Option<String> {
        let (begin, end) = self.line_range();
        Some(self.text[begin..end].iter().collect())
    }

    fn line_cursor(&self) -> Option<usize> {
        let (begin, _) = self.line_range();
        Some(self.cursor - begin)
    }

    fn cursor(&self) -> Option<usize> {
        Some(self.cursor)
    }

    fn span_at_cursor(&self) -> Option<TextSpan> {
        let (begin, end) = self.line_range();
        let line: String = self.text[begin..end].iter().collect();
        Some(TextSpan::new(self.cursor, self.cursor, line).text_offset(begin))
    }

    fn changes(&self) -> &TextChanges {
        &self.changes
    }

    fn changes_mut(&mut self) -> &mut TextChanges {
        &mut self.changes
    }

    fn last_edit(&self) -> Option<EditRecord> {
        self.last_edit
    }

    fn reset(&mut self) {
        self.changes.clear();
        self.last_edit = None;
        self.shift_latched = false;
    }
}

impl KeySink for EditBuffer {
    fn press_keysym(&mut self, name: &str) {
        match name {
            KEYSYM_BACKSPACE => self.delete_before(1),
            KEYSYM_DELETE => self.delete_after(1),
            KEYSYM_LEFT => self.cursor = self.cursor.saturating_sub(1),
            KEYSYM_RIGHT => self.cursor = (self.cursor + 1).min(self.text.len()),
            KEYSYM_HOME => self.cursor = self.line_range().0,
            KEYSYM_END => self.cursor = self.line_range().1,
            KEYSYM_RETURN => self.insert_text("\n"),
            other => tracing::debug!(keysym = other, "忽略未知按键"),
        }
    }

    fn release_keysym(&mut self, _name: &str) {}

    fn press_unicode(&mut self, ch: char) {
        if self.shift_latched {
            self.shift_latched = false;
            let upper: String = ch.to_uppercase().collect();
            self.insert_text(&upper);
        } else {
            let mut buf = [0u8; 4];
            self.insert_text(ch.encode_utf8(&mut buf));
        }
    }

    fn release_unicode(&mut self, _ch: char) {}

    fn latch_shift(&mut self) {
        self.shift_latched = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, key_event::KeyAction, key_event::text_actions};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn buffer() -> (EditBuffer, ManualClock) {
        let clock = ManualClock::new();
        (EditBuffer::new(Rc::new(clock.clone())), clock)
    }

    fn ranges(buffer: &EditBuffer) -> Vec<(usize, usize)> {
        buffer
            .changes()
            .spans()
            .iter()
            .map(|s| (s.begin(), s.end()))
            .collect()
    }

    #[test]
    fn typing_records_one_span() {
        let (mut buffer, clock) = buffer();
        buffer.send(&text_actions("hello"));
        assert_eq!(buffer.text(), "hello");
        assert_eq!(ranges(&buffer), vec![(0, 5)]);
        let edit = buffer.last_edit().unwrap();
        assert_eq!((edit.kind, edit.end, edit.at), (EditKind::Insert, 5, clock.now()));
    }

    #[test]
    fn backspace_and_delete() {
        let (mut buffer, _clock) = buffer();
        buffer.send(&text_actions("abcd"));
        buffer.send(&[
            KeyAction::Keysym(KEYSYM_LEFT),
            KeyAction::Keysym(KEYSYM_LEFT),
            KeyAction::Keysym(KEYSYM_BACKSPACE),
            KeyAction::Keysym(KEYSYM_DELETE),
        ]);
        assert_eq!(buffer.text(), "ad");
        assert_eq!(buffer.cursor(), Some(1));
        assert_eq!(buffer.last_edit().map(|e| e.kind), Some(EditKind::Delete));
        assert_eq!(ranges(&buffer), vec![(0, 2)]);
    }

    #[test]
    fn latched_shift_capitalizes_one_char() {
        let (mut buffer, _clock) = buffer();
        buffer.send(&[KeyAction::LatchShift]);
        buffer.send(&text_actions("ab"));
        assert_eq!(buffer.text(), "Ab");
        assert!(!buffer.is_shift_latched());
    }

    #[test]
    fn line_and_context() {
        let (buffer, _clock) = buffer();
        let mut buffer = buffer.with_text("first line\nsecond line");
        buffer.set_cursor(18);
        assert_eq!(buffer.context().as_deref(), Some("first line\nsecond "));
        assert_eq!(buffer.line().as_deref(), Some("second line"));
        assert_eq!(buffer.line_cursor(), Some(7));

        let span = buffer.span_at_cursor().unwrap();
        assert_eq!((span.begin(), span.offset()), (18, 11));
        assert_eq!(span.local_range(), Some((7, 7)));

        buffer.send(&[KeyAction::Keysym(KEYSYM_HOME)]);
        assert_eq!(buffer.cursor(), Some(11));
        buffer.send(&[KeyAction::Keysym(KEYSYM_END)]);
        assert_eq!(buffer.cursor(), Some(22));
        // 载入的已有内容不算编辑
        assert!(buffer.changes().is_empty());
    }

    #[test]
    fn edits_are_timestamped() {
        let (mut buffer, clock) = buffer();
        let t0 = clock.now();
        buffer.insert_text("one");
        clock.advance(Duration::from_secs(10));
        buffer.insert_text(" two");
        let spans = buffer.changes().spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].last_modified(), t0 + Duration::from_secs(10));
        assert_eq!(spans[0].text(), "one two");
    }

    #[test]
    fn reset_forgets_changes() {
        let (mut buffer, _clock) = buffer();
        buffer.insert_text("junk");
        buffer.reset();
        assert!(buffer.changes().is_empty());
        assert_eq!(buffer.last_edit(), None);
        assert_eq!(buffer.text(), "junk");
    }
}
