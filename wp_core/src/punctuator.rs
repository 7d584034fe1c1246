//! `punctuator`：标点辅助。
//!
//! 接受预测后会自动补一个分隔符（通常是空格）。如果用户紧接着敲的是标点，
//! 就把那个分隔符挪到标点后面：`"word " + ","` 应该得到 `"word, "` 而不是 `"word ,"`；
//! 句末标点之后还要让下一个字母大写。
//!
//! 每次物理按键依次调用两次：按键生效前 `on_before_press`，生效后 `on_after_press`。
use crate::key_event::{KEYSYM_BACKSPACE, Key, KeyAction};

/// 分隔符要挪到后面的标点。
const CLAUSE_PUNCTUATION: &[char] = &[',', ':', ';'];
/// 分隔符要挪到后面、并且下一个字母要大写的标点。
const SENTENCE_PUNCTUATION: &[char] = &['.', '?', '!'];

/// 标点辅助状态机。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Punctuator {
    /// 上次接受预测时自动补上的分隔符
    added_separator: Option<char>,
    /// 本次按键前删掉的分隔符（按键后补回）
    separator_removed: Option<char>,
    /// 本次按键后锁存大写
    capitalize_next: bool,
}

impl Punctuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换文本输入目标时清空状态。
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 记录接受预测后是否补了分隔符。
    pub fn set_added_separator(&mut self, separator: Option<char>) {
        self.added_separator = separator;
    }

    pub fn added_separator(&self) -> Option<char> {
        self.added_separator
    }

    pub fn separator_removed(&self) -> bool {
        self.separator_removed.is_some()
    }

    pub fn capitalize_next(&self) -> bool {
        self.capitalize_next
    }

    /// 按键生效前：紧跟在自动分隔符后的标点先删掉那个分隔符。
    pub fn on_before_press(&mut self, key: &Key) -> Vec<KeyAction> {
        let Some(separator) = self.added_separator.take() else {
            return Vec::new();
        };
        let Some(ch) = key.as_char() else {
            return Vec::new();
        };

        if CLAUSE_PUNCTUATION.contains(&ch) {
            self.separator_removed = Some(separator);
        } else if SENTENCE_PUNCTUATION.contains(&ch) {
            self.separator_removed = Some(separator);
            self.capitalize_next = true;
        } else {
            return Vec::new();
        }
        vec![KeyAction::Keysym(KEYSYM_BACKSPACE)]
    }

    /// 按键生效后：补回分隔符，需要时锁存大写。
    pub fn on_after_press(&mut self, _key: &Key) -> Vec<KeyAction> {
        let mut actions = Vec::new();
        if let Some(separator) = self.separator_removed.take() {
            actions.push(KeyAction::Char(separator));
        }
        if self.capitalize_next {
            self.capitalize_next = false;
            actions.push(KeyAction::LatchShift);
        }
        actions
    }
}
