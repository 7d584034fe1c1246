//! 按键事件与按键输出。
//!
//! 说明：
//! - 唯一可用的编辑原语是“模拟按键”，所以 core 对目标程序的一切修改
//!   （退格、删除、重新输入、大写锁存）都表达成 `KeyAction`
//! - 宿主负责把 `KeyAction` 交给真正的按键注入端（实现 `KeySink`）

pub const KEYSYM_BACKSPACE: &str = "BackSpace";
pub const KEYSYM_DELETE: &str = "Delete";
pub const KEYSYM_LEFT: &str = "Left";
pub const KEYSYM_RIGHT: &str = "Right";
pub const KEYSYM_HOME: &str = "Home";
pub const KEYSYM_END: &str = "End";
pub const KEYSYM_RETURN: &str = "Return";

/// 用户按下的物理键。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// 普通字符键
    Char(char),
    /// 其他键（按 keysym 名称，例如 `BackSpace`）
    Keysym(String),
}

impl Key {
    pub fn as_char(&self) -> Option<char> {
        match *self {
            Key::Char(ch) => Some(ch),
            Key::Keysym(_) => None,
        }
    }
}

/// 引擎输出动作（每个动作投递时都是一次“按下 + 松开”）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// 按一次功能键
    Keysym(&'static str),
    /// 输入一个 unicode 字符
    Char(char),
    /// 锁存第二个 shift：只对下一个字符生效的大写
    LatchShift,
}

/// 用户选中的候选（封闭的动作类型，协调器穷尽匹配）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceAction {
    /// 接受第 n 个拼写纠正
    Correction(usize),
    /// 接受第 n 个预测；`allow_separator` 为 false 时不自动补分隔符
    Prediction { index: usize, allow_separator: bool },
}

/// 按键注入端。
pub trait KeySink {
    fn press_keysym(&mut self, name: &str);
    fn release_keysym(&mut self, name: &str);
    fn press_unicode(&mut self, ch: char);
    fn release_unicode(&mut self, ch: char);
    /// 锁存 shift，下一个字符大写
    fn latch_shift(&mut self);

    /// 依次投递动作。
    fn send(&mut self, actions: &[KeyAction]) {
        for action in actions {
            match *action {
                KeyAction::Keysym(name) => {
                    self.press_keysym(name);
                    self.release_keysym(name);
                }
                KeyAction::Char(ch) => {
                    self.press_unicode(ch);
                    self.release_unicode(ch);
                }
                KeyAction::LatchShift => self.latch_shift(),
            }
        }
    }
}

/// 把一段文本转成逐字符输入动作。
pub fn text_actions(text: &str) -> Vec<KeyAction> {
    text.chars().map(KeyAction::Char).collect()
}

/// 重复同一个功能键 n 次。
pub fn repeat_keysym(name: &'static str, n: usize) -> Vec<KeyAction> {
    vec![KeyAction::Keysym(name); n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl KeySink for Recorder {
        fn press_keysym(&mut self, name: &str) {
            self.0.push(format!("+{name}"));
        }
        fn release_keysym(&mut self, name: &str) {
            self.0.push(format!("-{name}"));
        }
        fn press_unicode(&mut self, ch: char) {
            self.0.push(format!("+{ch}"));
        }
        fn release_unicode(&mut self, ch: char) {
            self.0.push(format!("-{ch}"));
        }
        fn latch_shift(&mut self) {
            self.0.push("shift".to_string());
        }
    }

    #[test]
    fn send_pairs_press_and_release() {
        let mut sink = Recorder::default();
        let mut actions = repeat_keysym(KEYSYM_BACKSPACE, 1);
        actions.extend(text_actions("a"));
        actions.push(KeyAction::LatchShift);
        sink.send(&actions);
        assert_eq!(sink.0, vec!["+BackSpace", "-BackSpace", "+a", "-a", "shift"]);
    }
}
