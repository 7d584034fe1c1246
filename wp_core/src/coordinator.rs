//! `PredictionCoordinator`：对宿主（CLI/键盘 UI）提供的协调器。
//!
//! 协调器自身不直接改文本，而是：
//! - 持有文本上下文提供方（读光标附近的文本、拿 `TextChanges`）
//! - 持有预测服务门面、拼写检查器、学习调度、标点辅助
//! - 文本变化时整体重算 `Choices`
//! - 把“接受候选/标点辅助”翻译成 `KeyAction`，交给宿主投递
//!
//! 状态：`Idle`（没有获得焦点的输入框）-> `Tracking` -> 失去焦点时提交并回到 `Idle`。
use std::rc::Rc;

use crate::{
    clock::Clock,
    config::PredictionConfig,
    context::{EditKind, TextContext},
    filter::{CapitalizeFirst, DedupTruncate, Filter},
    key_event::{
        ChoiceAction, KEYSYM_BACKSPACE, KEYSYM_DELETE, Key, KeyAction, repeat_keysym, text_actions,
    },
    lru::LruLearnStrategy,
    model::Choices,
    predictor::WordPredictor,
    punctuator::Punctuator,
    service::Connector,
    spell::{SpellChecker, word_to_spell_check},
    tokenizer::SENTENCE_BEGIN,
};

/// 接受预测后自动补的分隔符。
const AUTO_SEPARATOR: char = ' ';

/// 协调器状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// 没有跟踪中的输入框
    Idle,
    /// 正在跟踪一个输入框
    Tracking,
}

/// 单个输入框上的预测/纠错/学习协调器。
pub struct PredictionCoordinator<C: Connector, T: TextContext> {
    config: PredictionConfig,
    predictor: WordPredictor<C>,
    text_context: T,
    spell_checker: Option<Box<dyn SpellChecker>>,
    learn_strategy: LruLearnStrategy,
    punctuator: Punctuator,
    clock: Rc<dyn Clock>,
    state: CoordinatorState,
    choices: Choices,
}

impl<C, T> PredictionCoordinator<C, T>
where
    C: Connector,
    T: TextContext,
{
    /// 创建协调器，并按配置设置模型路由与学习调度。
    pub fn new(
        config: PredictionConfig,
        predictor: WordPredictor<C>,
        text_context: T,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let mut predictor = predictor.max_context_chars(config.max_context_chars);
        predictor.set_models(
            &config.system_models,
            &config.user_models,
            &config.auto_learn_models,
        );
        let learn_strategy = LruLearnStrategy::new(config.learn_delay(), config.poll_interval());
        Self {
            config,
            predictor,
            text_context,
            spell_checker: None,
            learn_strategy,
            punctuator: Punctuator::new(),
            clock,
            state: CoordinatorState::Idle,
            choices: Choices::default(),
        }
    }

    pub fn with_spell_checker(mut self, checker: Box<dyn SpellChecker>) -> Self {
        self.spell_checker = Some(checker);
        self
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// 当前候选快照（只读）。
    pub fn choices(&self) -> &Choices {
        &self.choices
    }

    pub fn correction_choices(&self) -> &[String] {
        &self.choices.corrections
    }

    pub fn prediction_choices(&self) -> &[String] {
        &self.choices.predictions
    }

    pub fn punctuator(&self) -> &Punctuator {
        &self.punctuator
    }

    pub fn learn_strategy(&self) -> &LruLearnStrategy {
        &self.learn_strategy
    }

    pub fn predictor(&self) -> &WordPredictor<C> {
        &self.predictor
    }

    pub fn predictor_mut(&mut self) -> &mut WordPredictor<C> {
        &mut self.predictor
    }

    pub fn text_context(&self) -> &T {
        &self.text_context
    }

    /// 宿主通过它把 `KeyAction` 投递给按键注入端。
    pub fn text_context_mut(&mut self) -> &mut T {
        &mut self.text_context
    }

    /// 新的输入框获得焦点：先提交上一个输入框的编辑，再开始跟踪。
    pub fn on_text_entry_activated(&mut self) {
        if self.state == CoordinatorState::Tracking {
            self.commit_changes();
        }
        self.punctuator.reset();
        self.state = CoordinatorState::Tracking;
        tracing::debug!("开始跟踪输入框");
        self.on_text_context_changed();
    }

    /// 输入框失去焦点：提交全部编辑并回到 `Idle`。
    pub fn on_focus_lost(&mut self) {
        self.commit_changes();
        self.punctuator.reset();
        self.state = CoordinatorState::Idle;
        tracing::debug!("输入框失去焦点");
    }

    /// 光标移动或文本被编辑：重算纠错与预测候选，并通知学习调度。
    ///
    /// 读不到文本上下文时跳过本轮，保留上一轮的候选。
    pub fn on_text_context_changed(&mut self) {
        if self.state == CoordinatorState::Idle {
            return;
        }
        let (Some(span), Some(context)) = (
            self.text_context.span_at_cursor(),
            self.text_context.context(),
        ) else {
            tracing::debug!("读不到文本上下文，跳过本轮更新");
            return;
        };
        let Some((line_cursor, _)) = span.local_range() else {
            tracing::debug!("光标不在当前行内，跳过本轮更新");
            return;
        };
        let line = span.text();

        let (correction_span, corrections) = self.compute_corrections(line, line_cursor);
        let predictions = self.compute_predictions(&context);
        let word_infos = self.predictor.word_infos(line);
        self.choices = Choices {
            correction_span,
            corrections,
            predictions,
            word_infos,
        };

        let changes = self.text_context.changes_mut();
        if self.config.auto_learn {
            self.learn_strategy
                .on_text_context_changed(changes, self.clock.now());
        } else {
            changes.clear();
        }
    }

    /// 学习全部待学习的编辑（关闭自动学习时直接丢弃），并清空候选。
    pub fn commit_changes(&mut self) {
        let changes = self.text_context.changes_mut();
        if self.config.auto_learn {
            self.learn_strategy
                .commit_changes(changes, &mut self.predictor);
        } else {
            self.learn_strategy.discard_changes(changes);
        }
        self.text_context.reset();
        self.choices = Choices::default();
    }

    /// 丢弃全部待学习的编辑（例如检测到密码框）。
    pub fn discard_changes(&mut self) {
        self.learn_strategy
            .discard_changes(self.text_context.changes_mut());
        self.text_context.reset();
    }

    /// 宿主循环定期调用：轮询到点时学习过期的编辑。返回轮询是否仍在运行。
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        self.learn_strategy
            .poll(self.text_context.changes_mut(), &mut self.predictor, now)
    }

    /// 处理用户选中的候选，返回要投递的按键。
    pub fn handle(&mut self, action: ChoiceAction) -> Vec<KeyAction> {
        match action {
            ChoiceAction::Correction(index) => self.accept_correction(index),
            ChoiceAction::Prediction {
                index,
                allow_separator,
            } => self.accept_prediction(index, allow_separator),
        }
    }

    /// 用第 `index` 个纠正候选替换被检查的词，光标相对词尾的位置保持不变。
    pub fn accept_correction(&mut self, index: usize) -> Vec<KeyAction> {
        let (Some((begin, end)), Some(replacement)) = (
            self.choices.correction_span,
            self.choices.corrections.get(index).cloned(),
        ) else {
            tracing::warn!(index, "没有这个纠正候选");
            return Vec::new();
        };
        let (Some(line), Some(cursor)) = (
            self.text_context.line(),
            self.text_context.line_cursor(),
        ) else {
            return Vec::new();
        };
        let chars: Vec<char> = line.chars().collect();
        if cursor < begin || end > chars.len() {
            tracing::warn!(begin, end, cursor, "纠正范围与当前行不一致，放弃");
            return Vec::new();
        }

        let mut actions = repeat_keysym(KEYSYM_BACKSPACE, cursor - begin);
        actions.extend(repeat_keysym(KEYSYM_DELETE, end.saturating_sub(cursor)));
        actions.extend(text_actions(&replacement));
        if cursor > end {
            let tail: String = chars[end..cursor].iter().collect();
            actions.extend(text_actions(&tail));
        }
        self.choices.clear_corrections();
        self.punctuator.set_added_separator(None);
        actions
    }

    /// 补全第 `index` 个预测候选，需要时补一个分隔符。
    ///
    /// 候选与已输入的半个词大小写不一致时（句首大写），先删掉半个词再整词输入。
    pub fn accept_prediction(&mut self, index: usize, allow_separator: bool) -> Vec<KeyAction> {
        let Some(candidate) = self.choices.predictions.get(index).cloned() else {
            tracing::warn!(index, "没有这个预测候选");
            return Vec::new();
        };
        let Some(context) = self.text_context.context() else {
            return Vec::new();
        };
        let partial = self.predictor.last_context_token(&context);

        let mut actions = Vec::new();
        let remainder = match candidate.strip_prefix(partial.as_str()) {
            Some(rest) => rest.to_string(),
            None => {
                actions.extend(repeat_keysym(KEYSYM_BACKSPACE, partial.chars().count()));
                candidate
            }
        };
        actions.extend(text_actions(&remainder));

        let separator = if allow_separator {
            self.auto_separator(&context, &remainder)
        } else {
            None
        };
        if let Some(separator) = separator {
            actions.push(KeyAction::Char(separator));
        }
        self.punctuator.set_added_separator(separator);
        actions
    }

    /// 物理按键生效前（标点辅助）。
    pub fn on_key_before_press(&mut self, key: &Key) -> Vec<KeyAction> {
        if !self.config.auto_punctuation {
            return Vec::new();
        }
        self.punctuator.on_before_press(key)
    }

    /// 物理按键松开后（标点辅助）。
    pub fn on_key_after_release(&mut self, key: &Key) -> Vec<KeyAction> {
        if !self.config.auto_punctuation {
            return Vec::new();
        }
        self.punctuator.on_after_press(key)
    }

    /// 最近一次编辑是在光标处的插入，并且还在“正在输入”的时间窗口内。
    fn is_typing(&self) -> bool {
        let (Some(edit), Some(cursor)) = (
            self.text_context.last_edit(),
            self.text_context.cursor(),
        ) else {
            return false;
        };
        edit.kind == EditKind::Insert
            && edit.end == cursor
            && self.clock.now().saturating_duration_since(edit.at) <= self.config.typing_window()
    }

    /// 光标处（或紧挨在它前面）的词的纠正候选。
    fn compute_corrections(
        &mut self,
        line: &str,
        line_cursor: usize,
    ) -> (Option<(usize, usize)>, Vec<String>) {
        if self.spell_checker.is_none() {
            return (None, Vec::new());
        }
        let is_typing = self.is_typing();
        let line_len = line.chars().count();
        // 引擎返回的 span 不可信：倒置或越界的丢掉
        let spans: Vec<(usize, usize)> = self
            .predictor
            .tokenize_text(line)
            .spans
            .into_iter()
            .filter(|&(begin, end)| begin <= end && end <= line_len)
            .collect();
        let Some((begin, end)) = word_to_spell_check(&spans, line_cursor, is_typing) else {
            return (None, Vec::new());
        };
        let word: String = line.chars().skip(begin).take(end - begin).collect();
        let Some(checker) = self.spell_checker.as_mut() else {
            return (None, Vec::new());
        };
        let suggestions = checker.suggestions(&word);
        if suggestions.is_empty() {
            return (None, Vec::new());
        }
        let limit = self.config.max_choices;
        (Some((begin, end)), DedupTruncate { limit }.apply(suggestions))
    }

    /// 以光标前文本为上下文请求预测；句首时不区分大小写并把候选首字母大写。
    fn compute_predictions(&mut self, context: &str) -> Vec<String> {
        let tokens = self.predictor.tokenize_context(context);
        let sentence_initial = tokens.len() >= 2 && tokens[tokens.len() - 2] == SENTENCE_BEGIN;
        let predictions = self.predictor.predict(
            context,
            !sentence_initial,
            !self.config.accent_insensitive,
            self.config.max_choices,
        );
        let predictions = if sentence_initial {
            CapitalizeFirst.apply(predictions)
        } else {
            predictions
        };
        DedupTruncate {
            limit: self.config.max_choices,
        }
        .apply(predictions)
    }

    /// 后面已经是分隔符，或者输入完以后末尾本来就是空白时不补。
    fn auto_separator(&self, context: &str, remainder: &str) -> Option<char> {
        let next = self
            .text_context
            .line()
            .zip(self.text_context.line_cursor())
            .and_then(|(line, cursor)| line.chars().nth(cursor));
        if next == Some(AUTO_SEPARATOR) {
            return None;
        }
        let last_typed = remainder.chars().last().or_else(|| context.chars().last());
        if last_typed.is_some_and(char::is_whitespace) {
            return None;
        }
        Some(AUTO_SEPARATOR)
    }
}
