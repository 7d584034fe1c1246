//! `WordPredictor`：预测服务门面。
//!
//! 结构上对应：
//! - connector（懒连接） -> 调用 -> 连接类失败时丢弃连接、重连并重试一次 -> 仍失败则返回空结果
//!
//! 门面从不把错误抛给协调器：后端挂了键盘也得能用。
use crate::{
    error::ServiceError,
    lru::Learner,
    model::WordInfo,
    service::{Connector, LanguageModelService, ModelClass, PredictOptions},
    tokenizer::{Tokenized, Tokenizer},
};

/// 一次调用最多尝试几次（首次 + 重连后重试一次）。
const MAX_ATTEMPTS: usize = 2;
/// 默认发给服务的上下文长度（字符）。
const DEFAULT_CONTEXT_CHARS: usize = 1024;

/// 带重连重试的预测服务门面。
pub struct WordPredictor<C: Connector> {
    connector: C,
    /// 缓存的连接；出现连接类故障时丢弃
    connection: Option<C::Connection>,
    /// 预测/查词使用的模型（system + user）
    models: Vec<String>,
    /// 自动学习写入的模型；为空时不学习
    auto_learn_models: Vec<String>,
    max_context_chars: usize,
}

impl<C: Connector> WordPredictor<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connection: None,
            models: Vec::new(),
            auto_learn_models: Vec::new(),
            max_context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }

    /// 限制发给服务的上下文长度（至少 1 个字符）。
    pub fn max_context_chars(mut self, n: usize) -> Self {
        self.max_context_chars = n.max(1);
        self
    }

    /// 设置模型路由。自动学习模型必须都属于用户模型，否则关闭自动学习。
    pub fn set_models(&mut self, system: &[String], user: &[String], auto_learn: &[String]) {
        self.models = system.iter().chain(user).cloned().collect();
        if let Some(missing) = auto_learn.iter().find(|m| !user.contains(m)) {
            tracing::warn!(model = %missing, "没有选择自动学习模型，请先设置学习");
            self.auto_learn_models.clear();
        } else {
            self.auto_learn_models = auto_learn.to_vec();
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn auto_learn_models(&self) -> &[String] {
        &self.auto_learn_models
    }

    /// 当前是否持有连接。
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// 为 `context` 末尾正在输入的词给出补全候选。
    pub fn predict(
        &mut self,
        context: &str,
        case_sensitive: bool,
        accent_sensitive: bool,
        limit: usize,
    ) -> Vec<String> {
        let context = tail_chars(context, self.max_context_chars).to_string();
        let models = self.models.clone();
        let options = PredictOptions {
            case_sensitive,
            accent_sensitive,
            limit,
        };
        self.call("predict", |service| {
            service.predict(&models, &context, options)
        })
    }

    /// 把一行文本学进自动学习模型。
    pub fn learn_text(&mut self, text: &str, allow_new_words: bool) {
        if self.auto_learn_models.is_empty() {
            tracing::debug!("没有自动学习模型，跳过学习");
            return;
        }
        if text.trim().is_empty() {
            return;
        }
        let models = self.auto_learn_models.clone();
        self.call("learn_text", |service| {
            service.learn_text(&models, text, allow_new_words)
        })
    }

    pub fn tokenize_text(&mut self, text: &str) -> Tokenized {
        self.call("tokenize_text", |service| service.tokenize_text(text))
    }

    pub fn tokenize_context(&mut self, text: &str) -> Vec<String> {
        let text = tail_chars(text, self.max_context_chars).to_string();
        self.call("tokenize_context", |service| service.tokenize_context(&text))
    }

    /// 上下文末尾正在输入的（半个）词。
    pub fn last_context_token(&mut self, text: &str) -> String {
        self.tokenize_context(text).pop().unwrap_or_default()
    }

    /// 对 `text` 逐词查询匹配情况。
    pub fn word_infos(&mut self, text: &str) -> Vec<WordInfo> {
        let models = self.models.clone();
        let entries = self.call("lookup_text", |service| service.lookup_text(&models, text));
        let chars: Vec<char> = text.chars().collect();
        entries
            .into_iter()
            .filter(|e| e.begin <= e.end && e.end <= chars.len())
            .map(|e| {
                let word: String = chars[e.begin..e.end].iter().collect();
                WordInfo {
                    begin: e.begin,
                    end: e.end,
                    exact_match: e.counts.iter().any(|&c| c == 1),
                    partial_match: e.counts.iter().any(|&c| c < 0),
                    ignored: word != e.token,
                    word,
                }
            })
            .collect()
    }

    pub fn model_names(&mut self, class: ModelClass) -> Vec<String> {
        self.call("model_names", |service| service.model_names(class))
    }

    /// 取缓存连接，没有就新建。
    fn connection(&mut self) -> Result<&mut C::Connection, ServiceError> {
        if self.connection.is_none() {
            self.connection = Some(self.connector.connect()?);
        }
        self.connection
            .as_mut()
            .ok_or_else(|| ServiceError::Disconnected("连接未建立".to_string()))
    }

    /// 执行一次服务调用：连接类失败时丢弃连接并重试一次，最终失败返回空结果。
    fn call<R, F>(&mut self, method: &'static str, mut f: F) -> R
    where
        R: Default,
        F: FnMut(&mut C::Connection) -> Result<R, ServiceError>,
    {
        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.connection().and_then(&mut f) {
                Ok(result) => return result,
                Err(e) if e.is_connection() => {
                    tracing::warn!(method, attempt, error = %e, "预测服务连接失败，重新连接");
                    self.connection = None;
                    last_error = Some(e);
                }
                Err(e) => {
                    last_error = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = last_error {
            tracing::error!(method, error = %e, "预测服务调用失败，返回空结果");
        }
        R::default()
    }
}

impl<C: Connector> Tokenizer for WordPredictor<C> {
    fn tokenize(&mut self, text: &str) -> Tokenized {
        self.tokenize_text(text)
    }

    fn tokenize_context(&mut self, text: &str) -> Vec<String> {
        WordPredictor::tokenize_context(self, text)
    }
}

impl<C: Connector> Learner for WordPredictor<C> {
    fn learn_text(&mut self, text: &str, allow_new_words: bool) {
        WordPredictor::learn_text(self, text, allow_new_words)
    }
}

/// 取末尾至多 `n` 个字符。
fn tail_chars(text: &str, n: usize) -> &str {
    match text.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((i, _)) => &text[i..],
        None => text,
    }
}
