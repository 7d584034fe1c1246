//! `MemoryModel`：进程内的语言模型引擎。
//!
//! 每个命名模型保存 unigram 与 bigram 计数；预测按“与前一个词的 bigram 计数 ->
//! 词频 -> 字母序”排序。
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use wp_core::{
    error::ServiceError,
    service::{LanguageModelService, LookupEntry, ModelClass, PredictOptions},
    tokenizer::{SENTENCE_BEGIN, Tokenized},
};
use wp_tokenize::WordTokenizer;

use crate::{error::ModelError, fold::normalize};

/// `lookup_text` 里数字统一报告成这个 token（不参与查词）。
pub const NUMBER_TOKEN: &str = "<num>";

#[derive(Debug, Clone)]
struct NgramModel {
    class: ModelClass,
    unigrams: BTreeMap<String, u32>,
    bigrams: HashMap<(String, String), u32>,
}

impl NgramModel {
    fn new(class: ModelClass) -> Self {
        Self {
            class,
            unigrams: BTreeMap::new(),
            bigrams: HashMap::new(),
        }
    }

    fn count(&self, word: &str) -> u32 {
        self.unigrams.get(word).copied().unwrap_or(0)
    }

    fn bigram(&self, prev: &str, word: &str) -> u32 {
        self.bigrams
            .get(&(prev.to_string(), word.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// 以 `prefix` 开头（但不等于它）的词的个数。
    fn prefix_count(&self, prefix: &str) -> usize {
        self.unigrams
            .range(prefix.to_string()..)
            .take_while(|(word, _)| word.starts_with(prefix))
            .filter(|(word, _)| word.as_str() != prefix)
            .count()
    }

    /// `1` 完全匹配（句首大写也算），`-n` 有 n 个以它为前缀的词，`0` 没找到。
    fn lookup(&self, token: &str) -> i32 {
        if self.count(token) > 0 || self.count(&token.to_lowercase()) > 0 {
            return 1;
        }
        let n = self.prefix_count(token);
        -i32::try_from(n).unwrap_or(i32::MAX)
    }

    fn learn(&mut self, tokens: &[String], allow_new_words: bool) {
        for (i, token) in tokens.iter().enumerate() {
            if token == SENTENCE_BEGIN || is_number(token) {
                continue;
            }
            if !allow_new_words && !self.unigrams.contains_key(token) {
                continue;
            }
            *self.unigrams.entry(token.clone()).or_insert(0) += 1;
            if let Some(prev) = i.checked_sub(1).map(|j| &tokens[j]) {
                *self
                    .bigrams
                    .entry((prev.clone(), token.clone()))
                    .or_insert(0) += 1;
            }
        }
    }
}

/// 内存语言模型集合。
///
/// TSV 词表格式：
///
/// - `word<TAB>count`
/// - count 可省略，默认 1
/// - 允许 `#` 开头注释行
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    models: BTreeMap<String, NgramModel>,
    tokenizer: WordTokenizer,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个空模型（已存在时保持不变）。
    pub fn with_model(mut self, name: impl Into<String>, class: ModelClass) -> Self {
        self.models
            .entry(name.into())
            .or_insert_with(|| NgramModel::new(class));
        self
    }

    /// 用词表创建一个只含系统模型 `name` 的引擎。
    pub fn from_tsv_str(name: &str, s: &str) -> Result<Self, ModelError> {
        let mut model = Self::new().with_model(name, ModelClass::System);
        model.load_tsv_str(name, s)?;
        Ok(model)
    }

    pub fn from_path(name: &str, path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let s = fs::read_to_string(path)?;
        Self::from_tsv_str(name, &s)
    }

    /// 把词表并入模型 `name`（不存在时按系统模型创建），返回载入的词条数。
    pub fn load_tsv_str(&mut self, name: &str, s: &str) -> Result<usize, ModelError> {
        let model = self
            .models
            .entry(name.to_string())
            .or_insert_with(|| NgramModel::new(ModelClass::System));

        let mut loaded = 0;
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut it = line.split('\t');
            let word = it.next().unwrap_or("").trim();
            if word.is_empty() {
                return Err(ModelError::Parse {
                    line: idx + 1,
                    reason: "缺少词".to_string(),
                });
            }
            let count = match it.next().map(str::trim).filter(|x| !x.is_empty()) {
                None => 1,
                Some(x) => x.parse::<u32>().map_err(|e| ModelError::Parse {
                    line: idx + 1,
                    reason: format!("词频 `{x}` 无效：{e}"),
                })?,
            };
            *model.unigrams.entry(word.to_string()).or_insert(0) += count;
            loaded += 1;
        }
        tracing::info!(model = name, words = loaded, "载入词表");
        Ok(loaded)
    }

    /// 模型 `name` 中 `word` 的词频（模型不存在时为 0）。
    pub fn count(&self, name: &str, word: &str) -> u32 {
        self.models.get(name).map_or(0, |m| m.count(word))
    }

    pub fn bigram_count(&self, name: &str, prev: &str, word: &str) -> u32 {
        self.models.get(name).map_or(0, |m| m.bigram(prev, word))
    }

    /// 所有模型合并后的词频表。
    pub fn vocabulary(&self) -> BTreeMap<String, u32> {
        let mut out: BTreeMap<String, u32> = BTreeMap::new();
        for model in self.models.values() {
            for (word, &count) in &model.unigrams {
                *out.entry(word.clone()).or_insert(0) += count;
            }
        }
        out
    }

    fn model(&self, method: &'static str, name: &str) -> Result<&NgramModel, ServiceError> {
        self.models.get(name).ok_or_else(|| unknown_model(method, name))
    }

    fn model_mut(
        &mut self,
        method: &'static str,
        name: &str,
    ) -> Result<&mut NgramModel, ServiceError> {
        self.models
            .get_mut(name)
            .ok_or_else(|| unknown_model(method, name))
    }
}

impl LanguageModelService for MemoryModel {
    fn predict(
        &mut self,
        models: &[String],
        context: &str,
        options: PredictOptions,
    ) -> Result<Vec<String>, ServiceError> {
        let tokens = self.tokenizer.tokenize_context(context);
        let partial = tokens.last().cloned().unwrap_or_default();
        let prev = tokens
            .len()
            .checked_sub(2)
            .map_or(SENTENCE_BEGIN, |i| tokens[i].as_str());
        let key = normalize(&partial, options.case_sensitive, options.accent_sensitive);

        // (bigram, unigram)
        let mut scores: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
        for name in models {
            let model = self.model("predict", name)?;
            for (word, &count) in &model.unigrams {
                if *word == partial
                    || !normalize(word, options.case_sensitive, options.accent_sensitive)
                        .starts_with(&key)
                {
                    continue;
                }
                let score = scores.entry(word.as_str()).or_default();
                score.0 += model.bigram(prev, word);
                score.1 += count;
            }
        }

        let mut ranked: Vec<(&str, (u32, u32))> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked
            .into_iter()
            .take(options.limit)
            .map(|(word, _)| word.to_string())
            .collect())
    }

    fn learn_text(
        &mut self,
        models: &[String],
        text: &str,
        allow_new_words: bool,
    ) -> Result<(), ServiceError> {
        let mut tokens = self.tokenizer.tokenize_context(text);
        if tokens.last().is_some_and(String::is_empty) {
            tokens.pop();
        }
        for name in models {
            let model = self.model_mut("learn_text", name)?;
            if model.class == ModelClass::System {
                return Err(ServiceError::Call {
                    method: "learn_text",
                    message: format!("模型 {name} 只读"),
                });
            }
            model.learn(&tokens, allow_new_words);
        }
        tracing::debug!(models = models.len(), tokens = tokens.len(), "学习文本");
        Ok(())
    }

    fn tokenize_text(&mut self, text: &str) -> Result<Tokenized, ServiceError> {
        Ok(self.tokenizer.tokenize_text(text))
    }

    fn tokenize_context(&mut self, text: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.tokenizer.tokenize_context(text))
    }

    fn lookup_text(
        &mut self,
        models: &[String],
        text: &str,
    ) -> Result<Vec<LookupEntry>, ServiceError> {
        let Tokenized { tokens, spans } = self.tokenizer.tokenize_text(text);
        let mut out = Vec::with_capacity(tokens.len());
        for (token, (begin, end)) in tokens.into_iter().zip(spans) {
            if is_number(&token) {
                out.push(LookupEntry {
                    begin,
                    end,
                    token: NUMBER_TOKEN.to_string(),
                    counts: vec![0; models.len()],
                });
                continue;
            }
            let counts = models
                .iter()
                .map(|name| self.model("lookup_text", name).map(|m| m.lookup(&token)))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(LookupEntry {
                begin,
                end,
                token,
                counts,
            });
        }
        Ok(out)
    }

    fn model_names(&mut self, class: ModelClass) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .models
            .iter()
            .filter(|(_, model)| model.class == class)
            .map(|(name, _)| name.clone())
            .collect())
    }
}

fn unknown_model(method: &'static str, name: &str) -> ServiceError {
    ServiceError::Call {
        method,
        message: format!("未知模型 {name}"),
    }
}

/// 纯数字（可带小数点/千分位）。
fn is_number(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}
