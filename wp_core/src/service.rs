use crate::{error::ServiceError, tokenizer::Tokenized};

/// 模型类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelClass {
    /// 只读的系统模型
    System,
    /// 用户模型（自动学习写入的模型在其中）
    User,
}

/// 预测请求选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictOptions {
    pub case_sensitive: bool,
    pub accent_sensitive: bool,
    /// 返回候选数量上限
    pub limit: usize,
}

/// `lookup_text` 的单个 token 结果。
///
/// `counts` 每个模型一项：`1` 完全匹配，`-n` 有 n 个以它为前缀的词，`0` 没找到。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    pub begin: usize,
    pub end: usize,
    pub token: String,
    pub counts: Vec<i32>,
}

/// 进程外语言模型引擎的请求/响应约定。
///
/// 约定：
/// - 除 `learn_text` 外的调用都没有副作用，可以随意重试
/// - 连接类失败返回 `ServiceError::Connect/Disconnected`，其余失败返回 `Call`
pub trait LanguageModelService {
    /// 为 `context` 末尾正在输入的词给出排好序的补全候选。
    fn predict(
        &mut self,
        models: &[String],
        context: &str,
        options: PredictOptions,
    ) -> Result<Vec<String>, ServiceError>;

    /// 把一行文本学进 `models`；`allow_new_words` 为 false 时只更新已有词。
    fn learn_text(
        &mut self,
        models: &[String],
        text: &str,
        allow_new_words: bool,
    ) -> Result<(), ServiceError>;

    fn tokenize_text(&mut self, text: &str) -> Result<Tokenized, ServiceError>;

    fn tokenize_context(&mut self, text: &str) -> Result<Vec<String>, ServiceError>;

    fn lookup_text(
        &mut self,
        models: &[String],
        text: &str,
    ) -> Result<Vec<LookupEntry>, ServiceError>;

    fn model_names(&mut self, class: ModelClass) -> Result<Vec<String>, ServiceError>;
}

/// 连接获取：每次调用返回一个新的连接（服务可能尚未启动或已经崩溃）。
pub trait Connector {
    type Connection: LanguageModelService;

    fn connect(&mut self) -> Result<Self::Connection, ServiceError>;
}
