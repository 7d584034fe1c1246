//! `wp_core`：单词预测的纯逻辑层，不做任何 I/O。
//!
//! 设计目标：
//! - **核心可复用**：CLI/键盘 UI 都能复用同一套逻辑
//! - **分层清晰**：文本上下文 -> `TextChanges` -> 学习策略/调度 -> 预测服务门面 -> 输出（`Choices` + `KeyAction`）
//! - **外部协作者都是 trait**：语言模型服务、分词器、拼写检查器、时间源、按键注入端
pub mod changes;
pub mod clock;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod key_event;
pub mod learn_strategy;
pub mod lru;
pub mod model;
pub mod predictor;
pub mod punctuator;
pub mod service;
pub mod span;
pub mod spell;
pub mod tokenizer;
