//! `wp_model`：进程内的语言模型引擎与基于词表的拼写检查。
//!
//! - `MemoryModel`：实现 `LanguageModelService`，从 TSV 词表载入
//! - `LocalConnector`：实现 `Connector`，可以切到“离线”模拟引擎不可用
//! - `VocabularySpellChecker`：实现 `SpellChecker`
pub mod connector;
pub mod error;
pub mod fold;
pub mod memory;
pub mod spell;

pub use connector::{LocalConnector, SharedModel};
pub use error::ModelError;
pub use memory::MemoryModel;
pub use spell::VocabularySpellChecker;
