use std::io;

/// 词表加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("读取词表失败：{0}")]
    Io(#[from] io::Error),
    #[error("词表第 {line} 行格式错误：{reason}")]
    Parse { line: usize, reason: String },
}
