//! 错误类型。
//!
//! 说明：
//! - 核心算法都是全函数（失败时返回空结果），只有与外部打交道的地方才有错误
//! - `ServiceError` 永远不会越过 `WordPredictor` 的边界，到协调器时已经变成空结果

/// 预测服务（进程外语言模型）调用失败。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// 获取连接失败（服务未启动等）
    #[error("无法连接预测服务：{0}")]
    Connect(String),

    /// 已缓存的连接失效（服务崩溃/重启）
    #[error("预测服务连接已断开：{0}")]
    Disconnected(String),

    /// 服务端执行出错（连接本身正常）
    #[error("预测服务调用 `{method}` 失败：{message}")]
    Call {
        method: &'static str,
        message: String,
    },
}

impl ServiceError {
    /// 是否属于连接类故障（只有这类故障才值得丢弃连接并重试）。
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Disconnected(_))
    }
}

/// 配置解析/校验失败。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置解析失败：{0}")]
    Parse(#[from] toml::de::Error),

    #[error("配置项 `{field}` 非法：{reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
