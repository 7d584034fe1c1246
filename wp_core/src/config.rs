//! `PredictionConfig`：协调器在构造时拿到的只读配置。
//!
//! 可以直接 `Default` 使用，也可以从 TOML 读入（缺省字段取默认值）：
//!
//! ```toml
//! auto_learn = true
//! learn_delay_secs = 60
//! user_models = ["lm:user:en"]
//! ```
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 预测/学习/标点辅助的全部开关与常量。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionConfig {
    /// 是否自动学习用户输入
    pub auto_learn: bool,
    /// 是否启用标点辅助（自动补/删分隔符、句首大写）
    pub auto_punctuation: bool,
    /// 预测时忽略重音符号
    pub accent_insensitive: bool,
    /// span 最后一次修改后多久才学习（秒）
    pub learn_delay_secs: u64,
    /// 轮询过期 span 的间隔（秒）
    pub poll_interval_secs: u64,
    /// “正在输入”判定的时间窗口（毫秒）
    pub typing_window_ms: u64,
    /// 预测候选数量上限
    pub max_choices: usize,
    /// 发给语言模型的上下文最多取末尾多少个字符
    pub max_context_chars: usize,
    pub system_models: Vec<String>,
    pub user_models: Vec<String>,
    /// 自动学习写入的模型（必须是 `user_models` 的子集）
    pub auto_learn_models: Vec<String>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            auto_learn: true,
            auto_punctuation: true,
            accent_insensitive: false,
            learn_delay_secs: 60,
            poll_interval_secs: 2,
            typing_window_ms: 1000,
            max_choices: 10,
            max_context_chars: 1024,
            system_models: vec!["lm:system:en".to_string()],
            user_models: vec!["lm:user:en".to_string()],
            auto_learn_models: vec!["lm:user:en".to_string()],
        }
    }
}

impl PredictionConfig {
    /// 解析 TOML 并校验。
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.max_choices == 0 {
            return Err(ConfigError::Invalid {
                field: "max_choices",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.max_context_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "max_context_chars",
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn learn_delay(&self) -> Duration {
        Duration::from_secs(self.learn_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn typing_window(&self) -> Duration {
        Duration::from_millis(self.typing_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        let config = PredictionConfig::from_toml_str("").unwrap();
        assert_eq!(config, PredictionConfig::default());
        assert_eq!(config.learn_delay(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn partial_toml_overrides() {
        let config = PredictionConfig::from_toml_str(
            "auto_punctuation = false\nlearn_delay_secs = 5\nuser_models = [\"lm:user:de\"]\n",
        )
        .unwrap();
        assert!(!config.auto_punctuation);
        assert_eq!(config.learn_delay_secs, 5);
        assert_eq!(config.user_models, vec!["lm:user:de".to_string()]);
        assert!(config.auto_learn);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err = PredictionConfig::from_toml_str("poll_interval_secs = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "poll_interval_secs",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_field() {
        let err = PredictionConfig::from_toml_str("learn_dely_secs = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
