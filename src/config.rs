use crate::error::{AppResult, ConfigError, QuizError};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置文件
///
/// 加载顺序：默认值 → `QUIZ_CONFIG_FILE` 指向的 TOML 文件 → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 题库文件路径（命令行参数优先）
    pub bank_file: Option<String>,
    /// 默认题目数量
    pub question_count: i64,
    /// 默认答题时长（秒）
    pub duration_secs: i64,
    /// 结果日志文件
    pub result_log_file: String,
    /// 计时器轮询间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 固定的洗牌种子，仅用于复现
    pub shuffle_seed: Option<u64>,
    /// 宽松解析：遇到未闭合的题目块时丢弃而不是报错
    pub lenient_parsing: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_file: None,
            question_count: 10,
            duration_secs: 60,
            result_log_file: "quiz_results.log".to_string(),
            tick_interval_ms: 100,
            shuffle_seed: None,
            lenient_parsing: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按 默认值 → TOML → 环境变量 的顺序加载配置
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("QUIZ_CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| QuizError::file_read_failed(path, e))?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            QuizError::Config(ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            })
        })
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            bank_file: std::env::var("QUIZ_BANK_FILE").ok().or(self.bank_file),
            question_count: env_or("QUIZ_QUESTION_COUNT", "integer", self.question_count)?,
            duration_secs: env_or("QUIZ_DURATION_SECS", "integer", self.duration_secs)?,
            result_log_file: std::env::var("QUIZ_RESULT_LOG").unwrap_or(self.result_log_file),
            tick_interval_ms: env_or("QUIZ_TICK_MS", "u64", self.tick_interval_ms)?,
            shuffle_seed: match std::env::var("QUIZ_SHUFFLE_SEED") {
                Ok(value) => Some(parse_var("QUIZ_SHUFFLE_SEED", "u64", value)?),
                Err(_) => self.shuffle_seed,
            },
            lenient_parsing: env_or("QUIZ_LENIENT_PARSING", "bool", self.lenient_parsing)?,
            verbose_logging: env_or("VERBOSE_LOGGING", "bool", self.verbose_logging)?,
        })
    }

    /// 计时器轮询间隔，最小 1 毫秒
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn env_or<T: FromStr>(var_name: &str, expected_type: &str, default: T) -> AppResult<T> {
    match std::env::var(var_name) {
        Ok(value) => parse_var(var_name, expected_type, value),
        Err(_) => Ok(default),
    }
}

fn parse_var<T: FromStr>(var_name: &str, expected_type: &str, value: String) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        QuizError::Config(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_partial_fields_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            "question_count = 5\nresult_log_file = \"out.log\"\n",
            "quiz.toml",
        )
        .unwrap();

        assert_eq!(config.question_count, 5);
        assert_eq!(config.result_log_file, "out.log");
        assert_eq!(config.duration_secs, 60);
        assert_eq!(config.tick_interval_ms, 100);
        assert!(config.shuffle_seed.is_none());
    }

    #[test]
    fn test_toml_type_error_is_config_error() {
        let err = Config::from_toml_str("question_count = \"many\"\n", "quiz.toml").unwrap_err();
        assert!(matches!(
            err,
            QuizError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }

    #[test]
    fn test_parse_var_reports_variable_name() {
        let err = parse_var::<u64>("QUIZ_TICK_MS", "u64", "fast".to_string()).unwrap_err();
        match err {
            QuizError::Config(ConfigError::EnvVarParseFailed {
                var_name, value, ..
            }) => {
                assert_eq!(var_name, "QUIZ_TICK_MS");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tick_interval_never_zero() {
        let config = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
