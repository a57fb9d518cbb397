use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum QuizError {
    /// 题库内容错误
    #[error("题库格式错误: {0}")]
    Bank(#[from] BankError),
    /// 会话参数或状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 题库解析错误（MalformedBank）
///
/// `block` 为从 1 开始的题目块编号，`line` 为从 1 开始的行号
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// 没有任何可识别的题目块
    #[error("题库中没有任何题目")]
    Empty,
    /// 题目块没有以 @E 结束
    #[error("第 {block} 个题目块未闭合 (第 {line} 行)")]
    UnclosedBlock { block: usize, line: usize },
    /// 在题目块之外出现了 @A / @E
    #[error("第 {line} 行出现了多余的标记 {marker}")]
    UnexpectedMarker { marker: String, line: usize },
    /// 题干为空
    #[error("第 {block} 个题目块缺少题干 (第 {line} 行)")]
    MissingText { block: usize, line: usize },
    /// 选项不足两个
    #[error("第 {block} 个题目块只有 {count} 个选项，至少需要 2 个 (第 {line} 行)")]
    TooFewAnswers {
        block: usize,
        line: usize,
        count: usize,
    },
    /// 没有正确答案序号
    #[error("第 {block} 个题目块缺少正确答案序号 (第 {line} 行)")]
    MissingCorrectIndex { block: usize, line: usize },
    /// 正确答案序号超出选项范围（序号从 1 开始）
    #[error("第 {block} 个题目块的正确答案序号 {index} 超出范围 [1, {answers}] (第 {line} 行)")]
    CorrectIndexOutOfRange {
        block: usize,
        line: usize,
        index: i64,
        answers: usize,
    },
}

/// 会话错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 题目数量或时长不是正数
    #[error("无效的会话参数: 题目数量 {question_count}, 时长 {duration_secs} 秒 (都必须 >= 1)")]
    InvalidParameters {
        question_count: i64,
        duration_secs: i64,
    },
    /// 会话已经开始过，不能复用
    #[error("会话已经开始过，请创建新的会话")]
    AlreadyStarted,
    /// 计时器需要 tokio 运行时
    #[error("必须在 tokio 运行时内开始会话")]
    NoRuntime,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl FileError {
    /// 根据 io::Error 的种类区分"不存在"与"读取失败"
    pub fn from_read(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            FileError::NotFound { path }
        } else {
            FileError::ReadFailed { path, source }
        }
    }
}

impl QuizError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        QuizError::File(FileError::from_read(path, source))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, QuizError>;
