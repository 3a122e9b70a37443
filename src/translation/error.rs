//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 文档解析错误
    #[error("文档解析错误: {0}")]
    ParseError(String),

    /// 不支持的语言代码
    #[error("不支持的语言代码: {0}")]
    InvalidLanguage(String),

    /// 翻译后端错误（网络、超时、服务端故障）
    #[error("翻译后端错误: {0}")]
    BackendError(String),

    /// 不支持的文件类型
    #[error("不支持的文件类型: {0}")]
    UnsupportedFileType(String),

    /// 字符编码错误
    #[error("编码错误: {0}")]
    EncodingError(String),

    /// 缓存错误
    #[error("缓存错误: {0}")]
    CacheError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 文件系统错误
    #[error("IO错误: {0}")]
    IoError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    ///
    /// 只有后端传输错误（网络中断、超时、5xx/429）值得重试；
    /// 语言代码、解析、编码类错误重试多少次结果都一样。
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::BackendError(_) => true,
            TranslationError::ConfigError(_) => false,
            TranslationError::ParseError(_) => false,
            TranslationError::InvalidLanguage(_) => false,
            TranslationError::UnsupportedFileType(_) => false,
            TranslationError::EncodingError(_) => false,
            TranslationError::CacheError(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::IoError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::InvalidLanguage(_) => ErrorSeverity::Info,
            TranslationError::BackendError(_) => ErrorSeverity::Warning,
            TranslationError::UnsupportedFileType(_) => ErrorSeverity::Info,
            TranslationError::EncodingError(_) => ErrorSeverity::Error,
            TranslationError::CacheError(_) => ErrorSeverity::Warning,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::IoError(_) => ErrorSeverity::Error,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::InvalidLanguage(_) => ErrorCategory::Input,
            TranslationError::BackendError(_) => ErrorCategory::Network,
            TranslationError::UnsupportedFileType(_) => ErrorCategory::Input,
            TranslationError::EncodingError(_) => ErrorCategory::Encoding,
            TranslationError::CacheError(_) => ErrorCategory::Cache,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::IoError(_) => ErrorCategory::FileSystem,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Parsing,
    Input,
    Network,
    Encoding,
    Cache,
    Serialization,
    FileSystem,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(format!("{}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::BackendError(format!("请求超时: {}", error))
        } else {
            TranslationError::BackendError(format!("网络错误: {}", error))
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
