//! 翻译模块
//!
//! 提供文档翻译的完整能力，采用清晰的模块化架构：
//! - **tokenizer**: Token编解码和中文分词
//! - **segmenter**: 长文本分段，带上下文携带
//! - **backend**: 翻译后端（HTTP和离线模拟）
//! - **gateway**: 统一翻译入口（缓存、分块、重试）
//! - **pipeline**: HTML和Markdown文档管道
//! - **service**: 对外的翻译服务门面
//! - **storage**: 内存和磁盘缓存
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use transdoc::translation::TranslationService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = TranslationService::create_default("zh", None)?;
//! let translated = service.translate_markdown("# Hello\n\nSome text.").await?;
//! println!("{}", translated);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 翻译后端，封装与翻译API的传输细节
pub mod backend;

/// 配置管理模块
pub mod config;

/// 错误处理模块
pub mod error;

/// 翻译网关，缓存、分块和重试的统一入口
pub mod gateway;

/// 文档翻译管道
pub mod pipeline;

/// 长文本分段器
pub mod segmenter;

/// 翻译服务门面
pub mod service;

/// 缓存存储
pub mod storage;

/// Token编解码
pub mod tokenizer;

// ============================================================================
// 核心API导出
// ============================================================================

pub use backend::{BackendRequest, HttpBackend, MockBackend, TranslationBackend};
pub use config::{constants, ConfigManager, TranslationConfig};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use gateway::TranslationGateway;
pub use pipeline::{HtmlPipeline, MarkdownPipeline};
pub use segmenter::{Segment, Segmenter, SegmenterConfig};
pub use service::{ServiceStats, ServiceStatsSnapshot, TranslationService};
pub use storage::{CacheStats, DiskCache, MemoryCache};
pub use tokenizer::{ChineseWordSplitter, TiktokenCodec, TokenCodec};

// ============================================================================
// 便利函数
// ============================================================================

/// 检查翻译配置文件是否存在
pub fn config_file_exists() -> bool {
    config::config_file_exists()
}

/// 加载翻译配置
///
/// 按配置文件、环境变量的顺序加载，找不到时使用提供的参数
/// 构造默认配置。
pub fn load_translation_config(target_lang: &str, api_url: Option<&str>) -> TranslationConfig {
    config::load_translation_config(target_lang, api_url)
}
