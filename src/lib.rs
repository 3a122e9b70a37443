//! # Transdoc Library
//!
//! 批量翻译HTML和Markdown文档的工具库。翻译只触碰文档中的
//! 自然语言文本，标签结构、代码块、链接目标等都原样保留。
//!
//! ## 模块组织
//!
//! - `parsers` - 文档解析器（HTML DOM、Markdown事件流）
//! - `translation` - 翻译核心（分段、网关、管道、缓存）
//! - `batch` - 批量翻译编排（扫描、并发调度、输出）

pub mod batch;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use batch::{BatchOptions, BatchStats, BatchTranslator};
pub use translation::{
    TranslationConfig, TranslationError, TranslationResult, TranslationService,
};
