//! 翻译管道模块
//!
//! 文档级翻译流程：解析文档、提取可翻译片段、逐段翻译、写回
//! 原位置、序列化输出。HTML和Markdown各有一条管道，共享同一个
//! 片段翻译入口。
//!
//! 单个片段翻译失败只记录日志并保留原文，不中断整篇文档。

pub mod html;
pub mod markdown;

pub use html::HtmlPipeline;
pub use markdown::MarkdownPipeline;

use crate::translation::error::TranslationResult;
use crate::translation::gateway::TranslationGateway;
use crate::translation::segmenter::Segmenter;

/// 翻译单个文本片段
///
/// 超出分段预算的片段先切分，各分段顺序翻译后按原顺序无缝拼接，
/// 保证译文覆盖且只覆盖原片段。
pub(crate) async fn translate_fragment(
    gateway: &TranslationGateway,
    segmenter: &Segmenter,
    text: &str,
    source_lang: Option<&str>,
    target_lang: &str,
) -> TranslationResult<String> {
    if !segmenter.exceeds_budget(text) {
        return gateway.translate(text, source_lang, target_lang).await;
    }

    let segments = segmenter.segment(text, source_lang)?;
    tracing::debug!("片段超出分段预算，切分为{}段", segments.len());

    let mut result = String::with_capacity(text.len());
    for segment in &segments {
        let translated = gateway
            .translate_segment(segment, source_lang, target_lang)
            .await?;
        result.push_str(&translated);
    }

    Ok(result)
}
