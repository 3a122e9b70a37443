//! Markdown翻译管道
//!
//! 在pulldown-cmark事件流上改写文本事件。围栏和缩进代码块内的
//! 文本、行内代码、内嵌HTML都不翻译，链接目标和图片地址天然
//! 不在文本事件里，结构由渲染器负责还原。

use std::sync::Arc;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::parsers::markdown::{parse_markdown, render_markdown};
use crate::translation::error::TranslationResult;
use crate::translation::gateway::TranslationGateway;
use crate::translation::pipeline::translate_fragment;
use crate::translation::segmenter::Segmenter;

/// Markdown文档翻译管道
pub struct MarkdownPipeline {
    gateway: Arc<TranslationGateway>,
    segmenter: Arc<Segmenter>,
}

impl MarkdownPipeline {
    pub fn new(gateway: Arc<TranslationGateway>, segmenter: Arc<Segmenter>) -> Self {
        Self { gateway, segmenter }
    }

    /// 翻译整篇Markdown文档
    ///
    /// 没有可翻译文本时原样返回输入。
    pub async fn translate_document(
        &self,
        markdown: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let mut events = parse_markdown(markdown);
        let targets = translatable_indexes(&events);

        if targets.is_empty() {
            tracing::info!("Markdown中无需要翻译的文本");
            return Ok(markdown.to_string());
        }

        tracing::debug!("Markdown中共{}处可翻译文本", targets.len());

        for &index in &targets {
            let original = match &events[index] {
                Event::Text(text) => text.to_string(),
                _ => continue,
            };
            tracing::debug!("翻译Markdown文本: {:.50}...", original);

            match translate_fragment(
                &self.gateway,
                &self.segmenter,
                &original,
                source_lang,
                target_lang,
            )
            .await
            {
                Ok(translated) => {
                    events[index] = Event::Text(CowStr::from(translated));
                }
                Err(e) => {
                    tracing::error!("翻译失败，保留原文: {}", e);
                }
            }
        }

        let output = render_markdown(&events)?;
        tracing::info!("Markdown翻译完成，共处理{}处文本", targets.len());
        Ok(output)
    }
}

/// 找出事件流中可翻译文本事件的下标
///
/// 代码块用深度计数跟踪，块内的文本事件全部跳过。
fn translatable_indexes(events: &[Event<'_>]) -> Vec<usize> {
    let mut code_depth = 0usize;
    let mut targets = Vec::new();

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
            Event::Text(text) => {
                if code_depth == 0 && !text.trim().is_empty() {
                    targets.push(index);
                }
            }
            _ => {}
        }
    }

    targets
}
