//! Markdown解析和渲染
//!
//! 基于pulldown-cmark的事件流模型。文档解析为事件序列，翻译层
//! 只改写其中的文本事件，再由pulldown-cmark-to-cmark渲染回
//! Markdown，代码块、链接目标和内嵌HTML原样保留。

use pulldown_cmark::{Event, Options, Parser};
use pulldown_cmark_to_cmark::cmark;

use crate::translation::error::{TranslationError, TranslationResult};

/// 解析选项，启用常见的GFM扩展以保证表格等结构不被当作普通文本
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// 将Markdown文本解析为事件序列
pub fn parse_markdown(text: &str) -> Vec<Event<'_>> {
    Parser::new_ext(text, markdown_options()).collect()
}

/// 将事件序列渲染回Markdown文本
pub fn render_markdown(events: &[Event<'_>]) -> TranslationResult<String> {
    let mut output = String::new();
    cmark(events.iter(), &mut output)
        .map_err(|e| TranslationError::ParseError(format!("渲染Markdown失败: {}", e)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_preserves_code_block() {
        let source = "# Title\n\n```rust\nfn main() {}\n```\n";
        let events = parse_markdown(source);
        let output = render_markdown(&events).unwrap();

        assert!(output.contains("# Title"));
        assert!(output.contains("fn main() {}"));
        assert!(output.contains("```"));
    }

    #[test]
    fn test_table_parsed_as_structure() {
        let source = "| a | b |\n| - | - |\n| 1 | 2 |\n";
        let events = parse_markdown(source);

        let has_table = events
            .iter()
            .any(|e| matches!(e, Event::Start(pulldown_cmark::Tag::Table(_))));
        assert!(has_table);
    }

    #[test]
    fn test_inline_html_kept_as_event() {
        let source = "before <span class=\"x\">kept</span> after\n";
        let events = parse_markdown(source);

        let has_html = events
            .iter()
            .any(|e| matches!(e, Event::InlineHtml(_) | Event::Html(_)));
        assert!(has_html);
    }
}
