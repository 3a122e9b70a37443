//! HTML翻译管道
//!
//! 在DOM上提取可翻译片段并原位写回译文。遍历从body开始，
//! script、style、code、pre子树整体跳过，可翻译属性在元素的
//! 子节点之前收集。

use std::sync::Arc;

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{find_body, get_node_attr, html_to_dom, serialize_dom, set_node_attr};
use crate::translation::config::constants::{SKIP_ELEMENTS, TRANSLATABLE_ATTRS};
use crate::translation::error::TranslationResult;
use crate::translation::gateway::TranslationGateway;
use crate::translation::pipeline::translate_fragment;
use crate::translation::segmenter::Segmenter;

/// DOM中一处可翻译的文本
enum HtmlFragment {
    /// 文本节点内容
    Content { node: Handle, text: String },
    /// 元素属性值
    Attribute {
        node: Handle,
        name: &'static str,
        value: String,
    },
}

impl HtmlFragment {
    fn text(&self) -> &str {
        match self {
            HtmlFragment::Content { text, .. } => text,
            HtmlFragment::Attribute { value, .. } => value,
        }
    }

    /// 将译文写回DOM原位置
    fn apply(&self, translated: &str) {
        match self {
            HtmlFragment::Content { node, .. } => {
                if let NodeData::Text { contents } = &node.data {
                    let mut contents = contents.borrow_mut();
                    contents.clear();
                    contents.push_slice(translated);
                }
            }
            HtmlFragment::Attribute { node, name, .. } => {
                set_node_attr(node, name, translated);
            }
        }
    }
}

/// HTML文档翻译管道
pub struct HtmlPipeline {
    gateway: Arc<TranslationGateway>,
    segmenter: Arc<Segmenter>,
}

impl HtmlPipeline {
    pub fn new(gateway: Arc<TranslationGateway>, segmenter: Arc<Segmenter>) -> Self {
        Self { gateway, segmenter }
    }

    /// 翻译整篇HTML文档，返回序列化后的HTML
    ///
    /// 没有可翻译文本时原样返回输入。
    pub async fn translate_document(
        &self,
        html: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let dom = html_to_dom(html.as_bytes(), "utf-8");
        let root = find_body(&dom).unwrap_or_else(|| dom.document.clone());

        let mut fragments = Vec::new();
        collect_fragments(&root, &mut fragments);

        if fragments.is_empty() {
            tracing::info!("HTML中无需要翻译的文本");
            return Ok(html.to_string());
        }

        tracing::debug!("HTML中共{}处可翻译文本", fragments.len());

        for fragment in &fragments {
            let original = fragment.text().trim().to_string();
            tracing::debug!("正在翻译文本: {:.50}...", original);

            match translate_fragment(
                &self.gateway,
                &self.segmenter,
                &original,
                source_lang,
                target_lang,
            )
            .await
            {
                Ok(translated) => fragment.apply(&translated),
                Err(e) => {
                    tracing::error!("翻译失败，保留原文: {}", e);
                }
            }
        }

        let output = serialize_dom(&dom)?;
        tracing::info!("HTML翻译完成，共处理{}处文本", fragments.len());
        Ok(output)
    }
}

/// 收集节点子树中的可翻译片段
///
/// 跳过元素连同属性和整个子树一起跳过。属性按固定顺序排在
/// 该元素的子节点之前，保证译文写回顺序稳定。
fn collect_fragments(node: &Handle, fragments: &mut Vec<HtmlFragment>) {
    match &node.data {
        NodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            if SKIP_ELEMENTS.contains(&tag) {
                return;
            }

            for &attr_name in TRANSLATABLE_ATTRS {
                if let Some(value) = get_node_attr(node, attr_name) {
                    if !value.trim().is_empty() {
                        fragments.push(HtmlFragment::Attribute {
                            node: node.clone(),
                            name: attr_name,
                            value,
                        });
                    }
                }
            }

            for child in node.children.borrow().iter() {
                collect_fragments(child, fragments);
            }
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                fragments.push(HtmlFragment::Content {
                    node: node.clone(),
                    text,
                });
            }
        }
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                collect_fragments(child, fragments);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment_texts(html: &str) -> Vec<String> {
        let dom = html_to_dom(html.as_bytes(), "utf-8");
        let root = find_body(&dom).unwrap_or_else(|| dom.document.clone());
        let mut fragments = Vec::new();
        collect_fragments(&root, &mut fragments);
        fragments
            .iter()
            .map(|f| f.text().trim().to_string())
            .collect()
    }

    #[test]
    fn test_collects_text_nodes() {
        let texts = fragment_texts("<p>Hello</p><p>World</p>");
        assert_eq!(texts, vec!["Hello", "World"]);
    }

    #[test]
    fn test_skips_script_style_code_pre() {
        let texts = fragment_texts(
            "<p>keep</p><script>var x = 1;</script><style>.a{}</style>\
             <code>let y;</code><pre>  raw  </pre>",
        );
        assert_eq!(texts, vec!["keep"]);
    }

    #[test]
    fn test_skip_subtree_includes_attrs_and_children() {
        let texts = fragment_texts(
            "<pre title=\"tooltip\"><span alt=\"inner\">nested</span></pre><p>after</p>",
        );
        assert_eq!(texts, vec!["after"]);
    }

    #[test]
    fn test_attrs_collected_in_order_before_children() {
        let texts = fragment_texts(
            "<div aria-label=\"label\" title=\"tip\" alt=\"desc\">child text</div>",
        );
        // alt、title、aria-label按固定顺序，再到子节点文本
        assert_eq!(texts, vec!["desc", "tip", "label", "child text"]);
    }

    #[test]
    fn test_whitespace_only_text_ignored() {
        let texts = fragment_texts("<p>   </p><p>\n\t</p><p>real</p>");
        assert_eq!(texts, vec!["real"]);
    }

    #[test]
    fn test_empty_attr_ignored() {
        let texts = fragment_texts("<img alt=\"\" title=\"  \">");
        assert!(texts.is_empty());
    }
}
