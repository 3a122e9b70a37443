use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::translation::error::{TranslationError, TranslationResult};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap()
}

/// 将DOM序列化为HTML文本
pub fn serialize_dom(dom: &RcDom) -> TranslationResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();

    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| TranslationError::ParseError(format!("序列化DOM失败: {}", e)))?;

    String::from_utf8(buf)
        .map_err(|e| TranslationError::ParseError(format!("序列化结果不是合法UTF-8: {}", e)))
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 查找文档的body节点
///
/// html5ever解析时总会补全html和body骨架，正常文档都能找到。
pub fn find_body(dom: &RcDom) -> Option<Handle> {
    let html = get_child_node_by_name(&dom.document, "html")?;
    get_child_node_by_name(&html, "body")
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 设置节点属性值，属性不存在时追加
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: &str) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::LocalName;

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();

        for attr in attrs_mut.iter_mut() {
            if &*attr.name.local == attr_name {
                attr.value.clear();
                attr.value.push_slice(attr_value);
                return;
            }
        }

        attrs_mut.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(attr_name)),
            value: format_tendril!("{}", attr_value),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_keeps_structure() {
        let html = b"<html><head></head><body><p>hello</p></body></html>";
        let dom = html_to_dom(html, "utf-8");
        let output = serialize_dom(&dom).unwrap();
        assert!(output.contains("<p>hello</p>"));
    }

    #[test]
    fn test_find_body_on_fragment() {
        let dom = html_to_dom(b"<p>fragment</p>", "utf-8");
        let body = find_body(&dom);
        assert!(body.is_some());
    }

    #[test]
    fn test_attr_roundtrip() {
        let dom = html_to_dom(b"<img src=\"a.png\" alt=\"old\">", "utf-8");
        let body = find_body(&dom).unwrap();
        let img = get_child_node_by_name(&body, "img").unwrap();

        assert_eq!(get_node_attr(&img, "alt"), Some("old".to_string()));
        set_node_attr(&img, "alt", "new");
        assert_eq!(get_node_attr(&img, "alt"), Some("new".to_string()));

        // src不受影响
        assert_eq!(get_node_attr(&img, "src"), Some("a.png".to_string()));
    }

    #[test]
    fn test_set_attr_appends_when_missing() {
        let dom = html_to_dom(b"<img src=\"a.png\">", "utf-8");
        let body = find_body(&dom).unwrap();
        let img = get_child_node_by_name(&body, "img").unwrap();

        set_node_attr(&img, "title", "added");
        assert_eq!(get_node_attr(&img, "title"), Some("added".to_string()));
    }

    #[test]
    fn test_gbk_decoding() {
        // "中文" 的GBK编码
        let gbk_bytes: &[u8] = &[0xd6, 0xd0, 0xce, 0xc4];
        let mut html = b"<p>".to_vec();
        html.extend_from_slice(gbk_bytes);
        html.extend_from_slice(b"</p>");

        let dom = html_to_dom(&html, "gbk");
        let output = serialize_dom(&dom).unwrap();
        assert!(output.contains("中文"));
    }
}
