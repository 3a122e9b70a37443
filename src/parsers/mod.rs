//! # 解析器模块
//!
//! 这个模块包含文档格式的解析与序列化能力：
//!
//! - HTML解析、DOM操作和序列化
//! - Markdown事件流解析和渲染
//!
//! 解析器只负责结构的读与写，哪些内容需要翻译由
//! `translation::pipeline` 决定。

pub mod html;
pub mod markdown;

// Re-export commonly used items for convenience
pub use html::{
    find_body, get_child_node_by_name, get_node_attr, get_node_name, html_to_dom, serialize_dom,
    set_node_attr,
};
pub use markdown::{markdown_options, parse_markdown, render_markdown};
