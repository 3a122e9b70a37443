//! HTML解析和处理模块
//!
//! - `dom`: 解析、序列化和基础DOM操作

pub mod dom;

pub use dom::{
    find_body, get_child_node_by_name, get_node_attr, get_node_name, html_to_dom, serialize_dom,
    set_node_attr,
};
