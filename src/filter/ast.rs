//! Typed views over pandoc's JSON document tree.
//!
//! pandoc serialises every element as `{"t": <tag>, "c": <content>}`, where
//! the content is a positional array whose layout depends on the tag. Only
//! the handful of elements the rules touch get a typed view; everything else
//! stays as raw [`serde_json::Value`] and passes through untouched.
//!
//! | Tag         | Content layout                  |
//! |-------------|---------------------------------|
//! | `CodeBlock` | `[Attr, Text]`                  |
//! | `Header`    | `[Int, Attr, [Inline]]`         |
//! | `Link`      | `[Attr, [Inline], Target]`      |
//! | `Image`     | `[Attr, [Inline], Target]`      |
//! | `Div`       | `[Attr, [Block]]`               |

use crate::error::FilterError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Element attributes: identifier, classes, key-value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr(pub String, pub Vec<String>, pub Vec<(String, String)>);

impl Attr {
    pub fn identifier(&self) -> &str {
        &self.0
    }

    pub fn classes(&self) -> &[String] {
        &self.1
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.1.iter().any(|c| c == class)
    }
}

/// Link or image target: URL and title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target(pub String, pub String);

pub type CodeBlock = (Attr, String);
pub type Header = (i64, Attr, Vec<Value>);
pub type Link = (Attr, Vec<Value>, Target);
pub type Image = (Attr, Vec<Value>, Target);
pub type Div = (Attr, Vec<Value>);

/// The tag of a tree node, or `None` if `value` is not a node.
pub fn node_tag(value: &Value) -> Option<&str> {
    value.as_object()?.get("t")?.as_str()
}

/// Deserialize a node's content into the typed view for its tag.
pub fn content<T: DeserializeOwned>(node: &Value) -> Result<T, FilterError> {
    let tag = node_tag(node).unwrap_or("<untagged>");
    let c = node.get("c").ok_or_else(|| FilterError::MalformedNode {
        tag: tag.to_string(),
        detail: "missing content field `c`".into(),
    })?;
    T::deserialize(c).map_err(|e| FilterError::MalformedNode {
        tag: tag.to_string(),
        detail: e.to_string(),
    })
}

/// Write a typed view back into the node's content.
pub fn set_content<T: Serialize>(node: &mut Value, content: &T) -> Result<(), FilterError> {
    let value = serde_json::to_value(content)?;
    match node.as_object_mut() {
        Some(obj) => {
            obj.insert("c".to_string(), value);
            Ok(())
        }
        None => Err(FilterError::MalformedNode {
            tag: "<untagged>".into(),
            detail: "node is not an object".into(),
        }),
    }
}
