//! Document-order traversal driving the rewrite rules.
//!
//! Mirrors pandoc's reference filter drivers: every node found inside an
//! array is handed to the action; a kept node is then descended into, while
//! the nodes of a replacement are descended into *without* being handed to
//! the action themselves.

use super::ast::node_tag;
use super::Action;
use crate::error::FilterError;
use serde_json::{Map, Value};

/// Walk `value`, applying `action` to every node, and return the rebuilt tree.
pub fn walk<F>(value: Value, action: &mut F) -> Result<Value, FilterError>
where
    F: FnMut(&mut Value) -> Result<Action, FilterError>,
{
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for mut item in items {
                if node_tag(&item).is_none() {
                    out.push(walk(item, action)?);
                    continue;
                }
                match action(&mut item)? {
                    Action::Keep => out.push(walk(item, action)?),
                    Action::Replace(nodes) => {
                        for node in nodes {
                            out.push(walk(node, action)?);
                        }
                    }
                }
            }
            Ok(Value::Array(out))
        }
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                out.insert(key, walk(field, action)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other),
    }
}
