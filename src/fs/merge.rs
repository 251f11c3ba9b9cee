//! Metadata merge: applying fresher records onto an existing node.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DriveError, Result};
use crate::fs::node::Node;

impl Node {
    /// Merge a metadata record into this node in place.
    ///
    /// `record` may be a [`NewNode`](crate::fs::NewNode), a full [`Node`] or
    /// any record using the drive's JSON keys. Every field the record
    /// carries overwrites the node's value; fields it omits are kept, and
    /// `children`, the root flag and the client are never touched. Keys are
    /// matched against the node's own field names without regard to ASCII
    /// case, so a record's `parents` lands on `Parents` and `Name` on
    /// `name`. A `null` clears list fields and leaves every other field as
    /// it was.
    ///
    /// On error the node is left exactly as it was.
    pub fn update<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<()> {
        let incoming = serde_json::to_value(record).map_err(|e| {
            tracing::error!("error encoding the node to JSON: {}", e);
            DriveError::Encoding(e)
        })?;

        let mut merged = serde_json::to_value(&*self).map_err(|e| {
            tracing::error!("error encoding the node to JSON: {}", e);
            DriveError::Encoding(e)
        })?;
        overlay(&mut merged, incoming, NODE_FIELDS);

        let mut scratch: Node = serde_json::from_value(merged).map_err(|e| {
            tracing::error!("error decoding the node from JSON: {}", e);
            DriveError::Decoding(e)
        })?;

        scratch.children = std::mem::take(&mut self.children);
        scratch.root = self.root;
        scratch.client = self.client.take();
        *self = scratch;

        tracing::debug!("updated node {} ({})", self.id, self.name);
        Ok(())
    }
}

/// Wire keys of [`Node`], in the spelling the node serialises them with.
const NODE_FIELDS: &[&str] = &[
    "id",
    "name",
    "kind",
    "Parents",
    "status",
    "labels",
    "createdBy",
    "creationDate",
    "modifiedDate",
    "version",
    "tempLink",
    "contentProperties",
];

/// Wire keys of [`ContentProperties`](crate::fs::ContentProperties).
const CONTENT_FIELDS: &[&str] = &[
    "version",
    "extension",
    "size",
    "md5",
    "contentType",
    "contentDate",
];

fn nested_fields(key: &str) -> &'static [&'static str] {
    match key {
        "contentProperties" => CONTENT_FIELDS,
        _ => &[],
    }
}

/// Canonical spelling of `key`: a known field first, then a key `target` already has.
fn resolve_key(target: &Map<String, Value>, fields: &[&str], key: String) -> String {
    if let Some(field) = fields.iter().find(|f| f.eq_ignore_ascii_case(&key)) {
        return field.to_string();
    }
    target
        .keys()
        .find(|k| k.eq_ignore_ascii_case(&key))
        .cloned()
        .unwrap_or(key)
}

/// Write `incoming` over `target`, recursing into objects.
fn overlay(target: &mut Value, incoming: Value, fields: &[&str]) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let key = resolve_key(target, fields, key);

                if value.is_null() {
                    if target.get(&key).map_or(false, Value::is_array) {
                        target.remove(&key);
                    }
                    continue;
                }

                match target.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        overlay(slot, value, nested_fields(&key))
                    }
                    None if value.is_object() => {
                        let mut slot = Value::Object(Map::new());
                        overlay(&mut slot, value, nested_fields(&key));
                        target.insert(key, slot);
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}
