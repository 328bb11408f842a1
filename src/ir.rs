use crate::theme::Color;
use crate::tree::VisualizableNode;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeParseError {
    #[error("invalid tree document: {0}")]
    Syntax(#[from] json5::Error),
}

/// Owned tree used for documents read from disk and for tests.
///
/// Documents are JSON5 (plain JSON works too):
///
/// ```json5
/// { keys: [8], color: "#ffcc00", children: [ { keys: [3] }, null, { keys: [10, 11] } ] }
/// ```
///
/// `keys` may also be a single scalar. A top-level `null` is an empty tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(deserialize_with = "deserialize_keys")]
    pub keys: Vec<String>,
    #[serde(default)]
    pub children: Vec<Option<TreeNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl TreeNode {
    pub fn new<K: ToString>(
        keys: impl IntoIterator<Item = K>,
        children: Vec<Option<TreeNode>>,
    ) -> Self {
        Self {
            keys: keys.into_iter().map(|key| key.to_string()).collect(),
            children,
            color: None,
        }
    }

    pub fn leaf<K: ToString>(keys: impl IntoIterator<Item = K>) -> Self {
        Self::new(keys, Vec::new())
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn push_child(&mut self, child: Option<TreeNode>) {
        self.children.push(child);
    }
}

impl Drop for TreeNode {
    // Unlinks descendants onto a heap stack so dropping a deep chain does not recurse.
    fn drop(&mut self) {
        let mut pending: Vec<TreeNode> = self.children.drain(..).flatten().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain(..).flatten());
        }
    }
}

impl VisualizableNode for TreeNode {
    fn keys(&self) -> Vec<String> {
        self.keys.clone()
    }

    fn children(&self) -> Vec<Option<&Self>> {
        self.children.iter().map(Option::as_ref).collect()
    }

    fn color(&self) -> Option<Color> {
        self.color
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeys {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

fn deserialize_keys<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let values = match RawKeys::deserialize(deserializer)? {
        RawKeys::Many(values) => values,
        RawKeys::One(value) => vec![value],
    };
    Ok(values.iter().map(key_text).collect())
}

fn key_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parses a tree document. `Ok(None)` is the empty tree.
pub fn parse_tree(input: &str) -> Result<Option<TreeNode>, TreeParseError> {
    Ok(json5::from_str::<Option<TreeNode>>(input)?)
}
