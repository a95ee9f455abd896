use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload carried by a node: nested children, text, or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeContent {
    Nodes(Vec<BinaryNode>),
    Text(String),
    Bytes(Vec<u8>),
}

/// A single node of a structured request or response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BinaryNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub content: Option<NodeContent>,
}

impl BinaryNode {
    /// Create a node with no attributes and no content.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            content: None,
        }
    }

    /// Add (or overwrite) one attribute.
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Set child nodes as the content, replacing any previous content.
    pub fn children(mut self, children: Vec<BinaryNode>) -> Self {
        self.content = Some(NodeContent::Nodes(children));
        self
    }

    /// Append one child node. Non-node content is replaced.
    pub fn child(mut self, child: BinaryNode) -> Self {
        match &mut self.content {
            Some(NodeContent::Nodes(nodes)) => nodes.push(child),
            _ => self.content = Some(NodeContent::Nodes(vec![child])),
        }
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Some(NodeContent::Text(text.into()));
        self
    }

    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.content = Some(NodeContent::Bytes(bytes.into()));
        self
    }

    /// Attribute lookup.
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Child nodes, or an empty slice when the content is not a node list.
    pub fn child_nodes(&self) -> &[BinaryNode] {
        match &self.content {
            Some(NodeContent::Nodes(nodes)) => nodes.as_slice(),
            _ => &[],
        }
    }

    /// Content decoded as UTF-8 text, if it is text or bytes.
    pub fn content_string(&self) -> Option<String> {
        match &self.content {
            Some(NodeContent::Text(text)) => Some(text.clone()),
            Some(NodeContent::Bytes(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

/// First child with the given tag. Tolerates a missing parent.
pub fn get_binary_node_child<'a>(
    node: Option<&'a BinaryNode>,
    child_tag: &str,
) -> Option<&'a BinaryNode> {
    node?.child_nodes().iter().find(|c| c.tag == child_tag)
}

/// All children with the given tag, in order. Empty for a missing parent.
pub fn get_binary_node_children<'a>(
    node: Option<&'a BinaryNode>,
    child_tag: &str,
) -> Vec<&'a BinaryNode> {
    match node {
        Some(node) => node
            .child_nodes()
            .iter()
            .filter(|c| c.tag == child_tag)
            .collect(),
        None => Vec::new(),
    }
}

/// Text content of the first child with the given tag.
pub fn get_binary_node_child_string(node: Option<&BinaryNode>, child_tag: &str) -> Option<String> {
    get_binary_node_child(node, child_tag).and_then(BinaryNode::content_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_lookup() {
        let node = BinaryNode::new("result")
            .child(BinaryNode::new("participant").attr("jid", "a@s.whatsapp.net"))
            .child(BinaryNode::new("addressing_mode").text("lid"))
            .child(BinaryNode::new("participant").attr("jid", "b@s.whatsapp.net"));

        let first = get_binary_node_child(Some(&node), "participant").unwrap();
        assert_eq!(first.get_attr("jid"), Some("a@s.whatsapp.net"));
        assert_eq!(get_binary_node_children(Some(&node), "participant").len(), 2);
        assert_eq!(
            get_binary_node_child_string(Some(&node), "addressing_mode").as_deref(),
            Some("lid")
        );
        assert!(get_binary_node_child(Some(&node), "missing").is_none());
    }

    #[test]
    fn test_missing_parent_is_empty() {
        assert!(get_binary_node_child(None, "x").is_none());
        assert!(get_binary_node_children(None, "x").is_empty());
        assert!(get_binary_node_child_string(None, "x").is_none());
    }

    #[test]
    fn test_bytes_content_decodes_as_text() {
        let node = BinaryNode::new("body").bytes("hello".as_bytes());
        assert_eq!(node.content_string().as_deref(), Some("hello"));
        assert!(node.child_nodes().is_empty());
    }
}
