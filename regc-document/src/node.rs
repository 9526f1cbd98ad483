// Registry element tree

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One element of a registry document.
///
/// Documents are JSON renderings of an element tree: every node has a tag,
/// string attributes, optional text content and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute value, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value or `default`
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Text content, empty when absent
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_from_json() {
        let json = r#"{
            "tag": "variable",
            "attributes": {"local_name": "u", "standard_name": "east_wind", "type": "real"},
            "children": [{"tag": "dimensions", "text": "horizontal_dimension"}]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();

        assert_eq!(node.tag, "variable");
        assert_eq!(node.get("local_name"), Some("u"));
        assert_eq!(node.get_or("units", "1"), "1");
        assert_eq!(node.children[0].text(), "horizontal_dimension");
        assert_eq!(node.text(), "");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"tag": "file", "attrs": {}}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn test_builder() {
        let node = Node::new("use")
            .with_attr("module", "ccpp_kinds")
            .with_attr("reference", "kind_phys");
        let names: Vec<&str> = node.attribute_names().collect();
        assert_eq!(names, vec!["module", "reference"]);
    }
}
