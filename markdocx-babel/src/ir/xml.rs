//! Generic XML tree shared by the OMML translator and the DOCX reader.
//!
//! Parts are parsed with `roxmltree` and converted once into an owned [`XmlNode`] tree so
//! that the converters can dispatch with exhaustive matches instead of probing borrowed
//! parser nodes. Element and attribute names keep their namespace prefix (`w:p`, `r:id`);
//! lookups go through the local part of the name.

use crate::error::FormatError;
use roxmltree::{Document, Node, NodeType};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// An element or text node of a parsed XML part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<XmlNode>,
    },
    Text(String),
}

impl XmlNode {
    /// Build an element with no attributes.
    pub fn element(name: impl Into<String>, children: Vec<XmlNode>) -> Self {
        XmlNode::Element {
            name: name.into(),
            attributes: Vec::new(),
            children,
        }
    }

    /// Qualified name of an element, `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            XmlNode::Element { name, .. } => Some(name),
            XmlNode::Text(_) => None,
        }
    }

    /// Name without its namespace prefix. Text nodes have an empty local name.
    pub fn local_name(&self) -> &str {
        match self {
            XmlNode::Element { name, .. } => local_part(name),
            XmlNode::Text(_) => "",
        }
    }

    /// Whether this is an element with the given local name.
    pub fn is(&self, local: &str) -> bool {
        matches!(self, XmlNode::Element { name, .. } if local_part(name) == local)
    }

    pub fn children(&self) -> &[XmlNode] {
        match self {
            XmlNode::Element { children, .. } => children,
            XmlNode::Text(_) => &[],
        }
    }

    /// Attribute value looked up by local name (`val` matches `w:val` and `m:val`).
    pub fn attr(&self, local: &str) -> Option<&str> {
        match self {
            XmlNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| local_part(key) == local)
                .map(|(_, value)| value.as_str()),
            XmlNode::Text(_) => None,
        }
    }

    /// Attribute value looked up by its exact qualified name.
    pub fn qualified_attr(&self, qualified: &str) -> Option<&str> {
        match self {
            XmlNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == qualified)
                .map(|(_, value)| value.as_str()),
            XmlNode::Text(_) => None,
        }
    }

    /// First direct child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlNode> {
        self.children().iter().find(|child| child.is(local))
    }

    /// Direct child elements with the given local name, in document order.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children().iter().filter(move |child| child.is(local))
    }

    /// First element in a depth-first, pre-order walk (self included) matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&XmlNode) -> bool) -> Option<&XmlNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find(predicate))
    }

    /// Concatenated text of this node and its descendants.
    pub fn text(&self) -> String {
        match self {
            XmlNode::Text(value) => value.clone(),
            XmlNode::Element { children, .. } => children.iter().map(XmlNode::text).collect(),
        }
    }

    /// Serialize back to XML text. Namespace declarations are the caller's responsibility.
    pub fn write_xml(&self, out: &mut String) {
        match self {
            XmlNode::Text(value) => out.push_str(&escape_text(value)),
            XmlNode::Element {
                name,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_xml(out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }
}

/// Parse an XML part and return its root element.
pub fn parse_xml(source: &str) -> Result<XmlNode, FormatError> {
    let document = Document::parse(source)
        .map_err(|e| FormatError::ParseError(format!("Failed to parse XML: {e}")))?;
    Ok(convert_node(document.root_element()))
}

fn convert_node(node: Node) -> XmlNode {
    let element_children = node.children().any(|child| child.is_element());
    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(convert_node(child)),
            NodeType::Text => {
                let value = child.text().unwrap_or_default();
                // Indentation between elements carries no content.
                if element_children && value.trim().is_empty() {
                    continue;
                }
                children.push(XmlNode::Text(value.to_string()));
            }
            _ => {}
        }
    }

    let attributes = node
        .attributes()
        .map(|attr| {
            let name = qualify(&node, attr.namespace(), attr.name());
            (name, attr.value().to_string())
        })
        .collect();

    XmlNode::Element {
        name: qualify(&node, node.tag_name().namespace(), node.tag_name().name()),
        attributes,
        children,
    }
}

fn qualify(node: &Node, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Escape text content for inclusion in an XML document.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for inclusion in a double-quoted XML attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
