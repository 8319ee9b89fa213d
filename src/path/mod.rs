//! Property Path Resolver
//!
//! Compiles a property-path string (`ns:element@attribute`, `element@attribute`
//! or `@attribute`) into a reusable extractor from a content node to that
//! property's value sequence. Attribute names are validated at compile time
//! against the allowed set for their element; extraction itself never fails,
//! unknown properties yield an empty sequence.

use crate::error::{Error, Result};
use crate::node::ContentNode;
use crate::value::Value;

/// Allowed attributes of the `res` element.
const RES_ATTRIBUTES: &[&str] = &[
    "bitrate",
    "bitsPerSample",
    "colorDepth",
    "duration",
    "importUri",
    "nrAudioChannels",
    "protection",
    "protocolInfo",
    "resolution",
    "sampleFrequency",
    "size",
];

/// Parsed property path: namespace prefix, element name, attribute name, each
/// possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    pub namespace: String,
    pub element: String,
    pub attribute: String,
}

impl PropertyPath {
    /// Split a path string into its three parts. Structurally infallible;
    /// whether the parts name anything extractable is decided at compile.
    pub fn parse(text: &str) -> Self {
        let (qname, attribute) = match text.split_once('@') {
            Some((q, a)) => (q, a),
            None => (text, ""),
        };
        let (namespace, element) = match qname.split_once(':') {
            Some((ns, local)) => (ns, local),
            None => ("", qname),
        };
        PropertyPath {
            namespace: namespace.to_string(),
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// What kind of node a path is being compiled for. `Any` admits the union of
/// both attribute sets; the query compiler uses it because one expression runs
/// against containers and items alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindHint {
    #[default]
    Any,
    Container,
    Item,
}

/// Node-level attributes (paths of the `@attribute` form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeAttr {
    Id,
    ParentId,
    Restricted,
    Searchable,
    RefId,
    ChildCount,
}

/// Compiled extraction plan.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
    /// `@id`, `@parentID`, ... on the node itself
    NodeAttr(NodeAttr),
    /// Empty path: the node's flattened inner content
    WholeNode,
    /// `res`: resource URIs
    ResourceUri,
    /// `res@size` and friends
    ResourceAttr(String),
    /// `dc:title`, `upnp:class`, ...
    ElementValue,
    /// `upnp:albumArtURI@dlna:profileID`: attributes are discovered from the
    /// element's own stored set, so no compile-time validation exists
    ElementAttr(String),
}

/// A compiled property path: maps a content node to the ordered value
/// sequence of one property. Immutable and freely shared between threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    path: PropertyPath,
    plan: Plan,
}

impl Extractor {
    /// Compile a path string, validating its attribute against the allowed
    /// set for the element kind.
    pub fn compile(text: &str, hint: KindHint) -> Result<Self> {
        let path = PropertyPath::parse(text);
        let plan = if path.element.is_empty() && path.namespace.is_empty() {
            if path.attribute.is_empty() {
                Plan::WholeNode
            } else {
                Plan::NodeAttr(node_attr(&path.attribute, hint)?)
            }
        } else if path.element == "res" && path.namespace.is_empty() {
            if path.attribute.is_empty() {
                Plan::ResourceUri
            } else if RES_ATTRIBUTES.contains(&path.attribute.as_str()) {
                Plan::ResourceAttr(path.attribute.clone())
            } else {
                return Err(Error::InvalidAttribute {
                    element: "res".to_string(),
                    attribute: path.attribute.clone(),
                });
            }
        } else if path.attribute.is_empty() {
            Plan::ElementValue
        } else {
            Plan::ElementAttr(path.attribute.clone())
        };
        Ok(Extractor { path, plan })
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// Extract this property's value sequence from a node. Zero, one, or many
    /// values, in stored order.
    pub fn extract(&self, node: &ContentNode) -> Vec<Value> {
        match &self.plan {
            Plan::NodeAttr(attr) => match attr {
                NodeAttr::Id => vec![Value::from(node.id())],
                // The tree root has no parent; the wire vocabulary spells
                // that as "-1"
                NodeAttr::ParentId => {
                    let parent_id = node
                        .parent()
                        .map(|p| p.id().to_string())
                        .unwrap_or_else(|| "-1".to_string());
                    vec![Value::String(parent_id)]
                }
                NodeAttr::Restricted => vec![Value::Boolean(node.is_restricted())],
                NodeAttr::Searchable => {
                    if node.is_container() {
                        vec![Value::Boolean(node.is_searchable())]
                    } else {
                        Vec::new()
                    }
                }
                NodeAttr::RefId => node
                    .ref_id()
                    .map(|r| vec![Value::from(r)])
                    .unwrap_or_default(),
                NodeAttr::ChildCount => {
                    if node.is_container() {
                        vec![Value::Integer(node.child_count() as i64)]
                    } else {
                        Vec::new()
                    }
                }
            },
            Plan::WholeNode => vec![Value::String(node.flattened_text())],
            Plan::ResourceUri => node.resource_values(),
            Plan::ResourceAttr(attr) => node.resource_attr_values(attr),
            Plan::ElementValue => node.element_values(&self.path.namespace, &self.path.element),
            Plan::ElementAttr(attr) => {
                node.element_attr_values(&self.path.namespace, &self.path.element, attr)
            }
        }
    }
}

fn node_attr(attribute: &str, hint: KindHint) -> Result<NodeAttr> {
    let invalid = || Error::InvalidAttribute {
        element: "object".to_string(),
        attribute: attribute.to_string(),
    };
    match attribute {
        "id" => Ok(NodeAttr::Id),
        "parentID" => Ok(NodeAttr::ParentId),
        "restricted" => Ok(NodeAttr::Restricted),
        "searchable" if hint != KindHint::Item => Ok(NodeAttr::Searchable),
        "refID" if hint != KindHint::Container => Ok(NodeAttr::RefId),
        "childCount" if hint != KindHint::Item => Ok(NodeAttr::ChildCount),
        _ => Err(invalid()),
    }
}
