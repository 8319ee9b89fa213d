//! Content Nodes
//!
//! Containers and items of the media hierarchy. Nodes arrive fully formed
//! from the builder layer; this crate manages only tree linkage and read-only
//! metadata access. A node is the child of at most one container: children are
//! owned by their parent's index, the back-reference is weak.

mod ids;

pub use ids::{IdGenerator, SequentialIds};

use crate::index::OrderedIndex;
use crate::tree::{ChildOrder, LockPolicy, TreeConfig};
use crate::value::Value;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

/// Kind of a content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Can hold children and be browsed/searched into
    Container,
    /// Leaf media object
    Item,
}

/// One metadata element (`dc:title`, `upnp:class`, ...). Multi-valued
/// properties are stored as repeated elements in document order.
#[derive(Debug, Clone)]
pub struct MetaElement {
    /// Namespace prefix, empty for unprefixed elements
    pub namespace: String,
    pub name: String,
    pub value: Value,
    /// Attributes declared on this element, in stored order
    pub attributes: Vec<(String, String)>,
}

/// One binary resource reference with its transfer metadata.
#[derive(Debug, Clone)]
pub struct Resource {
    pub uri: String,
    /// Typed `res@` attributes (duration, size, resolution, ...)
    pub attributes: Vec<(String, Value)>,
}

/// Child-index state guarded by the container's lock.
pub(crate) struct Children {
    pub(crate) index: OrderedIndex<Arc<ContentNode>>,
    pub(crate) populated: bool,
}

/// A container or item in the media hierarchy.
pub struct ContentNode {
    id: String,
    kind: NodeKind,
    restricted: bool,
    searchable: bool,
    ref_id: Option<String>,
    elements: Vec<MetaElement>,
    resources: Vec<Resource>,
    lock_policy: LockPolicy,
    parent: Mutex<Weak<ContentNode>>,
    children: Option<RwLock<Children>>,
}

impl ContentNode {
    /// Create a container with the default tree configuration (id-sorted
    /// children, one lock per container).
    pub fn container(id: impl Into<String>) -> Self {
        Self::container_with(id, TreeConfig::default())
    }

    /// Create a container with an explicit tree configuration.
    pub fn container_with(id: impl Into<String>, config: TreeConfig) -> Self {
        let cmp: crate::index::Comparator<Arc<ContentNode>> =
            Arc::new(|a: &Arc<ContentNode>, b: &Arc<ContentNode>| a.id().cmp(b.id()));
        let index = match config.child_order {
            ChildOrder::ById => OrderedIndex::sorted(cmp),
            ChildOrder::Insertion => OrderedIndex::insertion_order(cmp),
        };
        ContentNode {
            id: id.into(),
            kind: NodeKind::Container,
            restricted: true,
            searchable: true,
            ref_id: None,
            elements: Vec::new(),
            resources: Vec::new(),
            lock_policy: config.lock_policy,
            parent: Mutex::new(Weak::new()),
            children: Some(RwLock::new(Children {
                index,
                populated: false,
            })),
        }
    }

    /// Create a leaf item.
    pub fn item(id: impl Into<String>) -> Self {
        ContentNode {
            id: id.into(),
            kind: NodeKind::Item,
            restricted: true,
            searchable: false,
            ref_id: None,
            elements: Vec::new(),
            resources: Vec::new(),
            lock_policy: LockPolicy::PerContainer,
            parent: Mutex::new(Weak::new()),
            children: None,
        }
    }

    /// Append a metadata element.
    pub fn with_element(
        self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.with_attributed_element(namespace, name, value, Vec::new())
    }

    /// Append a metadata element carrying its own attributes.
    pub fn with_attributed_element(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
        attributes: Vec<(String, String)>,
    ) -> Self {
        self.elements.push(MetaElement {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
            attributes,
        });
        self
    }

    /// Append a resource reference.
    pub fn with_resource(mut self, uri: impl Into<String>, attributes: Vec<(String, Value)>) -> Self {
        self.resources.push(Resource {
            uri: uri.into(),
            attributes,
        });
        self
    }

    pub fn restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    /// Mark a container as searchable. Meaningless for items.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Mark an item as a reference to another object.
    pub fn reference(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    pub fn is_item(&self) -> bool {
        self.kind == NodeKind::Item
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn ref_id(&self) -> Option<&str> {
        self.ref_id.as_deref()
    }

    pub fn elements(&self) -> &[MetaElement] {
        &self.elements
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// The container holding this node, if it is linked and still alive.
    pub fn parent(&self) -> Option<Arc<ContentNode>> {
        self.parent.lock().upgrade()
    }

    /// Number of children. Zero for items.
    pub fn child_count(&self) -> usize {
        match &self.children {
            Some(children) => {
                let _shared = self.lock_policy.read_shared();
                children.read().index.len()
            }
            None => 0,
        }
    }

    /// Whether the container currently holds children. Mutation drives the
    /// populated/unpopulated transitions.
    pub fn is_populated(&self) -> bool {
        match &self.children {
            Some(children) => {
                let _shared = self.lock_policy.read_shared();
                children.read().populated
            }
            None => false,
        }
    }

    /// Flattened inner content, the target of whole-node queries: every
    /// element's string form joined in stored order.
    pub fn flattened_text(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&element.value.string_value());
        }
        out
    }

    /// Values of every element matching `namespace:name`, in stored order.
    pub fn element_values(&self, namespace: &str, name: &str) -> Vec<Value> {
        self.elements
            .iter()
            .filter(|e| e.namespace == namespace && e.name == name)
            .map(|e| e.value.clone())
            .collect()
    }

    /// Values of `attribute` across every element matching `namespace:name`.
    pub fn element_attr_values(&self, namespace: &str, name: &str, attribute: &str) -> Vec<Value> {
        self.elements
            .iter()
            .filter(|e| e.namespace == namespace && e.name == name)
            .filter_map(|e| {
                e.attributes
                    .iter()
                    .find(|(a, _)| a == attribute)
                    .map(|(_, v)| Value::from(v.clone()))
            })
            .collect()
    }

    /// All resource URIs, in stored order.
    pub fn resource_values(&self) -> Vec<Value> {
        self.resources
            .iter()
            .map(|r| Value::from(r.uri.clone()))
            .collect()
    }

    /// Values of one `res@` attribute across all resources.
    pub fn resource_attr_values(&self, attribute: &str) -> Vec<Value> {
        self.resources
            .iter()
            .filter_map(|r| {
                r.attributes
                    .iter()
                    .find(|(a, _)| a == attribute)
                    .map(|(_, v)| v.clone())
            })
            .collect()
    }

    pub(crate) fn lock_policy(&self) -> &LockPolicy {
        &self.lock_policy
    }

    /// The guarded child index. Containers only.
    pub(crate) fn children(&self) -> &RwLock<Children> {
        self.children
            .as_ref()
            .expect("child access on an item node")
    }

    pub(crate) fn set_parent(&self, parent: Weak<ContentNode>) {
        *self.parent.lock() = parent;
    }

    pub(crate) fn clear_parent(&self) {
        *self.parent.lock() = Weak::new();
    }
}

impl std::fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.child_count())
            .finish()
    }
}
