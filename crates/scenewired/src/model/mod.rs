//! Model-store collaborator interface.
//!
//! The server never owns scene state. Everything it reports or mutates goes
//! through a [`ModelStore`], and every call to that store happens inside a
//! unit of work run by the executor on the designated context. Handles are
//! plain ids; a handle from one loaded copy is meaningless once that copy is
//! released.
//!
//! Property access is described by [`PropertyDescriptor`], a closed
//! description of a slot (path, declared [`PropertyKind`], editability) that
//! the store hands out and later accepts back for reads and writes.

pub mod memory;
pub mod resolver;
pub mod snapshot;
pub mod value;

use std::fmt;

use scenewire_protocol::IdentityRecord;
use thiserror::Error;

/// Identifier of a node in a loaded or persisted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(i64);

/// Identifier of a component attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(i64);

macro_rules! instance_id {
    ($name:ident) => {
        impl $name {
            /// Wraps a raw instance id.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw instance id as reported on the wire.
            #[must_use]
            pub const fn raw(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

instance_id!(NodeId);
instance_id!(ComponentId);

/// Descriptive fields of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Node name.
    pub name: String,
    /// Parent node, `None` for a tree root.
    pub parent: Option<NodeId>,
    /// Whether the node itself is active.
    pub active: bool,
    /// Tag label.
    pub tag: String,
    /// Layer index.
    pub layer: i32,
}

/// Descriptive fields of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    /// Owning node.
    pub node: NodeId,
    /// Short type name.
    pub type_name: String,
    /// Namespace-qualified type name.
    pub full_type: String,
    /// Whether the component is enabled.
    pub enabled: bool,
    /// Transform-like component every node carries; never removable.
    pub implicit: bool,
}

/// An entry of the component type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    /// Short type name, for example `BoxCollider`.
    pub name: String,
    /// Namespace-qualified name, for example `UnityEngine.BoxCollider`.
    pub full_name: String,
}

/// Declared kind of a property slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// Signed integer.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// Free text.
    String,
    /// Enumeration with the member names in index order.
    Enum(Vec<String>),
    /// RGBA colour.
    Color,
    /// Two-component float vector.
    Vector2,
    /// Three-component float vector.
    Vector3,
    /// Four-component float vector.
    Vector4,
    /// Rotation quaternion.
    Quaternion,
    /// Float rectangle.
    Rect,
    /// Float bounds.
    Bounds,
    /// Two-component integer vector.
    Vector2Int,
    /// Three-component integer vector.
    Vector3Int,
    /// Integer rectangle.
    RectInt,
    /// Integer bounds.
    BoundsInt,
    /// Reference to a node, component, or stored asset.
    ObjectReference,
    /// List whose elements share one kind.
    Array(Box<PropertyKind>),
    /// Anything the value model has no read or write rule for.
    Unsupported(String),
}

impl PropertyKind {
    /// Kind name reported in `PropertyInfo.type`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Integer => "Integer".to_owned(),
            Self::Float => "Float".to_owned(),
            Self::Boolean => "Boolean".to_owned(),
            Self::String => "String".to_owned(),
            Self::Enum(_) => "Enum".to_owned(),
            Self::Color => "Color".to_owned(),
            Self::Vector2 => "Vector2".to_owned(),
            Self::Vector3 => "Vector3".to_owned(),
            Self::Vector4 => "Vector4".to_owned(),
            Self::Quaternion => "Quaternion".to_owned(),
            Self::Rect => "Rect".to_owned(),
            Self::Bounds => "Bounds".to_owned(),
            Self::Vector2Int => "Vector2Int".to_owned(),
            Self::Vector3Int => "Vector3Int".to_owned(),
            Self::RectInt => "RectInt".to_owned(),
            Self::BoundsInt => "BoundsInt".to_owned(),
            Self::ObjectReference => "ObjectReference".to_owned(),
            Self::Array(element) => format!("Array<{}>", element.name()),
            Self::Unsupported(name) => name.clone(),
        }
    }
}

/// Target of an object-reference property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRef {
    /// A node of the tree holding the property.
    Node(NodeId),
    /// A component of the tree holding the property.
    Component(ComponentId),
    /// A stored asset or container, by path.
    Asset(String),
}

/// A property value in the store's native shape.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Integer scalar.
    Integer(i64),
    /// Float scalar.
    Float(f64),
    /// Boolean scalar.
    Boolean(bool),
    /// Text scalar.
    String(String),
    /// Enumeration member index.
    Enum(usize),
    /// RGBA colour.
    Color([f32; 4]),
    /// Float vectors and aggregates.
    Vector2([f32; 2]),
    /// See [`PropertyValue::Vector2`].
    Vector3([f32; 3]),
    /// See [`PropertyValue::Vector2`].
    Vector4([f32; 4]),
    /// Rotation as `x, y, z, w`.
    Quaternion([f32; 4]),
    /// Rectangle as `x, y, width, height`.
    Rect([f32; 4]),
    /// Bounds as centre then extents.
    Bounds([f32; 6]),
    /// Integer vectors and aggregates.
    Vector2Int([i32; 2]),
    /// See [`PropertyValue::Vector2Int`].
    Vector3Int([i32; 3]),
    /// See [`PropertyValue::Vector2Int`].
    RectInt([i32; 4]),
    /// See [`PropertyValue::Vector2Int`].
    BoundsInt([i32; 6]),
    /// Object reference; `None` when unset.
    Reference(Option<ObjectRef>),
    /// List value.
    Array(Vec<PropertyValue>),
    /// Value of an unsupported kind, as the store renders it.
    Opaque(String),
}

/// Owner of a property slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyOwner {
    /// A component inside a tree.
    Component(ComponentId),
    /// A stored asset, by path.
    Asset(String),
}

/// The store's description of one property slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Slot owner.
    pub owner: PropertyOwner,
    /// Property path, for example `m_Center`.
    pub path: String,
    /// Human-readable name.
    pub display_name: String,
    /// Declared kind.
    pub kind: PropertyKind,
    /// Whether writes are refused.
    pub read_only: bool,
}

impl PropertyDescriptor {
    /// Returns `true` for list slots.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, PropertyKind::Array(_))
    }
}

/// Failures reported by a model store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed item does not exist.
    #[error("{what} not found: {name}")]
    NotFound {
        /// Item category, for example `prefab` or `component`.
        what: &'static str,
        /// Requested name or path.
        name: String,
    },
    /// The target of a create or copy already exists.
    #[error("{what} already exists: {name}")]
    AlreadyExists {
        /// Item category.
        what: &'static str,
        /// Conflicting name or path.
        name: String,
    },
    /// The store refused the operation.
    #[error("{0}")]
    Rejected(String),
    /// Writing a container or asset back failed.
    #[error("failed to save {path}: {message}")]
    Persist {
        /// Store path being written.
        path: String,
        /// Failure detail.
        message: String,
    },
}

impl StoreError {
    /// Builds a [`StoreError::NotFound`].
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Builds a [`StoreError::AlreadyExists`].
    pub fn already_exists(what: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            what,
            name: name.into(),
        }
    }
}

/// Operations the server needs from the object model.
///
/// Calls may be slow and are only ever made from the designated context.
pub trait ModelStore: Send {
    /// Version string of the model host.
    fn host_version(&self) -> String;

    /// Project name of the model host.
    fn project_name(&self) -> String;

    /// Root of the persisted container at `path`, for reading.
    fn find_root(&self, path: &str) -> Result<NodeId, StoreError>;

    /// Loads an editable copy of the container at `path`.
    fn load_mutable_copy(&mut self, path: &str) -> Result<NodeId, StoreError>;

    /// Persists the tree rooted at `root` as the container at `path`.
    fn save_copy(&mut self, root: NodeId, path: &str) -> Result<(), StoreError>;

    /// Discards a copy obtained from [`ModelStore::load_mutable_copy`] or
    /// [`ModelStore::create_root`].
    fn release(&mut self, root: NodeId);

    /// Builds a detached root node, optionally seeded from a primitive shape.
    fn create_root(&mut self, name: &str, primitive: Option<&str>) -> Result<NodeId, StoreError>;

    /// Descriptive fields of a node.
    fn node(&self, node: NodeId) -> Result<NodeRecord, StoreError>;

    /// Direct children in order.
    fn children(&self, node: NodeId) -> Result<Vec<(String, NodeId)>, StoreError>;

    /// Components attached to a node, implicit transform first.
    fn components(&self, node: NodeId) -> Result<Vec<ComponentId>, StoreError>;

    /// Descriptive fields of a component.
    fn component(&self, component: ComponentId) -> Result<ComponentRecord, StoreError>;

    /// Component types that can be attached, in catalog order.
    fn component_types(&self) -> Vec<ComponentType>;

    /// Attaches a component of the namespace-qualified type.
    fn add_component(&mut self, node: NodeId, full_type: &str) -> Result<ComponentId, StoreError>;

    /// Detaches a component.
    fn remove_component(&mut self, component: ComponentId) -> Result<(), StoreError>;

    /// Appends a default-positioned child.
    fn create_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError>;

    /// Destroys a node with all of its descendants.
    fn destroy_subtree(&mut self, node: NodeId) -> Result<(), StoreError>;

    /// Visible properties of a component or asset, in declaration order.
    fn enumerate_properties(
        &self,
        owner: &PropertyOwner,
    ) -> Result<Vec<PropertyDescriptor>, StoreError>;

    /// Looks up one property by path.
    fn find_property(
        &self,
        owner: &PropertyOwner,
        path: &str,
    ) -> Result<PropertyDescriptor, StoreError>;

    /// Reads the current value of a slot.
    fn read_value(&self, property: &PropertyDescriptor) -> Result<PropertyValue, StoreError>;

    /// Replaces the value of a slot.
    fn write_value(
        &mut self,
        property: &PropertyDescriptor,
        value: PropertyValue,
    ) -> Result<(), StoreError>;

    /// Entries below `folder`, optionally filtered by type, in path order.
    fn search_by_path_prefix(&self, folder: &str, type_filter: Option<&str>)
    -> Vec<IdentityRecord>;

    /// Entries whose name contains `fragment`, in path order.
    fn search_by_name(&self, fragment: &str) -> Vec<IdentityRecord>;

    /// Identity of the container or asset at `path`.
    fn identity(&self, path: &str) -> Result<IdentityRecord, StoreError>;

    /// Whether a container or asset exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Whether `path` names a container.
    fn is_container(&self, path: &str) -> bool;

    /// Deletes the container at `path`.
    fn delete_container(&mut self, path: &str) -> Result<(), StoreError>;

    /// Copies the container at `source` to `destination`.
    fn copy_container(&mut self, source: &str, destination: &str) -> Result<(), StoreError>;

    /// Whether `path` names a folder.
    fn folder_exists(&self, path: &str) -> bool;

    /// Creates folder `name` inside the existing folder `parent`.
    fn create_folder(&mut self, parent: &str, name: &str) -> Result<(), StoreError>;

    /// Writes a modified asset back.
    fn save_asset(&mut self, path: &str) -> Result<(), StoreError>;
}
