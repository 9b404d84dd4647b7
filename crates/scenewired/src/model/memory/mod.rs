//! In-memory reference implementation of [`ModelStore`].
//!
//! [`MemoryStore`] keeps every node and component in flat id-keyed tables.
//! Persisted containers and loaded copies are separate trees in the same
//! tables: loading clones the persisted tree, saving clones the copy back and
//! drops the previous persisted tree. Internal references are remapped on
//! every clone so they keep pointing inside the tree they belong to.

mod schema;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use scenewire_protocol::IdentityRecord;
use sha2::{Digest, Sha256};

pub use self::schema::{
    BUILTIN_MESH_FOLDER, ComponentSchema, DEFAULT_MATERIAL, PropertyDef, asset_properties,
    builtin_components,
};
use super::{
    ComponentId, ComponentRecord, ComponentType, ModelStore, NodeId, NodeRecord, ObjectRef,
    PropertyDescriptor, PropertyKind, PropertyOwner, PropertyValue, StoreError,
};

/// Primitive shapes and the collider each is seeded with.
pub const PRIMITIVES: &[(&str, &str)] = &[
    ("Cube", "UnityEngine.BoxCollider"),
    ("Sphere", "UnityEngine.SphereCollider"),
    ("Capsule", "UnityEngine.CapsuleCollider"),
    ("Cylinder", "UnityEngine.CapsuleCollider"),
    ("Plane", "UnityEngine.MeshCollider"),
    ("Quad", "UnityEngine.MeshCollider"),
];

const ROOT_FOLDER: &str = "Assets";
const CONTAINER_TYPE: &str = "Prefab";
const CONTAINER_EXTENSION: &str = ".prefab";
const TRANSFORM: &str = "UnityEngine.Transform";
const UNTAGGED: &str = "Untagged";

/// Counters shared with whoever holds a clone, for observing store traffic.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    writes: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
}

impl StoreStats {
    /// Number of [`ModelStore::write_value`] calls, successful or not.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of container and asset saves.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<ComponentId>,
    active: bool,
    tag: String,
    layer: i32,
}

#[derive(Debug, Clone)]
struct ComponentData {
    node: NodeId,
    schema: usize,
    enabled: bool,
    values: Vec<PropertyValue>,
}

#[derive(Debug, Clone)]
struct AssetData {
    asset_type: String,
    properties: Vec<PropertyDef>,
    values: Vec<PropertyValue>,
}

/// A self-contained project held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    project_name: String,
    next_id: i64,
    schemas: Vec<ComponentSchema>,
    nodes: HashMap<NodeId, NodeData>,
    components: HashMap<ComponentId, ComponentData>,
    containers: BTreeMap<String, NodeId>,
    detached: HashSet<NodeId>,
    assets: BTreeMap<String, AssetData>,
    folders: BTreeSet<String>,
    stats: StoreStats,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Builds an empty project holding only the built-in meshes and material.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            project_name: "Untitled".to_owned(),
            next_id: 1000,
            schemas: builtin_components(),
            nodes: HashMap::new(),
            components: HashMap::new(),
            containers: BTreeMap::new(),
            detached: HashSet::new(),
            assets: BTreeMap::new(),
            folders: BTreeSet::from([ROOT_FOLDER.to_owned()]),
            stats: StoreStats::default(),
        };
        for (shape, _) in PRIMITIVES {
            store.insert_asset(&format!("{BUILTIN_MESH_FOLDER}/{shape}.mesh"), "Mesh");
        }
        store.insert_asset(DEFAULT_MATERIAL, "Material");
        store
    }

    /// Builds a small demo project with materials, textures, and one prefab.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if seeding the demo prefab fails.
    pub fn sample_project() -> Result<Self, StoreError> {
        let mut store = Self::new().with_project_name("SampleProject");
        for material in ["Red", "Blue", "Ground", "Metal", "MetalRough"] {
            store.insert_asset(&format!("Assets/Materials/{material}.mat"), "Material");
        }
        store.insert_asset("Assets/Physics/Bouncy.physicMaterial", "PhysicMaterial");
        store.insert_asset("Assets/Textures/Crate.png", "Texture2D");
        store.insert_asset("Assets/Sprites/Crate.sprite", "Sprite");
        store.insert_asset("Assets/Audio/Hit.wav", "AudioClip");
        store.create_folder(ROOT_FOLDER, "Prefabs")?;
        store.seed_player("Assets/Prefabs/Player.prefab")?;
        Ok(store)
    }

    fn seed_player(&mut self, path: &str) -> Result<(), StoreError> {
        let root = self.create_root("Player", None)?;
        let body = self.create_child(root, "Body")?;
        self.add_component(body, "UnityEngine.CapsuleCollider")?;
        self.add_component(body, "UnityEngine.Rigidbody")?;
        for arm in ["LeftArm", "RightArm"] {
            let node = self.create_child(body, arm)?;
            self.add_component(node, "UnityEngine.BoxCollider")?;
        }
        let camera = self.create_child(root, "Main Camera")?;
        self.add_component(camera, "UnityEngine.Camera")?;
        if let Some(data) = self.nodes.get_mut(&camera) {
            "MainCamera".clone_into(&mut data.tag);
        }
        let saved = self.save_copy(root, path);
        self.release(root);
        saved
    }

    /// Sets the project name reported by `ping`.
    #[must_use]
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    /// Adds a component type to the catalog, replacing one with the same
    /// full name.
    pub fn register_component(&mut self, schema: ComponentSchema) {
        let full_name = schema.full_name();
        match self
            .schemas
            .iter_mut()
            .find(|existing| existing.full_name() == full_name)
        {
            Some(existing) => *existing = schema,
            None => self.schemas.push(schema),
        }
    }

    /// Stores an asset with the built-in slots for `asset_type`, creating
    /// missing folders.
    pub fn insert_asset(&mut self, path: &str, asset_type: &str) {
        self.insert_asset_with(path, asset_type, asset_properties(asset_type));
    }

    /// Stores an asset with explicit slots, creating missing folders.
    pub fn insert_asset_with(&mut self, path: &str, asset_type: &str, properties: Vec<PropertyDef>) {
        self.ensure_folders(parent_folder(path));
        let values = properties
            .iter()
            .map(|property| property.default.clone())
            .collect();
        self.assets.insert(
            path.to_owned(),
            AssetData {
                asset_type: asset_type.to_owned(),
                properties,
                values,
            },
        );
    }

    /// Shared traffic counters.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.stats.clone()
    }

    fn ensure_folders(&mut self, folder: &str) {
        let mut current = String::new();
        for segment in folder.split('/').filter(|segment| !segment.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            self.folders.insert(current.clone());
        }
    }

    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn node_data(&self, node: NodeId) -> Result<&NodeData, StoreError> {
        self.nodes
            .get(&node)
            .ok_or_else(|| StoreError::not_found("GameObject", node.to_string()))
    }

    fn component_data(&self, component: ComponentId) -> Result<&ComponentData, StoreError> {
        self.components
            .get(&component)
            .ok_or_else(|| StoreError::not_found("component", component.to_string()))
    }

    fn schema(&self, index: usize) -> Result<&ComponentSchema, StoreError> {
        self.schemas
            .get(index)
            .ok_or_else(|| StoreError::Rejected(format!("component schema {index} was removed")))
    }

    fn schema_index(&self, full_type: &str) -> Option<usize> {
        self.schemas
            .iter()
            .position(|schema| schema.full_name() == full_type)
    }

    fn new_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let node = NodeId::new(self.allocate());
        self.nodes.insert(
            node,
            NodeData {
                name: name.to_owned(),
                parent,
                children: Vec::new(),
                components: Vec::new(),
                active: true,
                tag: UNTAGGED.to_owned(),
                layer: 0,
            },
        );
        if let Some(parent_id) = parent
            && let Some(parent_data) = self.nodes.get_mut(&parent_id)
        {
            parent_data.children.push(node);
        }
        if let Some(transform) = self.schema_index(TRANSFORM) {
            self.attach(node, transform);
        }
        node
    }

    fn attach(&mut self, node: NodeId, schema: usize) -> ComponentId {
        let component = ComponentId::new(self.allocate());
        let values = self
            .schemas
            .get(schema)
            .map(|entry| {
                entry
                    .properties
                    .iter()
                    .map(|property| property.default.clone())
                    .collect()
            })
            .unwrap_or_default();
        self.components.insert(
            component,
            ComponentData {
                node,
                schema,
                enabled: true,
                values,
            },
        );
        if let Some(data) = self.nodes.get_mut(&node) {
            data.components.push(component);
        }
        component
    }

    fn set_slot(&mut self, component: ComponentId, path: &str, value: PropertyValue) {
        let Some(data) = self.components.get(&component) else {
            return;
        };
        let index = self
            .schemas
            .get(data.schema)
            .and_then(|schema| schema.properties.iter().position(|p| p.path == path));
        if let Some(index) = index
            && let Some(slot) = self
                .components
                .get_mut(&component)
                .and_then(|data| data.values.get_mut(index))
        {
            *slot = value;
        }
    }

    fn seed_primitive(&mut self, root: NodeId, shape: &str) -> Result<(), StoreError> {
        let (name, collider) = PRIMITIVES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(shape.trim()))
            .copied()
            .ok_or_else(|| StoreError::not_found("primitive", shape))?;
        let mesh = PropertyValue::Reference(Some(ObjectRef::Asset(format!(
            "{BUILTIN_MESH_FOLDER}/{name}.mesh"
        ))));
        let filter = self.add_component(root, "UnityEngine.MeshFilter")?;
        self.set_slot(filter, "m_Mesh", mesh.clone());
        self.add_component(root, "UnityEngine.MeshRenderer")?;
        let collider = self.add_component(root, collider)?;
        self.set_slot(collider, "m_Mesh", mesh);
        Ok(())
    }

    fn subtree(&self, root: NodeId) -> Result<Vec<NodeId>, StoreError> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let data = self.node_data(node)?;
            stack.extend(data.children.iter().rev().copied());
            order.push(node);
        }
        Ok(order)
    }

    fn clone_tree(&mut self, root: NodeId) -> Result<NodeId, StoreError> {
        let order = self.subtree(root)?;
        let mut node_map = HashMap::new();
        let mut component_map = HashMap::new();
        for node in &order {
            node_map.insert(*node, NodeId::new(self.allocate()));
            let attached = self.node_data(*node)?.components.clone();
            for component in attached {
                component_map.insert(component, ComponentId::new(self.allocate()));
            }
        }

        let remap_node = |id: &NodeId| node_map.get(id).copied().unwrap_or(*id);
        let remap_component = |id: &ComponentId| component_map.get(id).copied().unwrap_or(*id);
        let mut new_nodes = Vec::new();
        let mut new_components = Vec::new();
        for node in &order {
            let data = self.node_data(*node)?;
            let mut copy = data.clone();
            copy.parent = if *node == root {
                None
            } else {
                data.parent.as_ref().map(remap_node)
            };
            copy.children = data.children.iter().map(remap_node).collect();
            copy.components = data.components.iter().map(remap_component).collect();
            for component in &data.components {
                let mut attached = self.component_data(*component)?.clone();
                attached.node = remap_node(node);
                attached.values = attached
                    .values
                    .iter()
                    .map(|value| remap_value(value, &node_map, &component_map))
                    .collect();
                new_components.push((remap_component(component), attached));
            }
            new_nodes.push((remap_node(node), copy));
        }
        self.nodes.extend(new_nodes);
        self.components.extend(new_components);
        Ok(remap_node(&root))
    }

    fn destroy_tree(&mut self, node: NodeId) {
        let Ok(order) = self.subtree(node) else {
            return;
        };
        if let Some(parent) = self.nodes.get(&node).and_then(|data| data.parent)
            && let Some(parent_data) = self.nodes.get_mut(&parent)
        {
            parent_data.children.retain(|child| *child != node);
        }
        for id in order {
            if let Some(data) = self.nodes.remove(&id) {
                for component in data.components {
                    self.components.remove(&component);
                }
            }
        }
    }

    fn definitions(&self, owner: &PropertyOwner) -> Result<&[PropertyDef], StoreError> {
        match owner {
            PropertyOwner::Component(component) => {
                let data = self.component_data(*component)?;
                Ok(self.schema(data.schema)?.properties.as_slice())
            }
            PropertyOwner::Asset(path) => match self.assets.get(path) {
                Some(asset) => Ok(asset.properties.as_slice()),
                None if self.containers.contains_key(path) => Ok(&[]),
                None => Err(StoreError::not_found("asset", path.as_str())),
            },
        }
    }

    fn slot_index(&self, property: &PropertyDescriptor) -> Result<usize, StoreError> {
        self.definitions(&property.owner)?
            .iter()
            .position(|definition| definition.path == property.path)
            .ok_or_else(|| StoreError::not_found("property", property.path.as_str()))
    }

    fn values_mut(&mut self, owner: &PropertyOwner) -> Result<&mut Vec<PropertyValue>, StoreError> {
        match owner {
            PropertyOwner::Component(component) => self
                .components
                .get_mut(component)
                .map(|data| &mut data.values)
                .ok_or_else(|| StoreError::not_found("component", component.to_string())),
            PropertyOwner::Asset(path) => self
                .assets
                .get_mut(path)
                .map(|asset| &mut asset.values)
                .ok_or_else(|| StoreError::not_found("asset", path.as_str())),
        }
    }

    fn entries(&self) -> BTreeMap<&str, &str> {
        self.containers
            .keys()
            .map(|path| (path.as_str(), CONTAINER_TYPE))
            .chain(
                self.assets
                    .iter()
                    .map(|(path, asset)| (path.as_str(), asset.asset_type.as_str())),
            )
            .collect()
    }

    fn check_destination(&self, path: &str) -> Result<(), StoreError> {
        if !path.ends_with(CONTAINER_EXTENSION) {
            return Err(StoreError::Persist {
                path: path.to_owned(),
                message: format!("container paths must end in {CONTAINER_EXTENSION}"),
            });
        }
        let folder = parent_folder(path);
        if !self.folders.contains(folder) {
            return Err(StoreError::Persist {
                path: path.to_owned(),
                message: format!("folder '{folder}' does not exist"),
            });
        }
        if self.assets.contains_key(path) {
            return Err(StoreError::already_exists("asset", path));
        }
        Ok(())
    }
}

fn remap_value(
    value: &PropertyValue,
    nodes: &HashMap<NodeId, NodeId>,
    components: &HashMap<ComponentId, ComponentId>,
) -> PropertyValue {
    match value {
        PropertyValue::Reference(Some(ObjectRef::Node(id))) => PropertyValue::Reference(Some(
            ObjectRef::Node(nodes.get(id).copied().unwrap_or(*id)),
        )),
        PropertyValue::Reference(Some(ObjectRef::Component(id))) => PropertyValue::Reference(
            Some(ObjectRef::Component(components.get(id).copied().unwrap_or(*id))),
        ),
        PropertyValue::Array(items) => PropertyValue::Array(
            items
                .iter()
                .map(|item| remap_value(item, nodes, components))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Whether `value` has the shape `kind` declares.
fn value_fits(kind: &PropertyKind, value: &PropertyValue) -> bool {
    match (kind, value) {
        (PropertyKind::Enum(names), PropertyValue::Enum(index)) => *index < names.len(),
        (PropertyKind::Array(element), PropertyValue::Array(items)) => {
            items.iter().all(|item| value_fits(element, item))
        }
        (PropertyKind::Integer, PropertyValue::Integer(_))
        | (PropertyKind::Float, PropertyValue::Float(_))
        | (PropertyKind::Boolean, PropertyValue::Boolean(_))
        | (PropertyKind::String, PropertyValue::String(_))
        | (PropertyKind::Color, PropertyValue::Color(_))
        | (PropertyKind::Vector2, PropertyValue::Vector2(_))
        | (PropertyKind::Vector3, PropertyValue::Vector3(_))
        | (PropertyKind::Vector4, PropertyValue::Vector4(_))
        | (PropertyKind::Quaternion, PropertyValue::Quaternion(_))
        | (PropertyKind::Rect, PropertyValue::Rect(_))
        | (PropertyKind::Bounds, PropertyValue::Bounds(_))
        | (PropertyKind::Vector2Int, PropertyValue::Vector2Int(_))
        | (PropertyKind::Vector3Int, PropertyValue::Vector3Int(_))
        | (PropertyKind::RectInt, PropertyValue::RectInt(_))
        | (PropertyKind::BoundsInt, PropertyValue::BoundsInt(_))
        | (PropertyKind::ObjectReference, PropertyValue::Reference(_))
        | (PropertyKind::Unsupported(_), PropertyValue::Opaque(_)) => true,
        _ => false,
    }
}

fn parent_folder(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(folder, _)| folder)
}

fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

fn guid(path: &str) -> String {
    Sha256::digest(path.as_bytes())
        .iter()
        .take(16)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn identity_record(path: &str, asset_type: &str) -> IdentityRecord {
    IdentityRecord {
        name: file_stem(path).to_owned(),
        path: path.to_owned(),
        guid: guid(path),
        asset_type: Some(asset_type.to_owned()),
    }
}

impl ModelStore for MemoryStore {
    fn host_version(&self) -> String {
        concat!("scenewire-memory/", env!("CARGO_PKG_VERSION")).to_owned()
    }

    fn project_name(&self) -> String {
        self.project_name.clone()
    }

    fn find_root(&self, path: &str) -> Result<NodeId, StoreError> {
        self.containers
            .get(path)
            .copied()
            .ok_or_else(|| StoreError::not_found("prefab", path))
    }

    fn load_mutable_copy(&mut self, path: &str) -> Result<NodeId, StoreError> {
        let root = self.find_root(path)?;
        let copy = self.clone_tree(root)?;
        self.detached.insert(copy);
        Ok(copy)
    }

    fn save_copy(&mut self, root: NodeId, path: &str) -> Result<(), StoreError> {
        if self.node_data(root)?.parent.is_some() {
            return Err(StoreError::Rejected(format!(
                "{root} is not the root of a tree"
            )));
        }
        self.check_destination(path)?;
        let saved = self.clone_tree(root)?;
        if let Some(previous) = self.containers.insert(path.to_owned(), saved) {
            self.destroy_tree(previous);
        }
        self.stats.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self, root: NodeId) {
        if self.detached.remove(&root) {
            self.destroy_tree(root);
        }
    }

    fn create_root(&mut self, name: &str, primitive: Option<&str>) -> Result<NodeId, StoreError> {
        let root = self.new_node(name, None);
        self.detached.insert(root);
        if let Some(shape) = primitive
            && let Err(error) = self.seed_primitive(root, shape)
        {
            self.release(root);
            return Err(error);
        }
        Ok(root)
    }

    fn node(&self, node: NodeId) -> Result<NodeRecord, StoreError> {
        let data = self.node_data(node)?;
        Ok(NodeRecord {
            name: data.name.clone(),
            parent: data.parent,
            active: data.active,
            tag: data.tag.clone(),
            layer: data.layer,
        })
    }

    fn children(&self, node: NodeId) -> Result<Vec<(String, NodeId)>, StoreError> {
        let data = self.node_data(node)?;
        data.children
            .iter()
            .map(|child| Ok((self.node_data(*child)?.name.clone(), *child)))
            .collect()
    }

    fn components(&self, node: NodeId) -> Result<Vec<ComponentId>, StoreError> {
        Ok(self.node_data(node)?.components.clone())
    }

    fn component(&self, component: ComponentId) -> Result<ComponentRecord, StoreError> {
        let data = self.component_data(component)?;
        let schema = self.schema(data.schema)?;
        Ok(ComponentRecord {
            node: data.node,
            type_name: schema.name.clone(),
            full_type: schema.full_name(),
            enabled: data.enabled,
            implicit: schema.implicit,
        })
    }

    fn component_types(&self) -> Vec<ComponentType> {
        self.schemas
            .iter()
            .map(|schema| ComponentType {
                name: schema.name.clone(),
                full_name: schema.full_name(),
            })
            .collect()
    }

    fn add_component(&mut self, node: NodeId, full_type: &str) -> Result<ComponentId, StoreError> {
        let owner = self.node_data(node)?;
        let index = self
            .schema_index(full_type)
            .ok_or_else(|| StoreError::not_found("component type", full_type))?;
        let schema = self.schema(index)?;
        if schema.implicit {
            return Err(StoreError::Rejected(format!(
                "{} is present on every GameObject and cannot be added",
                schema.name
            )));
        }
        if schema.single
            && owner.components.iter().any(|component| {
                self.components
                    .get(component)
                    .is_some_and(|data| data.schema == index)
            })
        {
            return Err(StoreError::Rejected(format!(
                "'{}' already has a {} and allows only one",
                owner.name, schema.name
            )));
        }
        Ok(self.attach(node, index))
    }

    fn remove_component(&mut self, component: ComponentId) -> Result<(), StoreError> {
        let data = self.component_data(component)?;
        let schema = self.schema(data.schema)?;
        if schema.implicit {
            return Err(StoreError::Rejected(format!(
                "{} cannot be removed",
                schema.name
            )));
        }
        let node = data.node;
        if let Some(owner) = self.nodes.get_mut(&node) {
            owner.components.retain(|attached| *attached != component);
        }
        self.components.remove(&component);
        Ok(())
    }

    fn create_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError> {
        self.node_data(parent)?;
        Ok(self.new_node(name, Some(parent)))
    }

    fn destroy_subtree(&mut self, node: NodeId) -> Result<(), StoreError> {
        if self.node_data(node)?.parent.is_none() {
            return Err(StoreError::Rejected(
                "the root of a tree cannot be destroyed".to_owned(),
            ));
        }
        self.destroy_tree(node);
        Ok(())
    }

    fn enumerate_properties(
        &self,
        owner: &PropertyOwner,
    ) -> Result<Vec<PropertyDescriptor>, StoreError> {
        Ok(self
            .definitions(owner)?
            .iter()
            .map(|definition| descriptor(owner, definition))
            .collect())
    }

    fn find_property(
        &self,
        owner: &PropertyOwner,
        path: &str,
    ) -> Result<PropertyDescriptor, StoreError> {
        let definitions = self.definitions(owner)?;
        let prefixed = format!("m_{path}");
        definitions
            .iter()
            .find(|definition| definition.path == path)
            .or_else(|| {
                definitions
                    .iter()
                    .find(|definition| definition.path == prefixed)
            })
            .map(|definition| descriptor(owner, definition))
            .ok_or_else(|| StoreError::not_found("property", path))
    }

    fn read_value(&self, property: &PropertyDescriptor) -> Result<PropertyValue, StoreError> {
        let index = self.slot_index(property)?;
        let values = match &property.owner {
            PropertyOwner::Component(component) => &self.component_data(*component)?.values,
            PropertyOwner::Asset(path) => {
                &self
                    .assets
                    .get(path)
                    .ok_or_else(|| StoreError::not_found("asset", path.as_str()))?
                    .values
            }
        };
        values
            .get(index)
            .cloned()
            .ok_or_else(|| StoreError::not_found("property", property.path.as_str()))
    }

    fn write_value(
        &mut self,
        property: &PropertyDescriptor,
        value: PropertyValue,
    ) -> Result<(), StoreError> {
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
        let index = self.slot_index(property)?;
        let definition = self
            .definitions(&property.owner)?
            .get(index)
            .ok_or_else(|| StoreError::not_found("property", property.path.as_str()))?;
        if definition.read_only {
            return Err(StoreError::Rejected(format!(
                "property '{}' is read-only",
                property.path
            )));
        }
        if !value_fits(&definition.kind, &value) {
            return Err(StoreError::Rejected(format!(
                "value does not fit {} property '{}'",
                definition.kind.name(),
                property.path
            )));
        }
        let slot = self
            .values_mut(&property.owner)?
            .get_mut(index)
            .ok_or_else(|| StoreError::not_found("property", property.path.as_str()))?;
        *slot = value;
        Ok(())
    }

    fn search_by_path_prefix(
        &self,
        folder: &str,
        type_filter: Option<&str>,
    ) -> Vec<IdentityRecord> {
        let prefix = format!("{}/", folder.trim().trim_end_matches('/'));
        self.entries()
            .into_iter()
            .filter(|(path, asset_type)| {
                path.starts_with(&prefix)
                    && type_filter.is_none_or(|wanted| asset_type.eq_ignore_ascii_case(wanted))
            })
            .map(|(path, asset_type)| identity_record(path, asset_type))
            .collect()
    }

    fn search_by_name(&self, fragment: &str) -> Vec<IdentityRecord> {
        let wanted = fragment.trim().to_lowercase();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.entries()
            .into_iter()
            .filter(|(path, _)| file_name(path).to_lowercase().contains(&wanted))
            .map(|(path, asset_type)| identity_record(path, asset_type))
            .collect()
    }

    fn identity(&self, path: &str) -> Result<IdentityRecord, StoreError> {
        if self.containers.contains_key(path) {
            return Ok(identity_record(path, CONTAINER_TYPE));
        }
        self.assets
            .get(path)
            .map(|asset| identity_record(path, &asset.asset_type))
            .ok_or_else(|| StoreError::not_found("asset", path))
    }

    fn exists(&self, path: &str) -> bool {
        self.containers.contains_key(path) || self.assets.contains_key(path)
    }

    fn is_container(&self, path: &str) -> bool {
        self.containers.contains_key(path)
    }

    fn delete_container(&mut self, path: &str) -> Result<(), StoreError> {
        let root = self
            .containers
            .remove(path)
            .ok_or_else(|| StoreError::not_found("prefab", path))?;
        self.destroy_tree(root);
        Ok(())
    }

    fn copy_container(&mut self, source: &str, destination: &str) -> Result<(), StoreError> {
        let root = self.find_root(source)?;
        if self.exists(destination) {
            return Err(StoreError::already_exists("asset", destination));
        }
        self.check_destination(destination)?;
        let copy = self.clone_tree(root)?;
        self.containers.insert(destination.to_owned(), copy);
        self.stats.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn folder_exists(&self, path: &str) -> bool {
        self.folders.contains(path.trim().trim_end_matches('/'))
    }

    fn create_folder(&mut self, parent: &str, name: &str) -> Result<(), StoreError> {
        let parent_path = parent.trim().trim_end_matches('/');
        if !self.folders.contains(parent_path) {
            return Err(StoreError::not_found("folder", parent_path));
        }
        if name.trim().is_empty() || name.contains('/') {
            return Err(StoreError::Rejected(format!(
                "'{name}' is not a valid folder name"
            )));
        }
        self.folders.insert(format!("{parent_path}/{}", name.trim()));
        Ok(())
    }

    fn save_asset(&mut self, path: &str) -> Result<(), StoreError> {
        if !self.exists(path) {
            return Err(StoreError::not_found("asset", path));
        }
        self.stats.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn descriptor(owner: &PropertyOwner, definition: &PropertyDef) -> PropertyDescriptor {
    PropertyDescriptor {
        owner: owner.clone(),
        path: definition.path.clone(),
        display_name: definition.display_name(),
        kind: definition.kind.clone(),
        read_only: definition.read_only,
    }
}
