//! Tree and component snapshots for responses.

use scenewire_protocol::{ComponentInfo, NodeInfo, PropertyInfo};

use super::resolver::{describe_reference, node_path};
use super::value::to_wire;
use super::{
    ComponentId, ModelStore, NodeId, ObjectRef, PropertyDescriptor, PropertyOwner, PropertyValue,
};
use crate::dispatch::CommandError;

/// Controls how much of a tree a snapshot includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotOptions {
    /// Levels of descendants to include below the focus; `None` is unlimited.
    pub max_depth: Option<usize>,
    /// Whether the focus node carries full component detail.
    pub include_properties: bool,
}

/// Serializes `focus` and its descendants.
///
/// Paths are relative to `root`. Only the focus node receives full component
/// detail, and only when requested; every other node lists component names.
///
/// # Errors
///
/// Propagates store failures.
pub fn node_info(
    store: &dyn ModelStore,
    root: NodeId,
    focus: NodeId,
    options: SnapshotOptions,
) -> Result<NodeInfo, CommandError> {
    let path = node_path(store, root, focus)?;
    let walker = Walker {
        store,
        root,
        options,
    };
    walker.visit(focus, path, 0)
}

struct Walker<'a> {
    store: &'a dyn ModelStore,
    root: NodeId,
    options: SnapshotOptions,
}

impl Walker<'_> {
    fn visit(&self, node: NodeId, path: String, depth: usize) -> Result<NodeInfo, CommandError> {
        let record = self.store.node(node)?;
        let children = self.store.children(node)?;
        let detailed = depth == 0 && self.options.include_properties;

        let (component_names, components) = if detailed {
            let mut detail = Vec::new();
            for component in self.store.components(node)? {
                detail.push(component_info(self.store, Some(self.root), component)?);
            }
            (None, Some(detail))
        } else {
            (Some(self.component_names(node)?), None)
        };

        let within_limit = self.options.max_depth.is_none_or(|limit| depth < limit);
        let mut child_infos = Vec::new();
        if within_limit {
            for (name, child) in &children {
                let child_path = if node == self.root {
                    name.clone()
                } else {
                    format!("{path}/{name}")
                };
                child_infos.push(self.visit(*child, child_path, depth.saturating_add(1))?);
            }
        }

        Ok(NodeInfo {
            name: record.name,
            path,
            instance_id: node.raw(),
            active_self: record.active,
            tag: record.tag,
            layer: record.layer,
            component_names,
            components,
            child_count: children.len(),
            children: child_infos,
        })
    }

    fn component_names(&self, node: NodeId) -> Result<Vec<String>, CommandError> {
        let mut names = Vec::new();
        for component in self.store.components(node)? {
            let record = self.store.component(component)?;
            if !record.implicit {
                names.push(record.type_name);
            }
        }
        Ok(names)
    }
}

/// Serializes one component with all of its properties.
///
/// `root` scopes how internal references are rendered.
///
/// # Errors
///
/// Propagates store failures.
pub fn component_info(
    store: &dyn ModelStore,
    root: Option<NodeId>,
    component: ComponentId,
) -> Result<ComponentInfo, CommandError> {
    let record = store.component(component)?;
    let properties = property_infos(store, root, &PropertyOwner::Component(component))?;
    Ok(ComponentInfo {
        type_name: record.type_name,
        full_type: record.full_type,
        instance_id: component.raw(),
        enabled: record.enabled,
        properties,
    })
}

/// Serializes every visible property of a component or asset.
///
/// # Errors
///
/// Propagates store failures.
pub fn property_infos(
    store: &dyn ModelStore,
    root: Option<NodeId>,
    owner: &PropertyOwner,
) -> Result<Vec<PropertyInfo>, CommandError> {
    store
        .enumerate_properties(owner)?
        .iter()
        .map(|descriptor| property_info(store, root, descriptor))
        .collect()
}

fn property_info(
    store: &dyn ModelStore,
    root: Option<NodeId>,
    descriptor: &PropertyDescriptor,
) -> Result<PropertyInfo, CommandError> {
    let native = store.read_value(descriptor)?;
    let array_size = match &native {
        PropertyValue::Array(items) => items.len(),
        _ => 0,
    };
    let describe = |target: &ObjectRef| describe_reference(store, root, target);
    Ok(PropertyInfo {
        name: descriptor.display_name.clone(),
        path: descriptor.path.clone(),
        type_name: descriptor.kind.name(),
        value: to_wire(&descriptor.kind, &native, &describe),
        is_read_only: descriptor.read_only,
        is_array: descriptor.is_array(),
        array_size,
    })
}
