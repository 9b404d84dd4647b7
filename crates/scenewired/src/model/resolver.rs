//! Path addressing and reference resolution.
//!
//! Paths are slash-delimited chains of node names below a tree root, matched
//! case-sensitively one segment at a time. Reference text written into an
//! object-reference property is resolved against the tree being edited first
//! and the store second, in the order documented on [`resolve_reference`].

use super::{ComponentId, ComponentType, ModelStore, NodeId, ObjectRef};
use crate::dispatch::CommandError;

/// Folder prefix that marks a path as a stored asset rather than a node path.
pub const STORE_ROOT_PREFIX: &str = "Assets/";

/// Namespaces tried, in order, when a bare component type name is not found.
pub const NAMESPACE_PREFIXES: &[&str] = &[
    "UnityEngine.",
    "UnityEngine.UI.",
    "UnityEngine.Rendering.",
    "UnityEngine.AI.",
    "UnityEngine.Animations.",
];

/// Descends from `root` along `path`; an empty path addresses `root` itself.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] naming the full requested path when any
/// segment is missing.
pub fn find_node(store: &dyn ModelStore, root: NodeId, path: &str) -> Result<NodeId, CommandError> {
    let mut current = root;
    for segment in segments(path) {
        current = store
            .children(current)?
            .into_iter()
            .find_map(|(name, child)| (name == segment).then_some(child))
            .ok_or_else(|| CommandError::not_found("GameObject", path.trim()))?;
    }
    Ok(current)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Builds the path of `node` relative to `root`.
///
/// `root` reports its own name; descendants report the slash-joined names
/// from the first level below `root` down to themselves.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] when `node` is not inside `root`.
pub fn node_path(store: &dyn ModelStore, root: NodeId, node: NodeId) -> Result<String, CommandError> {
    if node == root {
        return Ok(store.node(root)?.name);
    }
    let mut names = Vec::new();
    let mut current = node;
    loop {
        let record = store.node(current)?;
        names.push(record.name);
        match record.parent {
            Some(parent) if parent == root => break,
            Some(parent) => current = parent,
            None => return Err(CommandError::not_found("GameObject", node.to_string())),
        }
    }
    names.reverse();
    Ok(names.join("/"))
}

/// Splits `path:Type` on the last colon.
///
/// Returns `None` when there is no colon or either side is blank.
#[must_use]
pub fn split_typed_reference(text: &str) -> Option<(&str, &str)> {
    let (path, type_name) = text.rsplit_once(':')?;
    let type_name = type_name.trim();
    (!type_name.is_empty() && !type_name.contains('/')).then_some((path.trim(), type_name))
}

/// Resolves a bare or qualified component type name against the catalog.
///
/// The name is tried as given, then under each of [`NAMESPACE_PREFIXES`],
/// then as a short name; the first hit wins.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] naming the requested type.
pub fn resolve_component_type(
    store: &dyn ModelStore,
    name: &str,
) -> Result<ComponentType, CommandError> {
    let wanted = name.trim();
    let catalog = store.component_types();
    let exact = |candidate: &str| {
        catalog
            .iter()
            .find(|entry| entry.full_name == candidate)
            .cloned()
    };
    exact(wanted)
        .or_else(|| {
            NAMESPACE_PREFIXES
                .iter()
                .find_map(|prefix| exact(&format!("{prefix}{wanted}")))
        })
        .or_else(|| catalog.iter().find(|entry| entry.name == wanted).cloned())
        .ok_or_else(|| CommandError::not_found("component type", wanted))
}

/// First component on `node` whose type matches `type_name`.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] when the type is unknown or the node
/// carries no component of it.
pub fn find_component(
    store: &dyn ModelStore,
    node: NodeId,
    type_name: &str,
) -> Result<ComponentId, CommandError> {
    let wanted = resolve_component_type(store, type_name)?;
    for component in store.components(node)? {
        if store.component(component)?.full_type == wanted.full_name {
            return Ok(component);
        }
    }
    let owner = store.node(node)?.name;
    Err(CommandError::not_found(
        "component",
        format!("{} on '{owner}'", wanted.name),
    ))
}

/// Resolves reference text written into an object-reference property.
///
/// `root` is the tree being edited, or `None` when the property belongs to a
/// stored asset. Resolution order:
///
/// 1. Blank text clears the reference.
/// 2. `path:Type` (split on the last colon) fetches component `Type` from
///    the node at `path` inside `root`.
/// 3. Text that does not start with [`STORE_ROOT_PREFIX`] is tried as a node
///    path inside `root`; empty text or the root's own name is the root.
/// 4. Otherwise, or when step 3 misses, the text is loaded as an exact store
///    path, then searched by name: no match is not found, one match wins,
///    several matches are ambiguous.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] or [`CommandError::AmbiguousReference`].
pub fn resolve_reference(
    store: &dyn ModelStore,
    root: Option<NodeId>,
    text: &str,
) -> Result<Option<ObjectRef>, CommandError> {
    let reference = text.trim();
    if reference.is_empty() {
        return Ok(None);
    }
    let looks_external = reference.starts_with(STORE_ROOT_PREFIX);

    if let Some(tree) = root
        && !looks_external
    {
        if let Some((path, type_name)) = split_typed_reference(reference) {
            let node = find_internal(store, tree, path)?
                .ok_or_else(|| CommandError::not_found("GameObject", path))?;
            return find_component(store, node, type_name)
                .map(|component| Some(ObjectRef::Component(component)));
        }
        if let Some(node) = find_internal(store, tree, reference)? {
            return Ok(Some(ObjectRef::Node(node)));
        }
    }

    if store.exists(reference) {
        return Ok(Some(ObjectRef::Asset(reference.to_owned())));
    }
    let mut matches = store.search_by_name(reference);
    match matches.len() {
        0 => Err(CommandError::not_found("object", reference)),
        1 => Ok(matches.pop().map(|record| ObjectRef::Asset(record.path))),
        count => Err(CommandError::AmbiguousReference {
            reference: reference.to_owned(),
            count,
        }),
    }
}

fn find_internal(
    store: &dyn ModelStore,
    root: NodeId,
    path: &str,
) -> Result<Option<NodeId>, CommandError> {
    let root_name = store.node(root)?.name;
    if path.is_empty() || path == root_name {
        return Ok(Some(root));
    }
    if let Ok(node) = find_node(store, root, path) {
        return Ok(Some(node));
    }
    let below_root = path
        .strip_prefix(root_name.as_str())
        .and_then(|rest| rest.strip_prefix('/'));
    Ok(below_root.and_then(|rest| find_node(store, root, rest).ok()))
}

/// Renders a reference for reads: node paths inside `root`, `path:Type` for
/// components, and store paths for assets.
#[must_use]
pub fn describe_reference(
    store: &dyn ModelStore,
    root: Option<NodeId>,
    target: &ObjectRef,
) -> Option<String> {
    match target {
        ObjectRef::Asset(path) => Some(path.clone()),
        ObjectRef::Node(node) => node_path(store, root?, *node).ok(),
        ObjectRef::Component(component) => {
            let record = store.component(*component).ok()?;
            let path = node_path(store, root?, record.node).ok()?;
            Some(format!("{path}:{}", record.type_name))
        }
    }
}

#[cfg(test)]
mod tests;
