//! Command handlers.
//!
//! Every handler has the same shape: read and validate its parameters on
//! the calling thread, submit one unit of work that performs the load,
//! mutate or read, and persist sequence, then encode the unit's result.

pub(super) mod components;
pub(super) mod listing;
pub(super) mod nodes;
pub(super) mod prefabs;
pub(super) mod properties;
pub(super) mod system;

use serde::Serialize;

use super::errors::CommandError;
use super::params::{ComponentSelector, Params};
use crate::executor::WorkQueue;
use crate::model::resolver::{STORE_ROOT_PREFIX, find_component};
use crate::model::{ComponentId, ModelStore, NodeId};

/// Signature shared by every command handler.
pub(crate) type Handler =
    fn(Params<'_>, &WorkQueue) -> Result<serde_json::Value, CommandError>;

const CONTAINER_EXTENSION: &str = ".prefab";
const ROOT_FOLDER: &str = "Assets";

/// Submits `unit` and blocks until it has run, then encodes its result.
fn execute<T, F>(queue: &WorkQueue, unit: F) -> Result<serde_json::Value, CommandError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&mut dyn ModelStore) -> Result<T, CommandError> + Send + 'static,
{
    let record = queue.submit(unit).wait()?;
    serde_json::to_value(record).map_err(|error| CommandError::internal(error.to_string()))
}

/// Loads an editable copy of `path`, applies `edit`, and saves the copy back.
///
/// The copy is released whether or not the edit or the save succeeds. A
/// failed save is reported but the store keeps whatever the edit changed in
/// its own bookkeeping.
fn edit_container<T>(
    store: &mut dyn ModelStore,
    path: &str,
    edit: impl FnOnce(&mut dyn ModelStore, NodeId) -> Result<T, CommandError>,
) -> Result<T, CommandError> {
    let root = store.load_mutable_copy(path)?;
    let outcome = edit(&mut *store, root).and_then(|value| {
        store.save_copy(root, path)?;
        Ok(value)
    });
    store.release(root);
    outcome
}

/// Picks one component on `node`.
fn select_component(
    store: &dyn ModelStore,
    node: NodeId,
    selector: &ComponentSelector,
) -> Result<ComponentId, CommandError> {
    match selector {
        ComponentSelector::Type(type_name) => find_component(store, node, type_name),
        ComponentSelector::Index(index) => store
            .components(node)?
            .get(*index)
            .copied()
            .ok_or_else(|| {
                CommandError::not_found("component", format!("index {index}"))
            }),
    }
}

/// Store path of a prefab, adding the root folder and extension when absent.
pub(crate) fn container_path(raw: &str) -> String {
    let mut path = asset_path(raw);
    if !path.to_ascii_lowercase().ends_with(CONTAINER_EXTENSION) {
        path.push_str(CONTAINER_EXTENSION);
    }
    path
}

/// Store path of an asset, adding the root folder when absent.
pub(crate) fn asset_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.starts_with(STORE_ROOT_PREFIX) {
        trimmed.to_owned()
    } else {
        format!("{STORE_ROOT_PREFIX}{trimmed}")
    }
}

/// Store path of a folder, without a trailing slash.
pub(crate) fn folder_path(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim().trim_matches('/');
    if trimmed.is_empty() || trimmed == ROOT_FOLDER {
        ROOT_FOLDER.to_owned()
    } else {
        asset_path(trimmed)
    }
}

/// Creates every missing folder between the root folder and `path`'s parent.
fn ensure_parent_folders(store: &mut dyn ModelStore, path: &str) -> Result<(), CommandError> {
    let Some((parent, _)) = path.rsplit_once('/') else {
        return Ok(());
    };
    let mut current = String::new();
    for segment in parent.split('/').filter(|segment| !segment.is_empty()) {
        if current.is_empty() {
            current.push_str(segment);
            continue;
        }
        let candidate = format!("{current}/{segment}");
        if !store.folder_exists(&candidate) {
            store.create_folder(&current, segment)?;
        }
        current = candidate;
    }
    Ok(())
}

/// File stem of a store path.
fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}
