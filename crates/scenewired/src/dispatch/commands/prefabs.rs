//! Whole-prefab commands: create, delete, duplicate, and get.

use scenewire_protocol::DeletedRecord;

use super::{container_path, ensure_parent_folders, execute, file_stem};
use crate::dispatch::CommandError;
use crate::dispatch::params::Params;
use crate::executor::WorkQueue;
use crate::model::StoreError;
use crate::model::resolver::find_node;
use crate::model::snapshot::{SnapshotOptions, node_info};

pub(crate) fn create(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let path = container_path(&params.required_str("path")?);
    let name = params
        .optional_str("name")?
        .unwrap_or_else(|| file_stem(&path).to_owned());
    let primitive = params.optional_str("primitive")?;

    execute(queue, move |store| {
        if store.exists(&path) {
            return Err(StoreError::already_exists("prefab", path).into());
        }
        ensure_parent_folders(store, &path)?;
        let root = store.create_root(&name, primitive.as_deref())?;
        let saved = store.save_copy(root, &path);
        store.release(root);
        saved?;
        Ok(store.identity(&path)?)
    })
}

pub(crate) fn delete(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let path = container_path(&params.required_str("path")?);
    execute(queue, move |store| {
        if !store.is_container(&path) {
            return Err(CommandError::not_found("prefab", path));
        }
        store.delete_container(&path)?;
        Ok(DeletedRecord {
            deleted: true,
            path,
        })
    })
}

pub(crate) fn duplicate(
    params: Params<'_>,
    queue: &WorkQueue,
) -> Result<serde_json::Value, CommandError> {
    let source = container_path(&params.required_str("source_path")?);
    let destination = container_path(&params.required_str("dest_path")?);
    execute(queue, move |store| {
        if !store.is_container(&source) {
            return Err(CommandError::not_found("prefab", source));
        }
        if store.exists(&destination) {
            return Err(StoreError::already_exists("prefab", destination).into());
        }
        ensure_parent_folders(store, &destination)?;
        store.copy_container(&source, &destination)?;
        Ok(store.identity(&destination)?)
    })
}

pub(crate) fn get(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let path = container_path(&params.required_str("path")?);
    let focus = params.optional_str("gameobject_path")?.unwrap_or_default();
    let options = SnapshotOptions {
        max_depth: params.optional_depth("max_depth")?,
        include_properties: params.optional_bool("include_properties", false)?,
    };
    execute(queue, move |store| {
        let root = store.find_root(&path)?;
        let node = find_node(store, root, &focus)?;
        node_info(store, root, node, options)
    })
}
