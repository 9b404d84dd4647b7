//! `add_gameobject` and `remove_gameobject`.

use scenewire_protocol::RemovedRecord;

use super::{container_path, edit_container, execute};
use crate::dispatch::CommandError;
use crate::dispatch::params::Params;
use crate::executor::WorkQueue;
use crate::model::StoreError;
use crate::model::resolver::find_node;
use crate::model::snapshot::{SnapshotOptions, node_info};

const DEFAULT_NAME: &str = "New GameObject";

pub(crate) fn add(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let path = container_path(&params.required_str("path")?);
    let name = params
        .optional_str("name")?
        .unwrap_or_else(|| DEFAULT_NAME.to_owned());
    if name.contains('/') {
        return Err(CommandError::invalid("name", "must not contain '/'"));
    }
    let parent_path = params.optional_str("parent_path")?.unwrap_or_default();

    execute(queue, move |store| {
        edit_container(store, &path, |store, root| {
            let parent = find_node(store, root, &parent_path)?;
            let taken = store
                .children(parent)?
                .iter()
                .any(|(sibling, _)| *sibling == name);
            if taken {
                return Err(StoreError::already_exists("GameObject", name).into());
            }
            let child = store.create_child(parent, &name)?;
            node_info(
                store,
                root,
                child,
                SnapshotOptions {
                    max_depth: Some(0),
                    include_properties: false,
                },
            )
        })
    })
}

pub(crate) fn remove(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let path = container_path(&params.required_str("path")?);
    let node_path = params.required_str("gameobject_path")?;

    execute(queue, move |store| {
        edit_container(store, &path, |store, root| {
            let node = find_node(store, root, &node_path)?;
            if node == root {
                return Err(CommandError::invalid(
                    "gameobject_path",
                    "the root GameObject cannot be removed",
                ));
            }
            store.destroy_subtree(node)?;
            Ok(RemovedRecord { removed: true })
        })
    })
}
