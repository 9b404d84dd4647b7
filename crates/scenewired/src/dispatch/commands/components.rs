//! `get_component`, `add_component`, and `remove_component`.

use scenewire_protocol::RemovedRecord;

use super::{container_path, edit_container, execute, select_component};
use crate::dispatch::CommandError;
use crate::dispatch::params::{ComponentSelector, Params};
use crate::executor::WorkQueue;
use crate::model::resolver::{find_node, resolve_component_type};
use crate::model::snapshot::component_info;

struct Target {
    path: String,
    node_path: String,
}

impl Target {
    fn parse(params: Params<'_>) -> Result<Self, CommandError> {
        Ok(Self {
            path: container_path(&params.required_str("path")?),
            node_path: params.optional_str("gameobject_path")?.unwrap_or_default(),
        })
    }
}

pub(crate) fn get(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let target = Target::parse(params)?;
    let selector = params.component_selector()?;
    execute(queue, move |store| {
        let root = store.find_root(&target.path)?;
        let node = find_node(store, root, &target.node_path)?;
        let component = select_component(store, node, &selector)?;
        component_info(store, Some(root), component)
    })
}

pub(crate) fn add(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let target = Target::parse(params)?;
    let type_name = params.required_str("component_type")?;
    execute(queue, move |store| {
        edit_container(store, &target.path, |store, root| {
            let node = find_node(store, root, &target.node_path)?;
            let component_type = resolve_component_type(store, &type_name)?;
            let component = store.add_component(node, &component_type.full_name)?;
            component_info(store, Some(root), component)
        })
    })
}

pub(crate) fn remove(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let target = Target::parse(params)?;
    let selector = ComponentSelector::Type(params.required_str("component_type")?);
    execute(queue, move |store| {
        edit_container(store, &target.path, |store, root| {
            let node = find_node(store, root, &target.node_path)?;
            let component = select_component(store, node, &selector)?;
            let record = store.component(component)?;
            if record.implicit {
                return Err(CommandError::invalid(
                    "component_type",
                    format!("the {} component cannot be removed", record.type_name),
                ));
            }
            store.remove_component(component)?;
            Ok(RemovedRecord { removed: true })
        })
    })
}
