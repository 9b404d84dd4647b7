//! Property writes on components and assets, and `get_asset`.
//!
//! A write looks the slot up by path, refuses read-only slots before the
//! store's write path is ever reached, converts the wire value against the
//! slot's declared kind, and only then writes and persists.

use scenewire_protocol::{AssetInfo, ModifiedRecord, Value};

use super::{asset_path, container_path, edit_container, execute, select_component};
use crate::dispatch::CommandError;
use crate::dispatch::params::{ComponentSelector, Params};
use crate::executor::WorkQueue;
use crate::model::resolver::{find_node, resolve_reference};
use crate::model::snapshot::property_infos;
use crate::model::value::from_wire;
use crate::model::{ModelStore, NodeId, PropertyOwner};

struct ComponentWrite {
    path: String,
    node_path: String,
    selector: ComponentSelector,
    property_path: String,
    value: Value,
}

struct AssetWrite {
    path: String,
    property_path: String,
    value: Value,
}

pub(crate) fn set_component_property(
    params: Params<'_>,
    queue: &WorkQueue,
) -> Result<serde_json::Value, CommandError> {
    let write = ComponentWrite {
        path: container_path(&params.required_str("path")?),
        node_path: params.optional_str("gameobject_path")?.unwrap_or_default(),
        selector: params.component_selector()?,
        property_path: params.required_str("property_path")?,
        value: params.required_value("value")?,
    };
    execute(queue, move |store| {
        edit_container(store, &write.path, |store, root| {
            let node = find_node(store, root, &write.node_path)?;
            let component = select_component(store, node, &write.selector)?;
            assign(
                store,
                Some(root),
                &PropertyOwner::Component(component),
                &write.property_path,
                &write.value,
            )?;
            Ok(ModifiedRecord { modified: true })
        })
    })
}

pub(crate) fn set_asset_property(
    params: Params<'_>,
    queue: &WorkQueue,
) -> Result<serde_json::Value, CommandError> {
    let write = AssetWrite {
        path: asset_path(&params.required_str("path")?),
        property_path: params.required_str("property_path")?,
        value: params.required_value("value")?,
    };
    execute(queue, move |store| {
        if !store.exists(&write.path) {
            return Err(CommandError::not_found("asset", write.path));
        }
        let owner = PropertyOwner::Asset(write.path.clone());
        assign(store, None, &owner, &write.property_path, &write.value)?;
        store.save_asset(&write.path)?;
        Ok(ModifiedRecord { modified: true })
    })
}

pub(crate) fn get_asset(params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    let path = asset_path(&params.required_str("path")?);
    execute(queue, move |store| {
        let identity = store.identity(&path)?;
        let properties = property_infos(store, None, &PropertyOwner::Asset(path))?;
        Ok(AssetInfo {
            name: identity.name,
            path: identity.path,
            guid: identity.guid,
            asset_type: identity.asset_type.unwrap_or_default(),
            properties,
        })
    })
}

/// Converts `value` against the slot at `property_path` and writes it.
///
/// `root` scopes internal references; asset slots pass `None`.
fn assign(
    store: &mut dyn ModelStore,
    root: Option<NodeId>,
    owner: &PropertyOwner,
    property_path: &str,
    value: &Value,
) -> Result<(), CommandError> {
    let descriptor = store.find_property(owner, property_path)?;
    if descriptor.read_only {
        return Err(CommandError::ReadOnly {
            path: descriptor.path,
        });
    }
    let native = {
        let reader: &dyn ModelStore = &*store;
        let mut resolve = |text: &str| resolve_reference(reader, root, text);
        from_wire(&descriptor, value, &mut resolve)?
    };
    store.write_value(&descriptor, native)?;
    Ok(())
}
