//! Response payload shapes.
//!
//! Every record here is a transient DTO built fresh per request. Field names
//! are encoded in camelCase.

use serde::{Deserialize, Serialize};

use crate::Value;

/// One node of an addressed tree.
///
/// Exactly one of [`NodeInfo::component_names`] and [`NodeInfo::components`]
/// is populated; the other is omitted from the encoded form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Node name.
    pub name: String,
    /// Slash-joined path below the addressed root; the root reports its own name.
    pub path: String,
    /// Store-assigned identifier, stable for the lifetime of the loaded copy.
    pub instance_id: i64,
    /// Whether the node itself is active.
    pub active_self: bool,
    /// Tag label.
    pub tag: String,
    /// Layer index.
    pub layer: i32,
    /// Component type names, excluding the implicit transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_names: Option<Vec<String>>,
    /// Full component detail, including the transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentInfo>>,
    /// Serialized children; empty when the depth limit was reached.
    pub children: Vec<NodeInfo>,
    /// Number of direct children regardless of the depth limit.
    pub child_count: usize,
}

/// A component with its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    /// Short type name, for example `BoxCollider`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Namespace-qualified type name.
    pub full_type: String,
    /// Store-assigned identifier.
    pub instance_id: i64,
    /// Whether the component is enabled.
    pub enabled: bool,
    /// Visible properties in declaration order.
    pub properties: Vec<PropertyInfo>,
}

/// One property slot of a component or asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    /// Display name.
    pub name: String,
    /// Property path used by `set_property`.
    pub path: String,
    /// Declared kind name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Current value; null for an unset reference.
    #[serde(default)]
    pub value: Value,
    /// Whether writes are refused.
    pub is_read_only: bool,
    /// Whether the slot holds a list.
    pub is_array: bool,
    /// Element count for list slots, zero otherwise.
    pub array_size: usize,
}

/// One page of an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPage<T> {
    /// Size of the whole collection.
    pub total: usize,
    /// Index of the first item in this page.
    pub offset: usize,
    /// Requested page size.
    pub limit: usize,
    /// Items in `[offset, offset + limit)`, clamped to `total`.
    pub items: Vec<T>,
}

impl<T> CollectionPage<T> {
    /// Slices `all` into a page, clamping the window to the available items.
    #[must_use]
    pub fn slice(all: Vec<T>, offset: usize, limit: usize) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            total,
            offset,
            limit,
            items,
        }
    }

    /// Returns `true` when items remain beyond this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.items.len()) < self.total
    }
}

/// Minimal reference to a persisted container or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// File stem.
    pub name: String,
    /// Store path, for example `Assets/Props/Crate.prefab`.
    pub path: String,
    /// Stable identifier derived from the path.
    pub guid: String,
    /// Asset type name, present in listings.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

/// An asset with its properties, returned by `get_asset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    /// File stem.
    pub name: String,
    /// Store path.
    pub path: String,
    /// Stable identifier.
    pub guid: String,
    /// Asset type name.
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Visible properties in declaration order.
    pub properties: Vec<PropertyInfo>,
}

/// Liveness answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingInfo {
    /// Fixed greeting.
    pub message: String,
    /// Version string reported by the model host.
    pub host_version: String,
    /// Project name reported by the model host.
    pub host_project_name: String,
}

/// Acknowledges a container deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRecord {
    /// Always `true`.
    pub deleted: bool,
    /// Path that was removed.
    pub path: String,
}

/// Acknowledges a node or component removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedRecord {
    /// Always `true`.
    pub removed: bool,
}

/// Acknowledges a property write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedRecord {
    /// Always `true`.
    pub modified: bool,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn leaf(name: &str) -> NodeInfo {
        NodeInfo {
            name: name.to_owned(),
            path: name.to_owned(),
            instance_id: 1,
            active_self: true,
            tag: "Untagged".to_owned(),
            layer: 0,
            component_names: Some(vec!["BoxCollider".to_owned()]),
            components: None,
            children: Vec::new(),
            child_count: 0,
        }
    }

    #[test]
    fn node_summary_omits_components() {
        let encoded = serde_json::to_value(leaf("Crate")).expect("encode");
        assert_eq!(
            encoded,
            json!({
                "name": "Crate",
                "path": "Crate",
                "instanceId": 1,
                "activeSelf": true,
                "tag": "Untagged",
                "layer": 0,
                "componentNames": ["BoxCollider"],
                "children": [],
                "childCount": 0
            })
        );
    }

    #[test]
    fn property_uses_type_key() {
        let property = PropertyInfo {
            name: "Size".to_owned(),
            path: "m_Size".to_owned(),
            type_name: "Vector3".to_owned(),
            value: Value::Vector3([1.0, 2.0, 3.0]),
            is_read_only: false,
            is_array: false,
            array_size: 0,
        };
        let encoded = serde_json::to_value(&property).expect("encode");
        assert_eq!(encoded["type"], json!("Vector3"));
        assert_eq!(encoded["value"], json!([1.0, 2.0, 3.0]));
        assert_eq!(encoded["isReadOnly"], json!(false));
    }

    #[rstest]
    #[case(0, 2, vec![0, 1], true)]
    #[case(2, 2, vec![2, 3], true)]
    #[case(4, 2, vec![4], false)]
    #[case(9, 2, vec![], false)]
    #[case(0, 0, vec![], true)]
    fn pages_clamp_to_available_items(
        #[case] offset: usize,
        #[case] limit: usize,
        #[case] expected: Vec<i32>,
        #[case] more: bool,
    ) {
        let page = CollectionPage::slice(vec![0, 1, 2, 3, 4], offset, limit);
        assert_eq!(page.total, 5);
        assert_eq!(page.items, expected);
        assert_eq!(page.has_more(), more);
    }

    #[test]
    fn concatenated_pages_cover_collection_once() {
        let all: Vec<u32> = (0..23).collect();
        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let page = CollectionPage::slice(all.clone(), offset, 5);
            seen.extend(page.items.iter().copied());
            if !page.has_more() {
                break;
            }
            offset += 5;
        }
        assert_eq!(seen, all);
    }

    #[test]
    fn identity_record_hides_absent_type() {
        let record = IdentityRecord {
            name: "A".to_owned(),
            path: "Assets/A.prefab".to_owned(),
            guid: "abc".to_owned(),
            asset_type: None,
        };
        assert_eq!(
            serde_json::to_value(record).expect("encode"),
            json!({"name": "A", "path": "Assets/A.prefab", "guid": "abc"})
        );
    }
}
