//! Built-in component and asset schemas for [`super::MemoryStore`].

use crate::model::{ObjectRef, PropertyKind, PropertyValue};

/// Path of the mesh assets that primitive shapes reference.
pub const BUILTIN_MESH_FOLDER: &str = "Builtin/Meshes";

/// Path of the material every new renderer starts with.
pub const DEFAULT_MATERIAL: &str = "Builtin/Default-Material.mat";

/// One property slot of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Property path.
    pub path: String,
    /// Declared kind.
    pub kind: PropertyKind,
    /// Whether writes are refused.
    pub read_only: bool,
    /// Value of a freshly created slot.
    pub default: PropertyValue,
}

impl PropertyDef {
    /// Builds a writable slot.
    pub fn new(path: impl Into<String>, kind: PropertyKind, default: PropertyValue) -> Self {
        Self {
            path: path.into(),
            kind,
            read_only: false,
            default,
        }
    }

    /// Marks the slot read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Human-readable name: `m_LocalScale` becomes `Local Scale`.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

/// A component type known to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSchema {
    /// Short type name.
    pub name: String,
    /// Namespace, empty for global types.
    pub namespace: String,
    /// Transform-like component carried by every node.
    pub implicit: bool,
    /// At most one instance per node.
    pub single: bool,
    /// Slots in declaration order.
    pub properties: Vec<PropertyDef>,
}

impl ComponentSchema {
    /// Builds a schema for `namespace.name`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            implicit: false,
            single: false,
            properties: Vec::new(),
        }
    }

    /// Namespace-qualified type name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Appends a slot.
    #[must_use]
    pub fn with(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Allows only one instance per node.
    #[must_use]
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    fn implicit(mut self) -> Self {
        self.implicit = true;
        self.single = true;
        self
    }
}

fn display_name(path: &str) -> String {
    let bare = path
        .strip_prefix("m_")
        .or_else(|| path.strip_prefix('_'))
        .unwrap_or(path);
    let mut out = String::with_capacity(bare.len().saturating_add(4));
    let mut previous: Option<char> = None;
    for ch in bare.chars() {
        if let Some(prev) = previous
            && ch.is_uppercase()
            && (prev.is_lowercase() || prev.is_ascii_digit())
        {
            out.push(' ');
        }
        if previous.is_none() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        previous = Some(ch);
    }
    out
}

fn names(members: &[&str]) -> PropertyKind {
    PropertyKind::Enum(members.iter().map(|member| (*member).to_owned()).collect())
}

fn float(path: &str, value: f64) -> PropertyDef {
    PropertyDef::new(path, PropertyKind::Float, PropertyValue::Float(value))
}

fn integer(path: &str, value: i64) -> PropertyDef {
    PropertyDef::new(path, PropertyKind::Integer, PropertyValue::Integer(value))
}

fn flag(path: &str, value: bool) -> PropertyDef {
    PropertyDef::new(path, PropertyKind::Boolean, PropertyValue::Boolean(value))
}

fn choice(path: &str, members: &[&str], index: usize) -> PropertyDef {
    PropertyDef::new(path, names(members), PropertyValue::Enum(index))
}

fn vector3(path: &str, value: [f32; 3]) -> PropertyDef {
    PropertyDef::new(path, PropertyKind::Vector3, PropertyValue::Vector3(value))
}

fn vector2(path: &str, value: [f32; 2]) -> PropertyDef {
    PropertyDef::new(path, PropertyKind::Vector2, PropertyValue::Vector2(value))
}

fn color(path: &str, value: [f32; 4]) -> PropertyDef {
    PropertyDef::new(path, PropertyKind::Color, PropertyValue::Color(value))
}

fn reference(path: &str) -> PropertyDef {
    PropertyDef::new(
        path,
        PropertyKind::ObjectReference,
        PropertyValue::Reference(None),
    )
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

fn transform_slots(schema: ComponentSchema) -> ComponentSchema {
    schema
        .with(vector3("m_LocalPosition", [0.0; 3]))
        .with(PropertyDef::new(
            "m_LocalRotation",
            PropertyKind::Quaternion,
            PropertyValue::Quaternion([0.0, 0.0, 0.0, 1.0]),
        ))
        .with(vector3("m_LocalScale", [1.0; 3]))
}

fn collider(name: &str) -> ComponentSchema {
    ComponentSchema::new("UnityEngine", name)
        .with(flag("m_IsTrigger", false))
        .with(reference("m_Material"))
}

/// Component types every [`super::MemoryStore`] starts with.
#[must_use]
pub fn builtin_components() -> Vec<ComponentSchema> {
    vec![
        transform_slots(ComponentSchema::new("UnityEngine", "Transform")).implicit(),
        transform_slots(ComponentSchema::new("UnityEngine", "RectTransform"))
            .with(vector2("m_AnchorMin", [0.5, 0.5]))
            .with(vector2("m_AnchorMax", [0.5, 0.5]))
            .with(vector2("m_AnchoredPosition", [0.0, 0.0]))
            .with(vector2("m_SizeDelta", [100.0, 100.0]))
            .with(vector2("m_Pivot", [0.5, 0.5]))
            .implicit(),
        ComponentSchema::new("UnityEngine", "MeshFilter")
            .with(reference("m_Mesh"))
            .with(integer("m_VertexCount", 0).read_only())
            .single(),
        ComponentSchema::new("UnityEngine", "MeshRenderer")
            .with(PropertyDef::new(
                "m_Materials",
                PropertyKind::Array(Box::new(PropertyKind::ObjectReference)),
                PropertyValue::Array(vec![PropertyValue::Reference(Some(ObjectRef::Asset(
                    DEFAULT_MATERIAL.to_owned(),
                )))]),
            ))
            .with(choice(
                "m_CastShadows",
                &["Off", "On", "TwoSided", "ShadowsOnly"],
                1,
            ))
            .with(flag("m_ReceiveShadows", true))
            .with(integer("m_SortingOrder", 0))
            .single(),
        ComponentSchema::new("UnityEngine", "SkinnedMeshRenderer")
            .with(reference("m_Mesh"))
            .with(PropertyDef::new(
                "m_AABB",
                PropertyKind::Bounds,
                PropertyValue::Bounds([0.0, 0.0, 0.0, 0.5, 0.5, 0.5]),
            ))
            .with(choice("m_Quality", &["Auto", "Bone1", "Bone2", "Bone4"], 0))
            .with(flag("m_UpdateWhenOffscreen", false))
            .single(),
        collider("BoxCollider")
            .with(vector3("m_Center", [0.0; 3]))
            .with(vector3("m_Size", [1.0; 3])),
        collider("SphereCollider")
            .with(vector3("m_Center", [0.0; 3]))
            .with(float("m_Radius", 0.5)),
        collider("CapsuleCollider")
            .with(vector3("m_Center", [0.0; 3]))
            .with(float("m_Radius", 0.5))
            .with(float("m_Height", 2.0))
            .with(choice("m_Direction", &["X-Axis", "Y-Axis", "Z-Axis"], 1)),
        collider("MeshCollider")
            .with(flag("m_Convex", false))
            .with(reference("m_Mesh")),
        ComponentSchema::new("UnityEngine", "Rigidbody")
            .with(float("m_Mass", 1.0))
            .with(float("m_Drag", 0.0))
            .with(float("m_AngularDrag", 0.05))
            .with(flag("m_UseGravity", true))
            .with(flag("m_IsKinematic", false))
            .with(choice(
                "m_Interpolate",
                &["None", "Interpolate", "Extrapolate"],
                0,
            ))
            .with(choice(
                "m_CollisionDetection",
                &[
                    "Discrete",
                    "Continuous",
                    "ContinuousDynamic",
                    "ContinuousSpeculative",
                ],
                0,
            ))
            .with(integer("m_Constraints", 0))
            .single(),
        ComponentSchema::new("UnityEngine", "Light")
            .with(choice("m_Type", &["Spot", "Directional", "Point", "Area"], 2))
            .with(color("m_Color", WHITE))
            .with(float("m_Intensity", 1.0))
            .with(float("m_Range", 10.0))
            .with(float("m_SpotAngle", 30.0))
            .with(choice("m_Shadows", &["None", "Hard", "Soft"], 0))
            .single(),
        ComponentSchema::new("UnityEngine", "Camera")
            .with(choice(
                "m_ClearFlags",
                &["Skybox", "SolidColor", "Depth", "Nothing"],
                0,
            ))
            .with(color("m_BackGroundColor", [0.192, 0.302, 0.475, 0.0]))
            .with(PropertyDef::new(
                "m_NormalizedViewPortRect",
                PropertyKind::Rect,
                PropertyValue::Rect([0.0, 0.0, 1.0, 1.0]),
            ))
            .with(float("m_FieldOfView", 60.0))
            .with(float("m_NearClipPlane", 0.3))
            .with(float("m_FarClipPlane", 1000.0))
            .with(flag("m_Orthographic", false))
            .with(float("m_OrthographicSize", 5.0))
            .with(float("m_Depth", 0.0))
            .with(reference("m_TargetTexture"))
            .single(),
        ComponentSchema::new("UnityEngine", "SpriteRenderer")
            .with(reference("m_Sprite"))
            .with(color("m_Color", WHITE))
            .with(flag("m_FlipX", false))
            .with(flag("m_FlipY", false))
            .with(choice("m_DrawMode", &["Simple", "Sliced", "Tiled"], 0))
            .with(vector2("m_Size", [1.0, 1.0]))
            .with(integer("m_SortingOrder", 0))
            .single(),
        ComponentSchema::new("UnityEngine", "AudioSource")
            .with(reference("m_audioClip"))
            .with(flag("m_PlayOnAwake", true))
            .with(float("m_Volume", 1.0))
            .with(float("m_Pitch", 1.0))
            .with(flag("Loop", false))
            .with(flag("Mute", false))
            .with(integer("Priority", 128))
            .with(PropertyDef::new(
                "rolloffCustomCurve",
                PropertyKind::Unsupported("AnimationCurve".to_owned()),
                PropertyValue::Opaque("AnimationCurve(2 keys)".to_owned()),
            )),
        ComponentSchema::new("UnityEngine.Tilemaps", "Tilemap")
            .with(PropertyDef::new(
                "m_Origin",
                PropertyKind::Vector3Int,
                PropertyValue::Vector3Int([0, 0, 0]),
            ))
            .with(PropertyDef::new(
                "m_Size",
                PropertyKind::Vector3Int,
                PropertyValue::Vector3Int([0, 0, 1]),
            ))
            .with(vector3("m_TileAnchor", [0.5, 0.5, 0.0]))
            .with(PropertyDef::new(
                "m_ChunkSize",
                PropertyKind::Vector2Int,
                PropertyValue::Vector2Int([32, 32]),
            ))
            .with(PropertyDef::new(
                "m_PaintRect",
                PropertyKind::RectInt,
                PropertyValue::RectInt([0, 0, 16, 16]),
            ))
            .with(PropertyDef::new(
                "m_PreviewBounds",
                PropertyKind::BoundsInt,
                PropertyValue::BoundsInt([0, 0, 0, 16, 16, 1]),
            ))
            .with(color("m_Color", WHITE))
            .with(
                PropertyDef::new(
                    "m_CellBounds",
                    PropertyKind::BoundsInt,
                    PropertyValue::BoundsInt([0, 0, 0, 0, 0, 1]),
                )
                .read_only(),
            )
            .single(),
        ComponentSchema::new("UnityEngine.UI", "Image")
            .with(reference("m_Sprite"))
            .with(color("m_Color", WHITE))
            .with(flag("m_RaycastTarget", true))
            .with(choice(
                "m_Type",
                &["Simple", "Sliced", "Tiled", "Filled"],
                0,
            ))
            .with(flag("m_PreserveAspect", false))
            .with(float("m_FillAmount", 1.0))
            .single(),
    ]
}

/// Slots of a stored asset of `asset_type`; unknown types have none.
#[must_use]
pub fn asset_properties(asset_type: &str) -> Vec<PropertyDef> {
    match asset_type {
        "Material" => vec![
            reference("m_Shader"),
            color("_Color", WHITE),
            reference("_MainTex"),
            PropertyDef::new(
                "_MainTex_ST",
                PropertyKind::Vector4,
                PropertyValue::Vector4([1.0, 1.0, 0.0, 0.0]),
            ),
            float("_Glossiness", 0.5),
            float("_Metallic", 0.0),
            integer("m_CustomRenderQueue", -1),
            flag("m_EnableInstancingVariants", false),
        ],
        "PhysicMaterial" => vec![
            float("dynamicFriction", 0.6),
            float("staticFriction", 0.6),
            float("bounciness", 0.0),
            choice(
                "frictionCombine",
                &["Average", "Minimum", "Multiply", "Maximum"],
                0,
            ),
            choice(
                "bounceCombine",
                &["Average", "Minimum", "Multiply", "Maximum"],
                0,
            ),
        ],
        "Texture2D" => vec![
            integer("m_Width", 256).read_only(),
            integer("m_Height", 256).read_only(),
            choice("m_FilterMode", &["Point", "Bilinear", "Trilinear"], 1),
            choice("m_WrapMode", &["Repeat", "Clamp", "Mirror", "MirrorOnce"], 0),
            integer("m_Aniso", 1),
        ],
        "Sprite" => vec![
            PropertyDef::new(
                "m_Rect",
                PropertyKind::Rect,
                PropertyValue::Rect([0.0, 0.0, 256.0, 256.0]),
            ),
            vector2("m_Pivot", [0.5, 0.5]),
            PropertyDef::new(
                "m_Border",
                PropertyKind::Vector4,
                PropertyValue::Vector4([0.0; 4]),
            ),
            float("m_PixelsToUnits", 100.0),
        ],
        "Mesh" => vec![
            integer("m_VertexCount", 24).read_only(),
            PropertyDef::new(
                "m_LocalAABB",
                PropertyKind::Bounds,
                PropertyValue::Bounds([0.0, 0.0, 0.0, 0.5, 0.5, 0.5]),
            )
            .read_only(),
        ],
        "AudioClip" => vec![
            float("m_Length", 1.0).read_only(),
            flag("m_LoadInBackground", false),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("m_LocalScale", "Local Scale")]
    #[case("_MainTex_ST", "Main Tex_ST")]
    #[case("m_audioClip", "Audio Clip")]
    #[case("dynamicFriction", "Dynamic Friction")]
    #[case("Loop", "Loop")]
    fn display_names_strip_prefix_and_split_words(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(display_name(path), expected);
    }

    #[test]
    fn every_builtin_has_unique_full_name() {
        let schemas = builtin_components();
        let mut names: Vec<String> = schemas.iter().map(ComponentSchema::full_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), schemas.len());
    }

    #[test]
    fn defaults_match_declared_kinds() {
        for schema in builtin_components() {
            for property in &schema.properties {
                assert!(
                    super::super::value_fits(&property.kind, &property.default),
                    "{} {} default does not fit its kind",
                    schema.name,
                    property.path
                );
            }
        }
    }
}
