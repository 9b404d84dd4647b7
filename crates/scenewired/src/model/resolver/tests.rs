//! Addressing and reference resolution tests against the sample project.

use rstest::{fixture, rstest};

use super::*;
use crate::model::memory::MemoryStore;

struct Loaded {
    store: MemoryStore,
    root: NodeId,
}

#[fixture]
fn loaded() -> Loaded {
    let mut store = MemoryStore::sample_project().expect("sample project");
    let root = store
        .load_mutable_copy("Assets/Prefabs/Player.prefab")
        .expect("copy");
    Loaded { store, root }
}

#[rstest]
#[case("")]
#[case("Body")]
#[case("Body/LeftArm")]
#[case("/Body/RightArm/")]
fn forward_addressing_round_trips_through_node_path(loaded: Loaded, #[case] path: &str) {
    let node = find_node(&loaded.store, loaded.root, path).expect("node");
    let rendered = node_path(&loaded.store, loaded.root, node).expect("path");
    let expected = if path.is_empty() {
        "Player".to_owned()
    } else {
        path.trim_matches('/').to_owned()
    };
    assert_eq!(rendered, expected);
}

#[rstest]
fn missing_segment_names_full_path(loaded: Loaded) {
    let error = find_node(&loaded.store, loaded.root, "Body/Tail/Tip").expect_err("missing");
    assert_eq!(error, CommandError::not_found("GameObject", "Body/Tail/Tip"));
}

#[rstest]
fn addressing_is_case_sensitive(loaded: Loaded) {
    assert!(find_node(&loaded.store, loaded.root, "body").is_err());
}

#[rstest]
#[case("Body/LeftArm:BoxCollider", Some(("Body/LeftArm", "BoxCollider")))]
#[case("a:b:Camera", Some(("a:b", "Camera")))]
#[case("Body", None)]
#[case("Body:", None)]
#[case("C:/Windows/Thing", None)]
fn typed_references_split_on_last_colon(
    #[case] text: &str,
    #[case] expected: Option<(&str, &str)>,
) {
    assert_eq!(split_typed_reference(text), expected);
}

#[rstest]
#[case("BoxCollider", "UnityEngine.BoxCollider")]
#[case("UnityEngine.Camera", "UnityEngine.Camera")]
#[case("Image", "UnityEngine.UI.Image")]
#[case("Tilemap", "UnityEngine.Tilemaps.Tilemap")]
fn component_types_resolve_through_namespaces(
    loaded: Loaded,
    #[case] name: &str,
    #[case] full_name: &str,
) {
    let resolved = resolve_component_type(&loaded.store, name).expect("type");
    assert_eq!(resolved.full_name, full_name);
}

#[rstest]
fn unknown_component_type_names_request(loaded: Loaded) {
    let error = resolve_component_type(&loaded.store, "Teleporter").expect_err("unknown");
    assert_eq!(error.to_string(), "component type not found: Teleporter");
}

#[rstest]
fn typed_reference_fetches_component(loaded: Loaded) {
    let target = resolve_reference(&loaded.store, Some(loaded.root), "Body/LeftArm:BoxCollider")
        .expect("resolve")
        .expect("set");
    let ObjectRef::Component(component) = target else {
        panic!("expected a component reference, got {target:?}");
    };
    let described = describe_reference(
        &loaded.store,
        Some(loaded.root),
        &ObjectRef::Component(component),
    );
    assert_eq!(described.as_deref(), Some("Body/LeftArm:BoxCollider"));
}

#[rstest]
#[case("")]
#[case("Player")]
fn empty_or_root_name_means_root(loaded: Loaded, #[case] text: &str) {
    if text.is_empty() {
        assert_eq!(
            resolve_reference(&loaded.store, Some(loaded.root), text).expect("resolve"),
            None
        );
    } else {
        assert_eq!(
            resolve_reference(&loaded.store, Some(loaded.root), text).expect("resolve"),
            Some(ObjectRef::Node(loaded.root))
        );
    }
}

#[rstest]
fn blank_reference_clears(loaded: Loaded) {
    assert_eq!(
        resolve_reference(&loaded.store, Some(loaded.root), "   ").expect("resolve"),
        None
    );
}

#[rstest]
fn internal_paths_win_over_store_names(mut loaded: Loaded) {
    loaded
        .store
        .insert_asset("Assets/Textures/Body.png", "Texture2D");
    let body = find_node(&loaded.store, loaded.root, "Body").expect("body");
    assert_eq!(
        resolve_reference(&loaded.store, Some(loaded.root), "Body").expect("resolve"),
        Some(ObjectRef::Node(body))
    );
    assert_eq!(
        resolve_reference(&loaded.store, None, "Body").expect("resolve"),
        Some(ObjectRef::Asset("Assets/Textures/Body.png".to_owned()))
    );
}

#[rstest]
fn store_prefix_skips_internal_lookup(loaded: Loaded) {
    assert_eq!(
        resolve_reference(&loaded.store, Some(loaded.root), "Assets/Materials/Red.mat")
            .expect("resolve"),
        Some(ObjectRef::Asset("Assets/Materials/Red.mat".to_owned()))
    );
}

#[rstest]
fn unique_name_match_resolves(loaded: Loaded) {
    assert_eq!(
        resolve_reference(&loaded.store, Some(loaded.root), "Bouncy").expect("resolve"),
        Some(ObjectRef::Asset(
            "Assets/Physics/Bouncy.physicMaterial".to_owned()
        ))
    );
}

#[rstest]
fn several_name_matches_are_ambiguous(loaded: Loaded) {
    let error =
        resolve_reference(&loaded.store, Some(loaded.root), "Metal").expect_err("ambiguous");
    assert_eq!(
        error,
        CommandError::AmbiguousReference {
            reference: "Metal".to_owned(),
            count: 2,
        }
    );
    assert!(error.to_string().contains("2 matches"));
    assert!(error.to_string().contains("fully qualified"));
}

#[rstest]
fn no_match_is_not_found(loaded: Loaded) {
    let error =
        resolve_reference(&loaded.store, Some(loaded.root), "Unicorn").expect_err("missing");
    assert_eq!(error.kind(), "not_found");
}
