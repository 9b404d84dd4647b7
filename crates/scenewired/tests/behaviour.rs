//! Behavioural scenarios driven through a real client connection.

mod support;

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use scenewire_client::{Client, ClientError};
use scenewire_protocol::Value;

use support::{PLAYER, TestServer, text};

#[derive(Default)]
struct ServerWorld {
    server: Option<TestServer>,
    client: Option<Client>,
    submitted_before: u64,
    root: Option<serde_json::Value>,
    outcome: Option<Result<serde_json::Value, String>>,
}

impl ServerWorld {
    fn call(
        &mut self,
        command: &str,
        params: Vec<(&str, Value)>,
    ) -> Result<serde_json::Value, String> {
        let client = self.client.as_mut().expect("server should be running");
        client.call(command, params).map_err(|error| match error {
            ClientError::Command { message, .. } => message,
            other => panic!("transport failure: {other}"),
        })
    }

    fn server(&self) -> &TestServer {
        self.server.as_ref().expect("server should be running")
    }

    fn failure(&self) -> String {
        match self.outcome.as_ref() {
            Some(Err(message)) => message.clone(),
            other => panic!("expected a failed request, got {other:?}"),
        }
    }

    fn clip(&mut self) -> serde_json::Value {
        let audio = self
            .call(
                "get_component",
                vec![
                    ("path", text(PLAYER)),
                    ("gameobject_path", text("Main Camera")),
                    ("component_type", text("AudioSource")),
                ],
            )
            .expect("audio source");
        audio["properties"][0]["value"].clone()
    }
}

#[fixture]
fn world() -> RefCell<ServerWorld> {
    RefCell::new(ServerWorld::default())
}

#[given("a running command server with the sample project")]
fn given_running_server(world: &RefCell<ServerWorld>) {
    let server = TestServer::start();
    let mut world = world.borrow_mut();
    world.client = Some(server.client());
    world.submitted_before = server.submitted();
    world.server = Some(server);
}

#[given("the camera of \"{path}\" has an AudioSource")]
fn given_audio_source(world: &RefCell<ServerWorld>, path: String) {
    world
        .borrow_mut()
        .call(
            "add_component",
            vec![
                ("path", text(&path)),
                ("gameobject_path", text("Main Camera")),
                ("component_type", text("AudioSource")),
            ],
        )
        .expect("add audio source");
}

#[when("the client creates the prefab \"{path}\"")]
fn when_create_prefab(world: &RefCell<ServerWorld>, path: String) {
    world
        .borrow_mut()
        .call("create_prefab", vec![("path", text(&path))])
        .expect("create prefab");
}

#[when("the client adds a GameObject named \"{name}\" to \"{path}\"")]
fn when_add_gameobject(world: &RefCell<ServerWorld>, name: String, path: String) {
    world
        .borrow_mut()
        .call("add_gameobject", vec![("path", text(&path)), ("name", text(&name))])
        .expect("add GameObject");
}

#[when("the client reads \"{path}\" with max depth {depth}")]
fn when_read_prefab(world: &RefCell<ServerWorld>, path: String, depth: i64) {
    let mut world = world.borrow_mut();
    let root = world
        .call("get_prefab", vec![("path", text(&path)), ("max_depth", Value::Integer(depth))])
        .expect("read prefab");
    world.root = Some(root);
}

#[when("the client sends \"{command}\" without parameters")]
fn when_send_bare(world: &RefCell<ServerWorld>, command: String) {
    let mut world = world.borrow_mut();
    let outcome = world.call(&command, Vec::new());
    world.outcome = Some(outcome);
}

#[when("the client sets \"{property}\" on the asset \"{path}\" to \"{value}\"")]
fn when_set_asset_property(
    world: &RefCell<ServerWorld>,
    property: String,
    path: String,
    value: String,
) {
    let mut world = world.borrow_mut();
    let outcome = world.call(
        "set_asset_property",
        vec![
            ("path", text(&path)),
            ("property_path", text(&property)),
            ("value", Value::sniff(&value)),
        ],
    );
    world.outcome = Some(outcome);
}

#[when("the client points the audio clip at \"{reference}\"")]
fn when_point_clip(world: &RefCell<ServerWorld>, reference: String) {
    let mut world = world.borrow_mut();
    let outcome = world.call(
        "set_property",
        vec![
            ("path", text(PLAYER)),
            ("gameobject_path", text("Main Camera")),
            ("component_type", text("AudioSource")),
            ("property_path", text("m_audioClip")),
            ("value", text(&reference)),
        ],
    );
    world.outcome = Some(outcome);
}

#[then("the root is named \"{name}\"")]
fn then_root_named(world: &RefCell<ServerWorld>, name: String) {
    let world = world.borrow();
    assert_eq!(world.root.as_ref().expect("root")["name"], name.as_str());
}

#[then("the root reports {count} child")]
fn then_child_count(world: &RefCell<ServerWorld>, count: u64) {
    let world = world.borrow();
    assert_eq!(world.root.as_ref().expect("root")["childCount"], count);
}

#[then("the first child is named \"{name}\"")]
fn then_first_child_named(world: &RefCell<ServerWorld>, name: String) {
    let world = world.borrow();
    assert_eq!(world.root.as_ref().expect("root")["children"][0]["name"], name.as_str());
}

#[then("the first child is not expanded")]
fn then_first_child_leaf(world: &RefCell<ServerWorld>) {
    let world = world.borrow();
    let child = &world.root.as_ref().expect("root")["children"][0];
    assert_eq!(child["children"], serde_json::json!([]));
    assert_eq!(child["childCount"], 0);
}

#[then("the request fails mentioning \"{fragment}\"")]
fn then_fails_mentioning(world: &RefCell<ServerWorld>, fragment: String) {
    let message = world.borrow().failure();
    assert!(message.contains(&fragment), "{message}");
}

#[then("the request fails with \"{message}\"")]
fn then_fails_with(world: &RefCell<ServerWorld>, message: String) {
    assert_eq!(world.borrow().failure(), message);
}

#[then("no work reached the model store")]
fn then_nothing_submitted(world: &RefCell<ServerWorld>) {
    let world = world.borrow();
    assert_eq!(world.server().submitted(), world.submitted_before);
}

#[then("the model store saw no writes")]
fn then_no_writes(world: &RefCell<ServerWorld>) {
    assert_eq!(world.borrow().server().stats().writes(), 0);
}

#[then("the audio clip reads \"{expected}\"")]
fn then_clip_reads(world: &RefCell<ServerWorld>, expected: String) {
    assert_eq!(world.borrow_mut().clip(), expected.as_str());
}

#[scenario(path = "tests/features/prefab_editing.feature")]
fn prefab_editing(#[from(world)] world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/request_validation.feature")]
fn request_validation(#[from(world)] world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/asset_references.feature")]
fn asset_references(#[from(world)] world: RefCell<ServerWorld>) {
    drop(world);
}
