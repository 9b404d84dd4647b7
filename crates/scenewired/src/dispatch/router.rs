//! Command catalog and request routing.
//!
//! Command names are matched case-insensitively against a fixed catalog.
//! Each command maps to a plain handler function; the router owns nothing
//! but the executor handle it lends to those functions.

use std::fmt;
use std::time::Instant;

use scenewire_protocol::{Request, Response};
use tracing::{debug, warn};

use super::commands::{self, Handler};
use super::errors::CommandError;
use super::params::Params;
use crate::executor::WorkQueue;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// The fixed command catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Liveness check with host details.
    Ping,
    /// Pages through stored prefabs.
    ListPrefabs,
    /// Pages through stored assets, optionally filtered by type.
    ListAssets,
    /// Creates and persists a new prefab.
    CreatePrefab,
    /// Deletes a stored prefab.
    DeletePrefab,
    /// Copies a stored prefab to a new path.
    DuplicatePrefab,
    /// Serializes a prefab's node tree.
    GetPrefab,
    /// Serializes one component with its properties.
    GetComponent,
    /// Attaches a component to a node.
    AddComponent,
    /// Detaches a component from a node.
    RemoveComponent,
    /// Creates a child node.
    AddGameObject,
    /// Destroys a node and its descendants.
    RemoveGameObject,
    /// Writes a component property.
    SetProperty,
    /// Writes an asset property.
    SetAssetProperty,
    /// Reads an asset with its properties.
    GetAsset,
}

impl Command {
    /// Every command in catalog order.
    pub const ALL: [Self; 15] = [
        Self::Ping,
        Self::ListPrefabs,
        Self::ListAssets,
        Self::CreatePrefab,
        Self::DeletePrefab,
        Self::DuplicatePrefab,
        Self::GetPrefab,
        Self::GetComponent,
        Self::AddComponent,
        Self::RemoveComponent,
        Self::AddGameObject,
        Self::RemoveGameObject,
        Self::SetProperty,
        Self::SetAssetProperty,
        Self::GetAsset,
    ];

    /// Parses a command name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for names outside the catalog.
    pub fn parse(name: &str) -> Result<Self, CommandError> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CommandError::UnknownCommand {
                name: wanted.to_owned(),
            })
    }

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::ListPrefabs => "list_prefabs",
            Self::ListAssets => "list_assets",
            Self::CreatePrefab => "create_prefab",
            Self::DeletePrefab => "delete_prefab",
            Self::DuplicatePrefab => "duplicate_prefab",
            Self::GetPrefab => "get_prefab",
            Self::GetComponent => "get_component",
            Self::AddComponent => "add_component",
            Self::RemoveComponent => "remove_component",
            Self::AddGameObject => "add_gameobject",
            Self::RemoveGameObject => "remove_gameobject",
            Self::SetProperty => "set_property",
            Self::SetAssetProperty => "set_asset_property",
            Self::GetAsset => "get_asset",
        }
    }

    /// Whether the command persists changes to the store.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        !matches!(
            self,
            Self::Ping
                | Self::ListPrefabs
                | Self::ListAssets
                | Self::GetPrefab
                | Self::GetComponent
                | Self::GetAsset
        )
    }

    const fn handler(self) -> Handler {
        match self {
            Self::Ping => commands::system::ping,
            Self::ListPrefabs => commands::listing::list_prefabs,
            Self::ListAssets => commands::listing::list_assets,
            Self::CreatePrefab => commands::prefabs::create,
            Self::DeletePrefab => commands::prefabs::delete,
            Self::DuplicatePrefab => commands::prefabs::duplicate,
            Self::GetPrefab => commands::prefabs::get,
            Self::GetComponent => commands::components::get,
            Self::AddComponent => commands::components::add,
            Self::RemoveComponent => commands::components::remove,
            Self::AddGameObject => commands::nodes::add,
            Self::RemoveGameObject => commands::nodes::remove,
            Self::SetProperty => commands::properties::set_component_property,
            Self::SetAssetProperty => commands::properties::set_asset_property,
            Self::GetAsset => commands::properties::get_asset,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes decoded requests to command handlers.
///
/// Cheap to clone; every connection holds its own copy sharing one executor
/// queue.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    queue: WorkQueue,
}

impl CommandRouter {
    /// Creates a router that submits work to `queue`.
    #[must_use]
    pub const fn new(queue: WorkQueue) -> Self {
        Self { queue }
    }

    /// Runs one request and returns its payload.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] produced by parsing the command name,
    /// validating parameters, or executing the unit of work.
    pub fn route(&self, request: &Request) -> Result<serde_json::Value, CommandError> {
        let command = Command::parse(&request.command)?;
        debug!(
            target: DISPATCH_TARGET,
            request_id = %request.id,
            command = command.as_str(),
            "routing command"
        );
        (command.handler())(Params::new(&request.params), &self.queue)
    }

    /// Runs one request and wraps the outcome in a response.
    #[must_use]
    pub fn respond(&self, request: &Request) -> Response {
        let started = Instant::now();
        match self.route(request) {
            Ok(data) => {
                debug!(
                    target: DISPATCH_TARGET,
                    request_id = %request.id,
                    command = %request.command,
                    elapsed_ms = started.elapsed().as_millis(),
                    "command succeeded"
                );
                Response::success(request.id.clone(), data)
            }
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    request_id = %request.id,
                    command = %request.command,
                    kind = error.kind(),
                    %error,
                    "command failed"
                );
                Response::failure(request.id.clone(), error.to_string())
            }
        }
    }

    /// Decodes and runs one request line.
    ///
    /// Malformed lines produce a failure carrying whatever id could be
    /// recovered, or an empty id.
    #[must_use]
    pub fn respond_line(&self, line: &str) -> Response {
        match Request::parse(line) {
            Ok(request) => self.respond(&request),
            Err(malformed) => {
                let error = CommandError::Protocol {
                    message: malformed.reason.clone(),
                };
                warn!(
                    target: DISPATCH_TARGET,
                    request_id = %malformed.id,
                    %error,
                    "malformed request"
                );
                Response::failure(malformed.id, error.to_string())
            }
        }
    }
}
