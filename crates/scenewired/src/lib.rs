//! Line-delimited JSON command server for a live scene model.
//!
//! `scenewired` lets out-of-process tools inspect and edit a scene/asset
//! model over a loopback TCP socket. Each connection sends one JSON request
//! per line and receives exactly one JSON response line back:
//!
//! ```text
//! {"id":"7","command":"get_prefab","params":{"path":"Prefabs/Player","max_depth":1}}
//! {"id":"7","success":true,"data":{"name":"Player",...},"error":null}
//! ```
//!
//! Connections are served concurrently, but the model itself is never
//! touched from a connection thread. Every command becomes a unit of work on
//! the [`executor`] queue, which the host drains from its designated thread
//! once per tick. The model is reached only through the [`model::ModelStore`]
//! trait; [`model::memory::MemoryStore`] is the in-process reference store
//! used by the binary and the tests.
//!
//! The main pieces are:
//!
//! - [`Server`] binds loopback, accepts, and runs one read loop per
//!   connection with a request size limit.
//! - [`dispatch`] decodes requests, validates parameters, and maps command
//!   names to handlers.
//! - [`model::resolver`] resolves slash paths, `path:Type` component
//!   references, and asset references.
//! - [`model::value`] converts between wire values and typed property slots.

pub mod dispatch;
pub mod executor;
pub mod health;
pub mod model;
mod process;
mod server;
pub mod telemetry;
mod transport;

pub use dispatch::{Command, CommandError, CommandRouter};
pub use executor::{MainContext, Pending, WorkQueue, run_until};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, run_server, run_with};
pub use server::{Server, ServerError};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
