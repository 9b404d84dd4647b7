//! Command dispatch for request lines.
//!
//! A request line is decoded into a [`scenewire_protocol::Request`], the
//! command name is matched against the fixed catalog in [`Command`], and the
//! matching handler validates its parameters before submitting exactly one
//! unit of work to the executor. Whatever happens, the caller receives one
//! [`scenewire_protocol::Response`] carrying the request id.
//!
//! ## Protocol
//!
//! ```json
//! {"id":"7","command":"get_prefab","params":{"path":"Assets/Player.prefab","max_depth":1}}
//! ```
//!
//! ```json
//! {"id":"7","success":true,"data":{"name":"Player","path":"Player","children":[]},"error":null}
//! ```
//!
//! Validation failures never reach the model store: parameters are checked
//! on the connection's thread, and only a fully validated command is queued.

mod commands;
mod errors;
mod params;
mod router;

pub use self::errors::CommandError;
pub use self::router::{Command, CommandRouter};
