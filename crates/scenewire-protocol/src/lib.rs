//! Wire types shared by the scenewire server and its clients.
//!
//! Every message is one JSON object per `\n`-terminated UTF-8 line. Clients
//! send a [`Request`]; the server answers each with exactly one [`Response`]
//! echoing the request id. Response payloads are the record types in
//! [`records`], and property values travel as the flat [`Value`] variant.

pub mod records;
mod request;
mod response;
mod value;

pub use records::{
    AssetInfo, CollectionPage, ComponentInfo, DeletedRecord, IdentityRecord, ModifiedRecord,
    NodeInfo, PingInfo, PropertyInfo, RemovedRecord,
};
pub use request::{MalformedRequest, Request};
pub use response::Response;
pub use value::Value;
