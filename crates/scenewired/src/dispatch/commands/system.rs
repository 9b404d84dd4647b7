//! `ping`.

use scenewire_protocol::PingInfo;

use super::execute;
use crate::dispatch::CommandError;
use crate::dispatch::params::Params;
use crate::executor::WorkQueue;

pub(crate) fn ping(_params: Params<'_>, queue: &WorkQueue) -> Result<serde_json::Value, CommandError> {
    execute(queue, |store| {
        Ok(PingInfo {
            message: "pong".to_owned(),
            host_version: store.host_version(),
            host_project_name: store.project_name(),
        })
    })
}
