//! `list_prefabs` and `list_assets`.
//!
//! Both page through the store's path-ordered index below a folder. The
//! window `[offset, offset + limit)` is clamped to what exists, so walking
//! pages of a static store yields every entry exactly once.

use scenewire_protocol::{CollectionPage, IdentityRecord};

use super::{execute, folder_path};
use crate::dispatch::CommandError;
use crate::dispatch::params::Params;
use crate::executor::WorkQueue;
use crate::model::ModelStore;

const DEFAULT_LIMIT: usize = 100;
const PREFAB_TYPE: &str = "Prefab";

struct ListArgs {
    folder: String,
    type_filter: Option<String>,
    offset: usize,
    limit: usize,
}

impl ListArgs {
    fn parse(params: Params<'_>, type_filter: Option<String>) -> Result<Self, CommandError> {
        Ok(Self {
            folder: folder_path(params.optional_str("folder")?.as_deref()),
            type_filter,
            offset: params.optional_usize("offset", 0)?,
            limit: params.optional_usize("limit", DEFAULT_LIMIT)?,
        })
    }

    fn run(self, store: &dyn ModelStore) -> Result<CollectionPage<IdentityRecord>, CommandError> {
        if !store.folder_exists(&self.folder) {
            return Err(CommandError::not_found("folder", self.folder));
        }
        let entries = store.search_by_path_prefix(&self.folder, self.type_filter.as_deref());
        Ok(CollectionPage::slice(entries, self.offset, self.limit))
    }
}

pub(crate) fn list_prefabs(
    params: Params<'_>,
    queue: &WorkQueue,
) -> Result<serde_json::Value, CommandError> {
    let args = ListArgs::parse(params, Some(PREFAB_TYPE.to_owned()))?;
    execute(queue, move |store| args.run(store))
}

pub(crate) fn list_assets(
    params: Params<'_>,
    queue: &WorkQueue,
) -> Result<serde_json::Value, CommandError> {
    let args = ListArgs::parse(params, params.optional_str("type")?)?;
    execute(queue, move |store| args.run(store))
}
