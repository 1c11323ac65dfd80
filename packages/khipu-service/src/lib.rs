pub mod positions;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use positions::{POSITION_SPAN, PositionManager, REBALANCE_THRESHOLD};
pub use search::{db::DbTaskSearcher, index::IndexTaskSearcher};

use std::{future::Future, pin::Pin, sync::Arc};

use khipu_domain::{Actor, TaskSearchOptions};
use khipu_index::{IndexClient, SearchOutcome, SearchParams};
use khipu_storage::{
	db::Db,
	models::{Task, TaskPosition},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One page of matching tasks plus the total match count.
pub type SearchResult = (Vec<Task>, i64);

/// The single capability both search backends implement. Which one backs
/// a deployment is decided at construction time by configuration, never by
/// inspecting the request.
pub trait TaskSearcher: Send + Sync {
	fn search<'a>(&'a self, opts: &'a TaskSearchOptions) -> BoxFuture<'a, Result<SearchResult>>;
}

/// Expands one project selector (including pseudo-projects and saved
/// filters) into the concrete project ids the actor may read.
pub trait ProjectResolver: Send + Sync {
	fn resolve<'a>(
		&'a self,
		db: &'a Db,
		actor: Actor,
		project_id: i64,
	) -> BoxFuture<'a, Result<Vec<i64>>>;
}

/// Fire-and-forget event delivery; transport and retries are the bus's
/// problem, not this core's.
pub trait EventSink: Send + Sync {
	fn publish(&self, event: Event);
}

/// External document-search service, injected so the index searcher can be
/// exercised without network access.
pub trait DocumentIndex: Send + Sync {
	fn search<'a>(
		&'a self,
		collection: &'a str,
		params: &'a SearchParams,
	) -> BoxFuture<'a, khipu_index::Result<SearchOutcome>>;
}
impl DocumentIndex for IndexClient {
	fn search<'a>(
		&'a self,
		collection: &'a str,
		params: &'a SearchParams,
	) -> BoxFuture<'a, khipu_index::Result<SearchOutcome>> {
		Box::pin(IndexClient::search(self, collection, params))
	}
}

#[derive(Debug, Clone)]
pub struct TaskPositionsRecalculatedEvent {
	pub new_positions: Vec<TaskPosition>,
}

#[derive(Debug, Clone)]
pub enum Event {
	TaskUpdated { task_id: i64 },
	TaskPositionsRecalculated(TaskPositionsRecalculatedEvent),
}

/// Builds the searcher the configuration asks for.
pub fn new_task_searcher(cfg: &khipu_config::Config, db: Db) -> Result<Arc<dyn TaskSearcher>> {
	match cfg.search.backend.as_str() {
		"index" => {
			let Some(index_cfg) = cfg.storage.index.as_ref() else {
				return Err(Error::Configuration(
					"storage.index must be configured for the index search backend.".to_string(),
				));
			};
			let client = IndexClient::new(index_cfg)?;

			Ok(Arc::new(IndexTaskSearcher::new(
				db,
				Arc::new(client),
				index_cfg.collection.clone(),
				index_cfg.max_per_page,
			)))
		},
		_ => Ok(Arc::new(DbTaskSearcher::new(db))),
	}
}
