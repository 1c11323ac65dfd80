//! Task search backed by the external document index. The index decides
//! which tasks match and reports the total, but the final page is re-fetched
//! from the relational store with the relational ORDER BY, so observable
//! ordering is identical to the database searcher's.

use std::sync::Arc;

use khipu_domain::{FilterNode, TaskSearchOptions};
use khipu_index::SearchParams;
use khipu_storage::{db::Db, models::Task};
use serde_json::Value;
use sqlx::QueryBuilder;

use crate::{
	BoxFuture, DocumentIndex, Error, Result, SearchResult, TaskSearcher,
	search::{
		filter::compile_index_filter,
		order::{db_order_by, index_sort_by, position_view_id},
	},
};

/// The document fields free text is matched against.
const INDEX_QUERY_FIELDS: &str = "title, identifier, description, comments.comment";

pub struct IndexTaskSearcher {
	db: Db,
	index: Arc<dyn DocumentIndex>,
	collection: String,
	max_per_page: i64,
}
impl IndexTaskSearcher {
	pub fn new(db: Db, index: Arc<dyn DocumentIndex>, collection: String, max_per_page: i64) -> Self {
		Self { db, index, collection, max_per_page }
	}

	async fn search_inner(&self, opts: &TaskSearchOptions) -> Result<SearchResult> {
		let params = SearchParams {
			q: if opts.search.is_empty() { "*".to_string() } else { opts.search.clone() },
			query_by: INDEX_QUERY_FIELDS.to_string(),
			filter_by: Some(build_filter_by(&opts.project_ids, &opts.filters)?),
			sort_by: index_sort_by(&opts.sort_by, opts.is_saved_filter)?,
			page: (opts.page > 0).then_some(opts.page),
			per_page: clamp_per_page(opts.per_page, self.max_per_page),
			exhaustive_search: true,
		};
		let outcome = self.index.search(&self.collection, &params).await?;
		let task_ids = outcome
			.hits
			.iter()
			.map(|hit| document_task_id(&hit.document))
			.collect::<Result<Vec<_>>>()?;

		if task_ids.is_empty() {
			return Ok((Vec::new(), outcome.found));
		}

		// Re-fetch through the relational store so the page comes back in
		// the relational sort order, position join included.
		let order_by = db_order_by(self.db.dialect(), &opts.sort_by)?;
		let position_view = position_view_id(&opts.sort_by);
		let mut builder = QueryBuilder::new("SELECT DISTINCT tasks.*");

		if position_view.is_some() {
			builder.push(", task_positions.position");
		}

		builder.push(" FROM tasks");

		if let Some(view_id) = position_view {
			builder
				.push(
					" LEFT JOIN task_positions ON task_positions.task_id = tasks.id AND task_positions.project_view_id = ",
				)
				.push_bind(view_id);
		}

		builder.push(" WHERE tasks.id = ANY(").push_bind(task_ids).push(")");

		if !order_by.is_empty() {
			builder.push(" ORDER BY ");
			builder.push(&order_by);
		}

		let tasks: Vec<Task> = builder.build_query_as().fetch_all(&self.db.pool).await?;

		// The index's total stands as-is; it may diverge from what a
		// relational count would say and that is accepted.
		Ok((tasks, outcome.found))
	}
}
impl TaskSearcher for IndexTaskSearcher {
	fn search<'a>(&'a self, opts: &'a TaskSearchOptions) -> BoxFuture<'a, Result<SearchResult>> {
		Box::pin(self.search_inner(opts))
	}
}

/// The mandatory project-scope clause, ANDed with the compiled user filter
/// when one exists.
fn build_filter_by(project_ids: &[i64], filters: &[FilterNode]) -> Result<String> {
	let ids =
		project_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
	let mut filter_by = format!("project_id: [{ids}]");

	if let Some(filter) = compile_index_filter(filters)? {
		filter_by.push_str(&format!(" && ({filter})"));
	}

	Ok(filter_by)
}

fn clamp_per_page(per_page: i64, max_per_page: i64) -> Option<i64> {
	if per_page <= 0 {
		return None;
	}

	if per_page > max_per_page {
		tracing::warn!(
			requested = per_page,
			max = max_per_page,
			"Clamping page size to the index service's maximum.",
		);

		return Some(max_per_page);
	}

	Some(per_page)
}

/// Documents carry their id as a string; anything non-numeric is a fatal
/// parse error rather than a silently dropped hit.
fn document_task_id(document: &Value) -> Result<i64> {
	let raw = document
		.get("id")
		.and_then(Value::as_str)
		.ok_or_else(|| Error::MalformedIndexResult(document.get("id").cloned().unwrap_or(Value::Null).to_string()))?;

	raw.parse().map_err(|_| Error::MalformedIndexResult(raw.to_string()))
}
