//! Task search against the relational store. One composed predicate drives
//! both the page query and the total count, so the two stay logically
//! consistent modulo concurrent writes between them.

use std::collections::HashSet;

use khipu_domain::{ExpandMode, TaskSearchOptions};
use khipu_storage::{
	db::{Db, Dialect},
	models::{FAVORITE_KIND_TASK, RelationKind, Task},
	relations,
};
use sqlx::QueryBuilder;

use crate::{
	BoxFuture, Result, SearchResult, TaskSearcher,
	search::{
		filter::compile_db_filter,
		limit_offset,
		order::{db_order_by, position_view_id},
		sql::{SqlBind, SqlCond, and_all},
		task_index_from_search,
	},
};

pub struct DbTaskSearcher {
	db: Db,
}
impl DbTaskSearcher {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	async fn search_inner(&self, opts: &TaskSearchOptions) -> Result<SearchResult> {
		let dialect = self.db.dialect();
		let order_by = db_order_by(dialect, &opts.sort_by)?;
		let position_view = position_view_id(&opts.sort_by);
		let join_buckets = opts.filters.iter().any(|node| node.references_field("bucket_id"));
		let expand_subtasks = opts.expand == ExpandMode::Subtasks;
		let filter_cond = compile_db_filter(dialect, &opts.filters, opts.filter_include_nulls)?;
		let where_cond = and_all(vec![
			membership_cond(opts),
			text_cond(dialect, opts),
			filter_cond,
			// Restrict the primary page to top-level tasks; subtasks are
			// appended after the page is fetched.
			expand_subtasks.then(|| SqlCond::new("task_relations.id IS NULL", Vec::new())),
		]);

		tracing::debug!(
			projects = opts.project_ids.len(),
			favorites = opts.has_favorites_project,
			join_buckets,
			expand_subtasks,
			"Composed relational task search."
		);

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

		push_aux_joins(&mut builder, join_buckets, expand_subtasks);

		if let Some(cond) = &where_cond {
			builder.push(" WHERE ");
			cond.push_onto(&mut builder);
		}

		if !order_by.is_empty() {
			builder.push(" ORDER BY ");
			builder.push(&order_by);
		}

		if let Some((limit, offset)) = limit_offset(opts.page, opts.per_page) {
			builder.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
		}

		let mut tasks: Vec<Task> = builder.build_query_as().fetch_all(&self.db.pool).await?;

		if expand_subtasks {
			let subtasks = self.subtask_closure(&tasks).await?;

			tasks.extend(subtasks);
		}

		// The count never includes the subtask expansion.
		let mut count_builder = QueryBuilder::new("SELECT COUNT(DISTINCT tasks.id) FROM tasks");

		push_aux_joins(&mut count_builder, join_buckets, expand_subtasks);

		if let Some(cond) = &where_cond {
			count_builder.push(" WHERE ");
			cond.push_onto(&mut count_builder);
		}

		let total: i64 = count_builder.build_query_scalar().fetch_one(&self.db.pool).await?;

		Ok((tasks, total))
	}

	/// Walks the transitive closure of subtask edges seeded from the page's
	/// tasks and fetches the discovered task rows. The visited set guards
	/// against relation cycles; a task already on the page is not fetched
	/// again.
	async fn subtask_closure(&self, tasks: &[Task]) -> Result<Vec<Task>> {
		let mut visited: HashSet<i64> = tasks.iter().map(|task| task.id).collect();
		let mut frontier: Vec<i64> = tasks.iter().map(|task| task.id).collect();
		let mut collected = Vec::new();

		while !frontier.is_empty() {
			let next = relations::related_task_ids(&self.db, &frontier, RelationKind::Subtask)
				.await?;

			frontier = next.into_iter().filter(|id| visited.insert(*id)).collect();
			collected.extend_from_slice(&frontier);
		}

		if collected.is_empty() {
			return Ok(Vec::new());
		}

		let subtasks = sqlx::query_as("SELECT * FROM tasks WHERE id = ANY($1)")
			.bind(collected)
			.fetch_all(&self.db.pool)
			.await?;

		Ok(subtasks)
	}
}
impl TaskSearcher for DbTaskSearcher {
	fn search<'a>(&'a self, opts: &'a TaskSearchOptions) -> BoxFuture<'a, Result<SearchResult>> {
		Box::pin(self.search_inner(opts))
	}
}

fn push_aux_joins(
	builder: &mut QueryBuilder<'_, sqlx::Postgres>,
	join_buckets: bool,
	expand_subtasks: bool,
) {
	if join_buckets {
		builder.push(" LEFT JOIN task_buckets ON task_buckets.task_id = tasks.id");
	}
	if expand_subtasks {
		builder.push(
			" LEFT JOIN task_relations ON tasks.id = task_relations.task_id AND task_relations.relation_kind = 'parenttask'",
		);
	}
}

/// Project membership OR, for a favorites-scoped request, membership in the
/// actor's task favorites. Absent entirely when neither applies.
fn membership_cond(opts: &TaskSearchOptions) -> Option<SqlCond> {
	let project_cond = (!opts.project_ids.is_empty()).then(|| {
		let markers = vec!["?"; opts.project_ids.len()].join(", ");
		let binds = opts.project_ids.iter().map(|id| SqlBind::Int(*id)).collect();

		SqlCond::new(format!("tasks.project_id IN ({markers})"), binds)
	});
	let favorites_cond = opts.has_favorites_project.then(|| {
		SqlCond::new(
			"tasks.id IN (SELECT entity_id FROM favorites WHERE user_id = ? AND kind = ?)",
			vec![SqlBind::Int(opts.actor.id), SqlBind::Text(FAVORITE_KIND_TASK.to_string())],
		)
	});

	match (project_cond, favorites_cond) {
		(Some(project), Some(favorites)) => Some(project.or(favorites)),
		(cond, None) | (None, cond) => cond,
	}
}

/// Case-insensitive substring match on title or description, widened with an
/// exact display-index match when the search text looks like one.
fn text_cond(dialect: Dialect, opts: &TaskSearchOptions) -> Option<SqlCond> {
	if opts.search.is_empty() {
		return None;
	}

	// Postgres has ILIKE; the other engines get the portable spelling.
	let matches = |column: &str| match dialect {
		Dialect::Postgres => format!("{column} ILIKE ?"),
		Dialect::Mysql | Dialect::Sqlite => format!("UPPER({column}) LIKE UPPER(?)"),
	};
	let pattern = format!("%{}%", opts.search);
	let mut cond = SqlCond::new(
		format!("({} OR {})", matches("tasks.title"), matches("tasks.description")),
		vec![SqlBind::Text(pattern.clone()), SqlBind::Text(pattern)],
	);

	if let Some(index) = task_index_from_search(&opts.search) {
		cond = cond.or(SqlCond::new(
			format!("tasks.{} = ?", dialect.quote("index")),
			vec![SqlBind::Int(index)],
		));
	}

	Some(cond)
}

#[cfg(test)]
mod tests {
	use khipu_domain::Actor;

	use super::*;

	#[test]
	fn membership_combines_projects_and_favorites() {
		let opts = TaskSearchOptions {
			actor: Actor { id: 9 },
			project_ids: vec![1, 2],
			has_favorites_project: true,
			..TaskSearchOptions::default()
		};
		let cond = membership_cond(&opts).expect("cond");

		assert_eq!(
			cond.sql,
			"(tasks.project_id IN (?, ?) OR tasks.id IN (SELECT entity_id FROM favorites WHERE user_id = ? AND kind = ?))"
		);
		assert_eq!(cond.binds, vec![
			SqlBind::Int(1),
			SqlBind::Int(2),
			SqlBind::Int(9),
			SqlBind::Text("task".to_string()),
		]);
	}

	#[test]
	fn no_scope_means_no_membership_predicate() {
		assert_eq!(membership_cond(&TaskSearchOptions::default()), None);
	}

	#[test]
	fn search_text_matches_title_description_and_display_index() {
		let opts =
			TaskSearchOptions { search: "42".to_string(), ..TaskSearchOptions::default() };
		let cond = text_cond(Dialect::Postgres, &opts).expect("cond");

		assert_eq!(
			cond.sql,
			"((tasks.title ILIKE ? OR tasks.description ILIKE ?) OR tasks.\"index\" = ?)"
		);
		assert_eq!(cond.binds, vec![
			SqlBind::Text("%42%".to_string()),
			SqlBind::Text("%42%".to_string()),
			SqlBind::Int(42),
		]);
	}

	#[test]
	fn plain_text_skips_the_index_match() {
		let opts =
			TaskSearchOptions { search: "report".to_string(), ..TaskSearchOptions::default() };
		let cond = text_cond(Dialect::Mysql, &opts).expect("cond");

		assert_eq!(
			cond.sql,
			"(UPPER(tasks.title) LIKE UPPER(?) OR UPPER(tasks.description) LIKE UPPER(?))"
		);
	}
}
