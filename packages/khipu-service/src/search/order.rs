//! Turns validated sort specs into ORDER BY clauses. Sort field names come
//! from request input, so every spec is parsed against the fixed allow-list
//! before any of it is spliced into SQL text.

use khipu_domain::{SortParam, TaskProperty};
use khipu_storage::db::Dialect;

use crate::{Error, Result};

/// The index service caps sorting at three keys; extras are dropped.
const INDEX_MAX_SORT_PARAMS: usize = 3;

/// Builds the relational ORDER BY clause. NULL placement differs between
/// engines: where NULLS LAST is supported it is requested explicitly, and
/// where it is not (MySQL) an `IS NULL` key is emitted before each real key
/// so rows sort consistently everywhere.
pub(crate) fn db_order_by(dialect: Dialect, sort_by: &[SortParam]) -> Result<String> {
	let mut clauses = Vec::with_capacity(sort_by.len());

	for param in sort_by {
		let property = TaskProperty::parse(&param.sort_by)
			.ok_or_else(|| Error::InvalidSortField(param.sort_by.clone()))?;
		// Position lives on the joined sub-table; everything else is
		// qualified against tasks so joins cannot make columns ambiguous.
		let prefix = match property {
			TaskProperty::Position => "task_positions.",
			_ => "tasks.",
		};
		let column = format!("{prefix}{}", dialect.quote(property.as_str()));
		let mut clause = String::new();

		if !dialect.supports_null_placement() {
			clause.push_str(&format!("{column} IS NULL, "));
		}

		clause.push_str(&format!("{column} {}", param.order.as_str().to_uppercase()));

		if dialect.supports_null_placement() {
			clause.push_str(" NULLS LAST");
		}

		clauses.push(clause);
	}

	Ok(clauses.join(", "))
}

/// The view id of the first position sort spec, when one is present. The
/// searchers use it to decide whether and how to join the position table.
pub(crate) fn position_view_id(sort_by: &[SortParam]) -> Option<i64> {
	sort_by.iter().find(|param| param.is_position()).map(|param| param.project_view_id)
}

/// Builds the index service's sort expression. `id` has no sortable index
/// representation and is substituted with the creation timestamp; `position`
/// maps to the per-view dynamic field. When the request comes from a saved
/// filter there is no single view, so position keys are skipped entirely.
pub(crate) fn index_sort_by(sort_by: &[SortParam], is_saved_filter: bool) -> Result<Option<String>> {
	let mut fields = Vec::new();

	for param in sort_by {
		if is_saved_filter && param.is_position() {
			continue;
		}

		let property = TaskProperty::parse(&param.sort_by)
			.ok_or_else(|| Error::InvalidSortField(param.sort_by.clone()))?;
		let field = match property {
			TaskProperty::Id => TaskProperty::Created.as_str().to_string(),
			TaskProperty::Position => format!("positions.view_{}", param.project_view_id),
			_ => property.as_str().to_string(),
		};

		fields.push(format!("{field}(missing_values:last):{}", param.order.as_str()));

		if fields.len() == INDEX_MAX_SORT_PARAMS {
			break;
		}
	}

	if fields.is_empty() { Ok(None) } else { Ok(Some(fields.join(","))) }
}

#[cfg(test)]
mod tests {
	use khipu_domain::SortOrder;

	use super::*;

	#[test]
	fn null_placement_follows_the_dialect() {
		let sort_by = vec![
			SortParam::new("due_date", SortOrder::Ascending),
			SortParam::new("title", SortOrder::Descending),
		];

		assert_eq!(
			db_order_by(Dialect::Postgres, &sort_by).unwrap(),
			"tasks.\"due_date\" ASC NULLS LAST, tasks.\"title\" DESC NULLS LAST"
		);
		assert_eq!(
			db_order_by(Dialect::Mysql, &sort_by).unwrap(),
			"tasks.`due_date` IS NULL, tasks.`due_date` ASC, tasks.`title` IS NULL, tasks.`title` DESC"
		);
	}

	#[test]
	fn position_sorts_against_the_joined_table() {
		let sort_by = vec![SortParam::position(7, SortOrder::Ascending)];

		assert_eq!(
			db_order_by(Dialect::Postgres, &sort_by).unwrap(),
			"task_positions.\"position\" ASC NULLS LAST"
		);
		assert_eq!(position_view_id(&sort_by), Some(7));
	}

	#[test]
	fn unknown_sort_fields_are_rejected() {
		let sort_by = vec![SortParam::new("title; DROP TABLE tasks", SortOrder::Ascending)];

		assert!(matches!(
			db_order_by(Dialect::Postgres, &sort_by),
			Err(Error::InvalidSortField(_))
		));
		assert!(matches!(index_sort_by(&sort_by, false), Err(Error::InvalidSortField(_))));
	}

	#[test]
	fn index_sort_substitutes_and_truncates() {
		let sort_by = vec![
			SortParam::new("id", SortOrder::Descending),
			SortParam::position(3, SortOrder::Ascending),
			SortParam::new("due_date", SortOrder::Ascending),
			SortParam::new("priority", SortOrder::Descending),
		];

		assert_eq!(
			index_sort_by(&sort_by, false).unwrap().unwrap(),
			"created(missing_values:last):desc,positions.view_3(missing_values:last):asc,due_date(missing_values:last):asc"
		);
	}

	#[test]
	fn saved_filters_have_no_position_column() {
		let sort_by = vec![SortParam::position(3, SortOrder::Ascending)];

		assert_eq!(index_sort_by(&sort_by, true).unwrap(), None);
	}
}
