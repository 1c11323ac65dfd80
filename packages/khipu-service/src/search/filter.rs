//! Translates the parsed filter tree into the two predicate languages the
//! searchers speak: a relational boolean expression and an index filter
//! string. Both compilers apply the same field rewrites and reject the same
//! inputs, so switching backends never changes which filters are legal.

use khipu_domain::{FilterComparator, FilterJoin, FilterNode, FilterValue, TaskFilter};
use khipu_storage::db::Dialect;

use crate::{
	Error, Result,
	search::sql::{SqlBind, SqlCond},
};

/// Task columns a filter may target directly. Everything else must go
/// through a rewrite or is rejected with [`Error::InvalidFilterField`].
const FILTERABLE_TASK_COLUMNS: &[&str] = &[
	"id",
	"title",
	"description",
	"done",
	"done_at",
	"due_date",
	"start_date",
	"end_date",
	"priority",
	"percent_done",
	"index",
	"project_id",
	"created",
	"updated",
];

/// Compiles the filter tree into one relational predicate. Sibling nodes are
/// folded strictly left to right using each node's join operator, so
/// `f0 AND f1 OR f2` means `(f0 AND f1) OR f2` regardless of operator
/// precedence conventions. An empty list compiles to no predicate at all.
pub(crate) fn compile_db_filter(
	dialect: Dialect,
	nodes: &[FilterNode],
	include_nulls: bool,
) -> Result<Option<SqlCond>> {
	let mut result: Option<SqlCond> = None;
	// The join stored on node i links it to node i+1; the last one is unused.
	let mut pending = FilterJoin::And;

	for node in nodes {
		let cond = match node {
			FilterNode::Leaf(filter) => compile_db_leaf(dialect, filter, include_nulls)?,
			FilterNode::Group { filters, .. } => {
				let Some(cond) = compile_db_filter(dialect, filters, include_nulls)? else {
					continue;
				};

				cond
			},
		};

		result = Some(match result {
			None => cond,
			Some(acc) => acc.join(pending, cond),
		});
		pending = node.join();
	}

	Ok(result)
}

fn compile_db_leaf(dialect: Dialect, filter: &TaskFilter, include_nulls: bool) -> Result<SqlCond> {
	match filter.field.as_str() {
		"reminders" => {
			let inner = column_cond(filter, "reminder", include_nulls)?;

			Ok(sub_table_cond("task_reminders", inner))
		},
		"assignees" => {
			if filter.comparator == FilterComparator::Like {
				return Err(Error::UnsupportedFilterOperation {
					field: filter.field.clone(),
					comparator: "like",
				});
			}

			let inner = column_cond(filter, "username", include_nulls)?;

			Ok(SqlCond::new(
				format!(
					"tasks.id IN (SELECT task_id FROM task_assignees WHERE user_id IN (SELECT id FROM users WHERE {}))",
					inner.sql
				),
				inner.binds,
			))
		},
		"labels" | "label_id" => {
			let inner = column_cond(filter, "label_id", include_nulls)?;

			Ok(sub_table_cond("label_tasks", inner))
		},
		"parent_project" | "parent_project_id" => {
			let inner = column_cond(filter, "parent_project_id", include_nulls)?;

			Ok(SqlCond::new(
				format!("tasks.project_id IN (SELECT id FROM projects WHERE {})", inner.sql),
				inner.binds,
			))
		},
		"project" => column_cond(filter, "tasks.project_id", include_nulls),
		// The searcher left-joins task_buckets whenever a filter references
		// this field, so the qualified column is always resolvable.
		"bucket_id" => column_cond(filter, "task_buckets.bucket_id", include_nulls),
		field if FILTERABLE_TASK_COLUMNS.contains(&field) => {
			// `index` is a keyword in every supported engine.
			let column = if field == "index" {
				format!("tasks.{}", dialect.quote("index"))
			} else {
				format!("tasks.{field}")
			};

			column_cond(filter, &column, include_nulls)
		},
		_ => Err(Error::InvalidFilterField(filter.field.clone())),
	}
}

/// The existential form every sub-collection rewrite reduces to:
/// `tasks.id IN (SELECT task_id FROM {table} WHERE {inner})`.
fn sub_table_cond(table: &str, inner: SqlCond) -> SqlCond {
	SqlCond::new(
		format!("tasks.id IN (SELECT task_id FROM {table} WHERE {})", inner.sql),
		inner.binds,
	)
}

fn column_cond(filter: &TaskFilter, column: &str, include_nulls: bool) -> Result<SqlCond> {
	let cond = match filter.comparator {
		FilterComparator::Equals => scalar_cond(filter, column, "=")?,
		FilterComparator::NotEquals => scalar_cond(filter, column, "!=")?,
		FilterComparator::Greater => scalar_cond(filter, column, ">")?,
		FilterComparator::GreaterEquals => scalar_cond(filter, column, ">=")?,
		FilterComparator::Less => scalar_cond(filter, column, "<")?,
		FilterComparator::LessEquals => scalar_cond(filter, column, "<=")?,
		FilterComparator::Like => {
			let FilterValue::Text(text) = &filter.value else {
				return Err(Error::InvalidFilterValue {
					field: filter.field.clone(),
					message: "the like comparator requires a text value".to_string(),
				});
			};

			SqlCond::new(
				format!("{column} LIKE ?"),
				vec![SqlBind::Text(format!("%{text}%"))],
			)
		},
		FilterComparator::In => {
			let FilterValue::List(values) = &filter.value else {
				return Err(Error::InvalidFilterValue {
					field: filter.field.clone(),
					message: "the in comparator requires a list value".to_string(),
				});
			};

			if values.is_empty() {
				// `IN ()` is not valid SQL; an empty list matches nothing.
				SqlCond::new("1 = 0", Vec::new())
			} else {
				let markers = vec!["?"; values.len()].join(", ");
				let binds = values
					.iter()
					.map(|value| scalar_bind(filter, value))
					.collect::<Result<Vec<_>>>()?;

				SqlCond::new(format!("{column} IN ({markers})"), binds)
			}
		},
		FilterComparator::Invalid =>
			return Err(Error::InvalidFilterValue {
				field: filter.field.clone(),
				message: "unrecognized comparator".to_string(),
			}),
	};

	if include_nulls { Ok(cond.or_is_null(column)) } else { Ok(cond) }
}

fn scalar_cond(filter: &TaskFilter, column: &str, op: &str) -> Result<SqlCond> {
	let bind = scalar_bind(filter, &filter.value)?;

	Ok(SqlCond::new(format!("{column} {op} ?"), vec![bind]))
}

fn scalar_bind(filter: &TaskFilter, value: &FilterValue) -> Result<SqlBind> {
	match value {
		FilterValue::Text(text) =>
			if filter.numeric {
				Err(Error::InvalidFilterValue {
					field: filter.field.clone(),
					message: format!("expected a numeric value, got {text:?}"),
				})
			} else {
				Ok(SqlBind::Text(text.clone()))
			},
		FilterValue::Integer(value) => Ok(SqlBind::Int(*value)),
		FilterValue::Decimal(value) => Ok(SqlBind::Num(*value)),
		FilterValue::Bool(value) => Ok(SqlBind::Bool(*value)),
		FilterValue::Timestamp(value) => Ok(SqlBind::Timestamp(*value)),
		FilterValue::List(_) => Err(Error::InvalidFilterValue {
			field: filter.field.clone(),
			message: "a list value is only valid with the in comparator".to_string(),
		}),
	}
}

/// Compiles the filter tree into the index service's filter-expression
/// syntax. Same rewrites, same rejections, same left-to-right fold as the
/// relational compiler.
pub(crate) fn compile_index_filter(nodes: &[FilterNode]) -> Result<Option<String>> {
	let mut result: Option<String> = None;
	let mut pending = FilterJoin::And;

	for node in nodes {
		let clause = match node {
			FilterNode::Leaf(filter) => leaf_index_filter(filter)?,
			FilterNode::Group { filters, .. } => {
				let Some(nested) = compile_index_filter(filters)? else {
					continue;
				};

				format!("({nested})")
			},
		};

		result = Some(match result {
			None => clause,
			Some(acc) => {
				let op = match pending {
					FilterJoin::And => "&&",
					FilterJoin::Or => "||",
				};

				format!("({acc} {op} {clause})")
			},
		});
		pending = node.join();
	}

	Ok(result)
}

fn leaf_index_filter(filter: &TaskFilter) -> Result<String> {
	let field = match filter.field.as_str() {
		"reminders" => "reminders.reminder",
		"assignees" => {
			if filter.comparator == FilterComparator::Like {
				return Err(Error::UnsupportedFilterOperation {
					field: filter.field.clone(),
					comparator: "like",
				});
			}

			"assignees.username"
		},
		"labels" | "label_id" => "labels.id",
		"parent_project" | "parent_project_id" => "parent_project_id",
		"project" => "project_id",
		// The index denormalises bucket membership into a flat id array.
		"bucket_id" => "buckets",
		field if FILTERABLE_TASK_COLUMNS.contains(&field) => field,
		_ => return Err(Error::InvalidFilterField(filter.field.clone())),
	};
	let op = match filter.comparator {
		FilterComparator::Equals => ":=",
		FilterComparator::NotEquals => ":!=",
		FilterComparator::Greater => ":>",
		FilterComparator::GreaterEquals => ":>=",
		FilterComparator::Less => ":<",
		FilterComparator::LessEquals => ":<=",
		FilterComparator::Like => ":",
		FilterComparator::In => ":[",
		FilterComparator::Invalid =>
			return Err(Error::InvalidFilterValue {
				field: filter.field.clone(),
				message: "unrecognized comparator".to_string(),
			}),
	};
	let mut clause = format!("{field}{op}{}", index_filter_value(&filter.value));

	if filter.comparator == FilterComparator::In {
		clause.push(']');
	}

	Ok(clause)
}

fn index_filter_value(value: &FilterValue) -> String {
	match value {
		FilterValue::Text(text) => text.clone(),
		FilterValue::Integer(value) => value.to_string(),
		FilterValue::Decimal(value) => value.to_string(),
		FilterValue::Bool(value) => value.to_string(),
		FilterValue::Timestamp(value) => value.unix_timestamp().to_string(),
		FilterValue::List(values) =>
			values.iter().map(index_filter_value).collect::<Vec<_>>().join(","),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn leaf(field: &str, comparator: FilterComparator, value: FilterValue) -> FilterNode {
		FilterNode::Leaf(TaskFilter {
			field: field.to_string(),
			comparator,
			value,
			numeric: false,
			join: FilterJoin::And,
		})
	}

	fn leaf_joined(
		field: &str,
		comparator: FilterComparator,
		value: FilterValue,
		join: FilterJoin,
	) -> FilterNode {
		let FilterNode::Leaf(mut filter) = leaf(field, comparator, value) else { unreachable!() };

		filter.join = join;

		FilterNode::Leaf(filter)
	}

	#[test]
	fn empty_filter_list_compiles_to_no_predicate() {
		assert_eq!(compile_db_filter(Dialect::Postgres, &[], false).unwrap(), None);
		assert_eq!(compile_index_filter(&[]).unwrap(), None);
	}

	#[test]
	fn single_leaf_compiles_unwrapped() {
		let nodes =
			vec![leaf("priority", FilterComparator::GreaterEquals, FilterValue::Integer(3))];
		let cond = compile_db_filter(Dialect::Postgres, &nodes, false).unwrap().unwrap();

		assert_eq!(cond.sql, "tasks.priority >= ?");
		assert_eq!(cond.binds, vec![SqlBind::Int(3)]);
		assert_eq!(compile_index_filter(&nodes).unwrap().unwrap(), "priority:>=3");
	}

	#[test]
	fn siblings_fold_left_to_right() {
		// f0 AND f1 OR f2 must mean (f0 AND f1) OR f2.
		let nodes = vec![
			leaf_joined("done", FilterComparator::Equals, FilterValue::Bool(false), FilterJoin::And),
			leaf_joined("priority", FilterComparator::Greater, FilterValue::Integer(3), FilterJoin::Or),
			leaf("percent_done", FilterComparator::Equals, FilterValue::Decimal(1.0)),
		];
		let cond = compile_db_filter(Dialect::Postgres, &nodes, false).unwrap().unwrap();

		assert_eq!(cond.sql, "((tasks.done = ? AND tasks.priority > ?) OR tasks.percent_done = ?)");
		assert_eq!(
			compile_index_filter(&nodes).unwrap().unwrap(),
			"((done:=false && priority:>3) || percent_done:=1)"
		);
	}

	#[test]
	fn subcollection_fields_rewrite_to_existential_predicates() {
		let nodes =
			vec![leaf("labels", FilterComparator::In, FilterValue::List(vec![
				FilterValue::Integer(1),
				FilterValue::Integer(2),
			]))];
		let cond = compile_db_filter(Dialect::Postgres, &nodes, false).unwrap().unwrap();

		assert_eq!(
			cond.sql,
			"tasks.id IN (SELECT task_id FROM label_tasks WHERE label_id IN (?, ?))"
		);
		assert_eq!(compile_index_filter(&nodes).unwrap().unwrap(), "labels.id:[1,2]");
	}

	#[test]
	fn assignees_rejects_like_in_both_backends() {
		let nodes = vec![leaf(
			"assignees",
			FilterComparator::Like,
			FilterValue::Text("ann".to_string()),
		)];

		for result in [
			compile_db_filter(Dialect::Postgres, &nodes, false).map(|_| ()),
			compile_index_filter(&nodes).map(|_| ()),
		] {
			assert!(matches!(
				result,
				Err(Error::UnsupportedFilterOperation { comparator: "like", .. })
			));
		}
	}

	#[test]
	fn unknown_field_is_rejected() {
		let nodes = vec![leaf("password", FilterComparator::Equals, FilterValue::Integer(1))];

		assert!(matches!(
			compile_db_filter(Dialect::Postgres, &nodes, false),
			Err(Error::InvalidFilterField(field)) if field == "password"
		));
	}

	#[test]
	fn include_nulls_widens_each_leaf() {
		let nodes = vec![leaf(
			"due_date",
			FilterComparator::Less,
			FilterValue::Integer(1_700_000_000),
		)];
		let cond = compile_db_filter(Dialect::Postgres, &nodes, true).unwrap().unwrap();

		assert_eq!(cond.sql, "(tasks.due_date < ? OR tasks.due_date IS NULL)");
	}

	#[test]
	fn index_column_is_quoted_per_dialect() {
		let nodes = vec![leaf("index", FilterComparator::Equals, FilterValue::Integer(12))];

		assert_eq!(
			compile_db_filter(Dialect::Postgres, &nodes, false).unwrap().unwrap().sql,
			"tasks.\"index\" = ?"
		);
		assert_eq!(
			compile_db_filter(Dialect::Mysql, &nodes, false).unwrap().unwrap().sql,
			"tasks.`index` = ?"
		);
	}

	#[test]
	fn numeric_fields_reject_text_values() {
		let mut nodes =
			vec![leaf("priority", FilterComparator::Equals, FilterValue::Text("high".to_string()))];

		if let FilterNode::Leaf(filter) = &mut nodes[0] {
			filter.numeric = true;
		}

		assert!(matches!(
			compile_db_filter(Dialect::Postgres, &nodes, false),
			Err(Error::InvalidFilterValue { .. })
		));
	}
}
