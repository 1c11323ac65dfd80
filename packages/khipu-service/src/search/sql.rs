use khipu_domain::FilterJoin;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlBind {
	Int(i64),
	Num(f64),
	Bool(bool),
	Text(String),
	Timestamp(OffsetDateTime),
}

/// A composable boolean predicate: SQL text with `?` markers plus the bind
/// values in marker order. The engine's real placeholder syntax is only
/// produced when the condition is rendered into a `QueryBuilder`, which
/// keeps composition independent of `$1`-style numbering.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlCond {
	pub sql: String,
	pub binds: Vec<SqlBind>,
}
impl SqlCond {
	pub fn new(sql: impl Into<String>, binds: Vec<SqlBind>) -> Self {
		Self { sql: sql.into(), binds }
	}

	pub fn join(self, join: FilterJoin, other: Self) -> Self {
		let op = match join {
			FilterJoin::And => "AND",
			FilterJoin::Or => "OR",
		};
		let mut binds = self.binds;

		binds.extend(other.binds);

		Self { sql: format!("({} {op} {})", self.sql, other.sql), binds }
	}

	pub fn and(self, other: Self) -> Self {
		self.join(FilterJoin::And, other)
	}

	pub fn or(self, other: Self) -> Self {
		self.join(FilterJoin::Or, other)
	}

	pub fn or_is_null(self, column: &str) -> Self {
		Self { sql: format!("({} OR {column} IS NULL)", self.sql), binds: self.binds }
	}

	/// Renders the condition onto a query, replacing each `?` marker with
	/// a real bind. Marker and bind counts agree by construction; values
	/// never appear in the SQL text, so a `?` can only be a marker.
	pub fn push_onto(&self, builder: &mut QueryBuilder<'_, Postgres>) {
		let mut binds = self.binds.iter();
		let mut segments = self.sql.split('?');

		if let Some(first) = segments.next() {
			builder.push(first);
		}

		for segment in segments {
			if let Some(bind) = binds.next() {
				match bind {
					SqlBind::Int(value) => builder.push_bind(*value),
					SqlBind::Num(value) => builder.push_bind(*value),
					SqlBind::Bool(value) => builder.push_bind(*value),
					SqlBind::Text(value) => builder.push_bind(value.clone()),
					SqlBind::Timestamp(value) => builder.push_bind(*value),
				};
			}

			builder.push(segment);
		}
	}
}

/// ANDs the present conditions together, left to right.
pub(crate) fn and_all(conds: Vec<Option<SqlCond>>) -> Option<SqlCond> {
	conds.into_iter().flatten().reduce(SqlCond::and)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn join_concatenates_sql_and_binds() {
		let left = SqlCond::new("a = ?", vec![SqlBind::Int(1)]);
		let right = SqlCond::new("b = ?", vec![SqlBind::Text("x".to_string())]);
		let cond = left.join(FilterJoin::Or, right);

		assert_eq!(cond.sql, "(a = ? OR b = ?)");
		assert_eq!(cond.binds, vec![SqlBind::Int(1), SqlBind::Text("x".to_string())]);
	}

	#[test]
	fn and_all_skips_absent_conditions() {
		let cond = and_all(vec![
			None,
			Some(SqlCond::new("a = ?", vec![SqlBind::Int(1)])),
			None,
			Some(SqlCond::new("b = ?", vec![SqlBind::Int(2)])),
		])
		.expect("non-empty");

		assert_eq!(cond.sql, "(a = ? AND b = ?)");
	}

	#[test]
	fn push_onto_renders_numbered_placeholders() {
		let cond = SqlCond::new(
			"a = ? AND b = ?",
			vec![SqlBind::Int(1), SqlBind::Text("x".to_string())],
		);
		let mut builder = QueryBuilder::new("SELECT * FROM t WHERE ");

		cond.push_onto(&mut builder);

		assert_eq!(builder.sql(), "SELECT * FROM t WHERE a = $1 AND b = $2");
	}
}
