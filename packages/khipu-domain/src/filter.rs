use time::OffsetDateTime;

/// Comparator carried by a filter leaf. `Invalid` is produced by the
/// user-facing filter parser when it cannot recognise an operator; the
/// compilers reject it instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterComparator {
	Equals,
	NotEquals,
	Greater,
	GreaterEquals,
	Less,
	LessEquals,
	Like,
	In,
	Invalid,
}
impl FilterComparator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Equals => "=",
			Self::NotEquals => "!=",
			Self::Greater => ">",
			Self::GreaterEquals => ">=",
			Self::Less => "<",
			Self::LessEquals => "<=",
			Self::Like => "like",
			Self::In => "in",
			Self::Invalid => "invalid",
		}
	}
}

/// Operator linking a filter node to its **next** sibling. The join on the
/// last node of a sibling list is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterJoin {
	#[default]
	And,
	Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
	Text(String),
	Integer(i64),
	Decimal(f64),
	Bool(bool),
	Timestamp(OffsetDateTime),
	List(Vec<FilterValue>),
}

#[derive(Debug, Clone)]
pub struct TaskFilter {
	pub field: String,
	pub comparator: FilterComparator,
	pub value: FilterValue,
	/// Set when the field is declared numeric; the compilers use it to
	/// check value coercion before emitting a predicate.
	pub numeric: bool,
	pub join: FilterJoin,
}

/// A parsed filter tree. Groups carry their children explicitly instead of
/// smuggling them through a leaf's value slot, which keeps the left-to-right
/// sibling folding visible in the structure.
#[derive(Debug, Clone)]
pub enum FilterNode {
	Leaf(TaskFilter),
	Group { filters: Vec<FilterNode>, join: FilterJoin },
}
impl FilterNode {
	pub fn join(&self) -> FilterJoin {
		match self {
			Self::Leaf(filter) => filter.join,
			Self::Group { join, .. } => *join,
		}
	}

	/// Whether this node or any nested node filters on `field`. Used to
	/// decide which auxiliary tables a search has to join.
	pub fn references_field(&self, field: &str) -> bool {
		match self {
			Self::Leaf(filter) => filter.field == field,
			Self::Group { filters, .. } =>
				filters.iter().any(|node| node.references_field(field)),
		}
	}
}
