#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
	#[default]
	Ascending,
	Descending,
}
impl SortOrder {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Ascending => "asc",
			Self::Descending => "desc",
		}
	}
}

/// The fixed set of sortable task properties. Sort input arrives as raw
/// strings from the request layer; parsing against this allow-list is what
/// keeps unvalidated input out of textual ORDER BY clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskProperty {
	Id,
	Title,
	Done,
	DoneAt,
	DueDate,
	StartDate,
	EndDate,
	Priority,
	PercentDone,
	Index,
	Created,
	Updated,
	Position,
	BucketId,
}
impl TaskProperty {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"id" => Some(Self::Id),
			"title" => Some(Self::Title),
			"done" => Some(Self::Done),
			"done_at" => Some(Self::DoneAt),
			"due_date" => Some(Self::DueDate),
			"start_date" => Some(Self::StartDate),
			"end_date" => Some(Self::EndDate),
			"priority" => Some(Self::Priority),
			"percent_done" => Some(Self::PercentDone),
			"index" => Some(Self::Index),
			"created" => Some(Self::Created),
			"updated" => Some(Self::Updated),
			"position" => Some(Self::Position),
			"bucket_id" => Some(Self::BucketId),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::Title => "title",
			Self::Done => "done",
			Self::DoneAt => "done_at",
			Self::DueDate => "due_date",
			Self::StartDate => "start_date",
			Self::EndDate => "end_date",
			Self::Priority => "priority",
			Self::PercentDone => "percent_done",
			Self::Index => "index",
			Self::Created => "created",
			Self::Updated => "updated",
			Self::Position => "position",
			Self::BucketId => "bucket_id",
		}
	}
}

#[derive(Debug, Clone)]
pub struct SortParam {
	pub sort_by: String,
	pub order: SortOrder,
	/// Only meaningful when `sort_by` is `position`: the view whose
	/// position column to sort against.
	pub project_view_id: i64,
}
impl SortParam {
	pub fn new(sort_by: impl Into<String>, order: SortOrder) -> Self {
		Self { sort_by: sort_by.into(), order, project_view_id: 0 }
	}

	pub fn position(project_view_id: i64, order: SortOrder) -> Self {
		Self { sort_by: "position".to_string(), order, project_view_id }
	}

	pub fn is_position(&self) -> bool {
		self.sort_by == "position"
	}
}
