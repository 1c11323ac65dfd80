use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Task {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub done: bool,
	pub done_at: Option<OffsetDateTime>,
	pub due_date: Option<OffsetDateTime>,
	pub start_date: Option<OffsetDateTime>,
	pub end_date: Option<OffsetDateTime>,
	pub priority: Option<i64>,
	pub percent_done: Option<f64>,
	/// Per-project sequence number shown to users, e.g. the `42` in
	/// `PROJ-42`.
	pub index: i64,
	pub project_id: i64,
	pub created: OffsetDateTime,
	pub updated: OffsetDateTime,
}

/// Fractional ordering key of a task inside one project view. The float
/// leaves room to drop a task between any two others by bisecting their
/// positions; once neighbours get too close the view is renumbered.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TaskPosition {
	pub task_id: i64,
	pub project_view_id: i64,
	pub position: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectView {
	pub id: i64,
	pub project_id: i64,
	pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
	ParentTask,
	Subtask,
}
impl RelationKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::ParentTask => "parenttask",
			Self::Subtask => "subtask",
		}
	}
}

/// Favorite kind discriminator; this core only ever queries task
/// favorites.
pub const FAVORITE_KIND_TASK: &str = "task";
