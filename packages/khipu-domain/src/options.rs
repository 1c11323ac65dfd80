use crate::{filter::FilterNode, sort::SortParam};

/// Synthetic project id the request layer uses to ask for the actor's
/// favorite tasks instead of a real project.
pub const FAVORITES_PSEUDO_PROJECT_ID: i64 = -1;

/// Opaque identity of the caller. Permission checks happen in the layers
/// around this core; here it only scopes favorites ownership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor {
	pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandMode {
	#[default]
	None,
	Subtasks,
}

/// Everything a searcher needs to produce one page of tasks. Project ids
/// are already resolved to what the actor may see; `has_favorites_project`
/// is set by the resolving layer when the favorites pseudo-project was part
/// of the original selection.
#[derive(Debug, Clone, Default)]
pub struct TaskSearchOptions {
	pub actor: Actor,
	pub project_ids: Vec<i64>,
	pub has_favorites_project: bool,
	pub filters: Vec<FilterNode>,
	pub filter_include_nulls: bool,
	pub sort_by: Vec<SortParam>,
	pub search: String,
	/// 1-based page number; 0 means no paging.
	pub page: i64,
	pub per_page: i64,
	pub is_saved_filter: bool,
	pub expand: ExpandMode,
}
