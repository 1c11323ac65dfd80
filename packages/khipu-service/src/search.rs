pub mod db;
pub mod filter;
pub mod index;
pub mod order;

mod sql;

/// Extracts a task display index from free-text search input, so searching
/// for `42` or `#42` also matches the task numbered 42.
pub(crate) fn task_index_from_search(search: &str) -> Option<i64> {
	let trimmed = search.trim();
	let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);

	trimmed.parse::<i64>().ok().filter(|index| *index > 0)
}

/// Converts a 1-based page number into a LIMIT/OFFSET pair. Page 0 (or a
/// non-positive page size) disables paging.
pub(crate) fn limit_offset(page: i64, per_page: i64) -> Option<(i64, i64)> {
	if page < 1 || per_page < 1 {
		return None;
	}

	Some((per_page, (page - 1) * per_page))
}
