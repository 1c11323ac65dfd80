pub mod filter;
pub mod sort;

mod options;

pub use filter::{FilterComparator, FilterJoin, FilterNode, FilterValue, TaskFilter};
pub use options::{Actor, ExpandMode, FAVORITES_PSEUDO_PROJECT_ID, TaskSearchOptions};
pub use sort::{SortOrder, SortParam, TaskProperty};
