pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure this core can produce. All variants surface to the
/// caller unmodified; there are no retries and no partial results.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot filter on field {0:?}.")]
	InvalidFilterField(String),
	#[error("Invalid filter value for field {field:?}: {message}")]
	InvalidFilterValue { field: String, message: String },
	#[error("The {comparator} comparator is not supported for field {field:?}.")]
	UnsupportedFilterOperation { field: String, comparator: &'static str },
	#[error("Cannot sort by field {0:?}.")]
	InvalidSortField(String),
	#[error(transparent)]
	Storage(#[from] khipu_storage::Error),
	#[error(transparent)]
	IndexService(#[from] khipu_index::Error),
	#[error("Index returned a document with a non-numeric id: {0:?}.")]
	MalformedIndexResult(String),
	#[error("{0}")]
	Configuration(String),
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage(err.into())
	}
}
