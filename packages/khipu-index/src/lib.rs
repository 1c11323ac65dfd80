mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

/// One search request against a document collection. Field names follow
/// the Typesense search API; `None` parameters are omitted from the
/// request entirely.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
	pub q: String,
	pub query_by: String,
	pub filter_by: Option<String>,
	pub sort_by: Option<String>,
	pub page: Option<i64>,
	pub per_page: Option<i64>,
	pub exhaustive_search: bool,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
	pub document: Value,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
	pub hits: Vec<SearchHit>,
	/// Total hit count reported by the index, not the page size.
	pub found: i64,
}

pub struct IndexClient {
	http: Client,
	base_url: String,
	api_key: String,
}
impl IndexClient {
	pub fn new(cfg: &khipu_config::DocumentIndexConfig) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			http,
			base_url: cfg.url.trim_end_matches('/').to_string(),
			api_key: cfg.api_key.clone(),
		})
	}

	pub async fn search(&self, collection: &str, params: &SearchParams) -> Result<SearchOutcome> {
		let url = format!("{}/collections/{collection}/documents/search", self.base_url);
		let mut query: Vec<(&str, String)> = vec![
			("q", params.q.clone()),
			("query_by", params.query_by.clone()),
			("exhaustive_search", params.exhaustive_search.to_string()),
		];

		if let Some(filter_by) = params.filter_by.as_ref() {
			query.push(("filter_by", filter_by.clone()));
		}
		if let Some(sort_by) = params.sort_by.as_ref() {
			query.push(("sort_by", sort_by.clone()));
		}
		if let Some(page) = params.page {
			query.push(("page", page.to_string()));
		}
		if let Some(per_page) = params.per_page {
			query.push(("per_page", per_page.to_string()));
		}

		let res = self
			.http
			.get(url)
			.header("X-TYPESENSE-API-KEY", &self.api_key)
			.query(&query)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_search_response(json)
	}
}

fn parse_search_response(json: Value) -> Result<SearchOutcome> {
	let found = json.get("found").and_then(Value::as_i64).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing found count.".to_string() }
	})?;
	let hits = json.get("hits").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing hits array.".to_string() }
	})?;

	let mut parsed = Vec::with_capacity(hits.len());
	for hit in hits {
		let document = hit.get("document").cloned().ok_or_else(|| Error::InvalidResponse {
			message: "Search hit is missing its document.".to_string(),
		})?;

		parsed.push(SearchHit { document });
	}

	Ok(SearchOutcome { hits: parsed, found })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hits_and_total() {
		let json = serde_json::json!({
			"found": 27,
			"hits": [
				{ "document": { "id": "5", "title": "write report" } },
				{ "document": { "id": "9", "title": "file report" } }
			]
		});
		let outcome = parse_search_response(json).expect("parse failed");

		assert_eq!(outcome.found, 27);
		assert_eq!(outcome.hits.len(), 2);
		assert_eq!(outcome.hits[0].document["id"], "5");
	}

	#[test]
	fn rejects_response_without_hits() {
		let json = serde_json::json!({ "found": 3 });

		assert!(parse_search_response(json).is_err());
	}

	#[test]
	fn rejects_hit_without_document() {
		let json = serde_json::json!({ "found": 1, "hits": [ { "highlight": {} } ] });

		assert!(parse_search_response(json).is_err());
	}
}
