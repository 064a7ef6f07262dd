use serde_json::Value;

use crate::{CoverImage, CoverSize, EditionSummary, Error, Result, WorkDetail, WorkSummary};

/// Searches works by free text and projects at most `limit` documents.
pub async fn search_by_term(
	cfg: &libris_config::Provider,
	term: &str,
	limit: u32,
) -> Result<Vec<WorkSummary>> {
	let client = crate::client(cfg)?;
	let url = format!("{}/search.json", cfg.api_base);
	let res = client
		.get(url)
		.query(&[("q", term), ("limit", limit.to_string().as_str())])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_search_response(&json, limit as usize))
}

/// Fetches the detail document of a work key such as `/works/OL45883W`.
pub async fn work_detail(cfg: &libris_config::Provider, work_key: &str) -> Result<WorkDetail> {
	let client = crate::client(cfg)?;
	let url = format!("{}{}.json", cfg.api_base, work_key);
	let res = client.get(url).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_work_detail(&json))
}

/// Fetches the first listed edition of a work, if the work has any.
pub async fn first_edition(
	cfg: &libris_config::Provider,
	work_key: &str,
) -> Result<Option<EditionSummary>> {
	let client = crate::client(cfg)?;
	let url = format!("{}{}/editions.json", cfg.api_base, work_key);
	let res = client.get(url).query(&[("limit", "1")]).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_first_edition(&json))
}

/// Downloads cover bytes from the covers endpoint.
pub async fn fetch_cover(
	cfg: &libris_config::Provider,
	cover_id: i64,
	size: CoverSize,
) -> Result<CoverImage> {
	let client = crate::client(cfg)?;
	let res = client.get(cover_url(cfg, cover_id, size)).send().await?;
	let res = res.error_for_status()?;
	let mime_type = res
		.headers()
		.get(reqwest::header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.unwrap_or("image/jpeg")
		.to_string();
	let bytes = res.bytes().await?.to_vec();

	if bytes.is_empty() {
		return Err(Error::InvalidResponse {
			message: format!("Cover {cover_id} returned an empty body."),
		});
	}

	Ok(CoverImage { bytes, mime_type })
}

pub fn cover_url(cfg: &libris_config::Provider, cover_id: i64, size: CoverSize) -> String {
	format!("{}/b/id/{cover_id}-{}.jpg", cfg.covers_base, size.suffix())
}

fn parse_search_response(json: &Value, limit: usize) -> Vec<WorkSummary> {
	let docs = json.get("docs").and_then(|value| value.as_array());
	let Some(docs) = docs else {
		return Vec::new();
	};

	docs.iter().take(limit).map(parse_search_doc).collect()
}

fn parse_search_doc(doc: &Value) -> WorkSummary {
	let work_key = doc
		.get("key")
		.and_then(|value| value.as_str())
		.filter(|key| !key.is_empty())
		.map(str::to_string);
	let title = doc
		.get("title")
		.and_then(|value| value.as_str())
		.unwrap_or_default()
		.to_string();
	let author = doc
		.get("author_name")
		.and_then(|value| value.as_array())
		.and_then(|names| names.first())
		.and_then(|name| name.as_str())
		.map(str::to_string);
	let publish_year =
		doc.get("first_publish_year").and_then(|value| value.as_i64()).map(|year| year as i32);
	let cover_id = doc.get("cover_i").and_then(|value| value.as_i64());

	WorkSummary { work_key, title, author, publish_year, cover_id }
}

fn parse_work_detail(json: &Value) -> WorkDetail {
	let first_publish_year =
		json.get("first_publish_year").and_then(|value| value.as_i64()).map(|year| year as i32);
	let first_publish_date =
		json.get("first_publish_date").and_then(|value| value.as_str()).map(str::to_string);

	WorkDetail { first_publish_year, first_publish_date }
}

fn parse_first_edition(json: &Value) -> Option<EditionSummary> {
	let entry = json.get("entries").and_then(|value| value.as_array())?.first()?;
	let publish_date =
		entry.get("publish_date").and_then(|value| value.as_str()).map(str::to_string);

	Some(EditionSummary { publish_date })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_search_docs_in_order() {
		let json = serde_json::json!({
			"docs": [
				{
					"key": "/works/OL1W",
					"title": "Dune",
					"author_name": ["Frank Herbert", "Someone Else"],
					"first_publish_year": 1965,
					"cover_i": 11_481
				},
				{ "title": "Untitled Draft" }
			]
		});
		let parsed = parse_search_response(&json, 10);

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0].work_key.as_deref(), Some("/works/OL1W"));
		assert_eq!(parsed[0].author.as_deref(), Some("Frank Herbert"));
		assert_eq!(parsed[0].publish_year, Some(1_965));
		assert_eq!(parsed[0].cover_id, Some(11_481));
		assert_eq!(parsed[1].work_key, None);
		assert_eq!(parsed[1].title, "Untitled Draft");
	}

	#[test]
	fn search_respects_the_limit() {
		let docs: Vec<_> =
			(0..20).map(|i| serde_json::json!({ "key": format!("/works/OL{i}W") })).collect();
		let json = serde_json::json!({ "docs": docs });

		assert_eq!(parse_search_response(&json, 10).len(), 10);
	}

	#[test]
	fn missing_docs_array_yields_no_results() {
		let json = serde_json::json!({ "numFound": 0 });

		assert!(parse_search_response(&json, 10).is_empty());
	}

	#[test]
	fn parses_work_detail_fields() {
		let json = serde_json::json!({
			"first_publish_year": 1871,
			"first_publish_date": "December 1871"
		});
		let detail = parse_work_detail(&json);

		assert_eq!(detail.first_publish_year, Some(1_871));
		assert_eq!(detail.first_publish_date.as_deref(), Some("December 1871"));
	}

	#[test]
	fn first_edition_is_none_when_entries_are_empty() {
		assert!(parse_first_edition(&serde_json::json!({ "entries": [] })).is_none());
		assert!(parse_first_edition(&serde_json::json!({})).is_none());

		let edition = parse_first_edition(&serde_json::json!({
			"entries": [{ "publish_date": "Jan 04, 1996" }]
		}))
		.expect("Expected an edition.");

		assert_eq!(edition.publish_date.as_deref(), Some("Jan 04, 1996"));
	}
}
