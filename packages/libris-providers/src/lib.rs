pub mod openlibrary;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::Client;

/// One provider document projected out of a term search.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WorkSummary {
	pub work_key: Option<String>,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub cover_id: Option<i64>,
}

/// Detail fields of a work used by the publish-year fallback chain.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct WorkDetail {
	pub first_publish_year: Option<i32>,
	pub first_publish_date: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EditionSummary {
	pub publish_date: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CoverImage {
	pub bytes: Vec<u8>,
	pub mime_type: String,
}

/// Cover endpoint size suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverSize {
	Medium,
	Large,
}

impl CoverSize {
	pub fn suffix(self) -> &'static str {
		match self {
			Self::Medium => "M",
			Self::Large => "L",
		}
	}
}

pub(crate) fn client(cfg: &libris_config::Provider) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}
