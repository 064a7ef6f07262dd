//! Caller-identity extraction. Credential verification happens upstream of
//! this service; only the Basic header's username is read into the context.

use axum::http::{HeaderMap, header};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use libris_service::AuthContext;

pub fn auth_context(headers: &HeaderMap) -> AuthContext {
	let Some(username) = headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(basic_username)
	else {
		return AuthContext::anonymous();
	};

	AuthContext::authenticated(username)
}

fn basic_username(header: &str) -> Option<String> {
	let token = header.strip_prefix("Basic ")?;
	let decoded = BASE64.decode(token.trim()).ok()?;
	let userpass = String::from_utf8(decoded).ok()?;
	let (username, _password) = userpass.split_once(':')?;

	if username.is_empty() {
		return None;
	}

	Some(username.to_string())
}

#[cfg(test)]
mod tests {
	use super::basic_username;
	use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

	#[test]
	fn extracts_username_from_basic_header() {
		let header = format!("Basic {}", BASE64.encode("alice:wonderland"));

		assert_eq!(basic_username(&header).as_deref(), Some("alice"));
	}

	#[test]
	fn rejects_malformed_headers() {
		assert_eq!(basic_username("Bearer abc"), None);
		assert_eq!(basic_username("Basic not-base64!!"), None);

		let no_separator = format!("Basic {}", BASE64.encode("alice"));

		assert_eq!(basic_username(&no_separator), None);

		let empty_user = format!("Basic {}", BASE64.encode(":password"));

		assert_eq!(basic_username(&empty_user), None);
	}
}
