pub const MAX_REVIEW_CHARS: usize = 5_000;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A field-level validation failure, surfaced with the offending field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
	pub field: &'static str,
	pub message: String,
}

impl std::fmt::Display for FieldError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.field, self.message)
	}
}

pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), FieldError> {
	if value.trim().is_empty() {
		return Err(FieldError { field, message: "must be non-empty".to_string() });
	}

	Ok(())
}

pub fn validate_review(review: &str) -> Result<(), FieldError> {
	if review.chars().count() > MAX_REVIEW_CHARS {
		return Err(FieldError {
			field: "review",
			message: format!("must be at most {MAX_REVIEW_CHARS} characters"),
		});
	}

	Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), FieldError> {
	if !(MIN_RATING..=MAX_RATING).contains(&rating) {
		return Err(FieldError {
			field: "rating",
			message: format!("must be between {MIN_RATING} and {MAX_RATING}"),
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{MAX_REVIEW_CHARS, require_non_empty, validate_rating, validate_review};

	#[test]
	fn rejects_blank_required_fields() {
		assert!(require_non_empty("title", "   ").is_err());
		assert!(require_non_empty("title", "Dune").is_ok());
	}

	#[test]
	fn review_length_is_bounded_by_chars_not_bytes() {
		let at_limit = "ä".repeat(MAX_REVIEW_CHARS);

		assert!(validate_review(&at_limit).is_ok());
		assert!(validate_review(&format!("{at_limit}x")).is_err());
		assert!(validate_review("").is_ok());
	}

	#[test]
	fn rating_must_stay_in_range() {
		assert!(validate_rating(0).is_err());
		assert!(validate_rating(1).is_ok());
		assert!(validate_rating(5).is_ok());
		assert!(validate_rating(6).is_err());
	}
}
