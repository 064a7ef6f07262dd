#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
	UpdatedAt,
	CreatedAt,
	Title,
	Author,
	Rating,
	PublishYear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
	Asc,
	Desc,
}

/// Library list ordering, parsed from `field:asc|desc` input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
	pub field: SortField,
	pub direction: SortDirection,
}

impl Default for SortSpec {
	fn default() -> Self {
		Self { field: SortField::UpdatedAt, direction: SortDirection::Desc }
	}
}

/// Fields outside the allow-list, and absent or malformed input, fall back to
/// the default `updatedAt` descending. An unrecognized direction is treated
/// as descending.
pub fn parse_sort(input: Option<&str>) -> SortSpec {
	let Some(input) = input else {
		return SortSpec::default();
	};
	let mut parts = input.splitn(2, ':');
	let field = match parts.next().map(str::trim) {
		Some("updatedAt") => SortField::UpdatedAt,
		Some("createdAt") => SortField::CreatedAt,
		Some("title") => SortField::Title,
		Some("author") => SortField::Author,
		Some("rating") => SortField::Rating,
		Some("publishYear") => SortField::PublishYear,
		_ => return SortSpec::default(),
	};
	let direction = match parts.next().map(|raw| raw.trim().to_ascii_lowercase()) {
		Some(dir) if dir == "asc" => SortDirection::Asc,
		_ => SortDirection::Desc,
	};

	SortSpec { field, direction }
}

#[cfg(test)]
mod tests {
	use super::{SortDirection, SortField, SortSpec, parse_sort};

	#[test]
	fn parses_allowed_field_and_direction() {
		assert_eq!(
			parse_sort(Some("rating:asc")),
			SortSpec { field: SortField::Rating, direction: SortDirection::Asc }
		);
		assert_eq!(
			parse_sort(Some("title:desc")),
			SortSpec { field: SortField::Title, direction: SortDirection::Desc }
		);
	}

	#[test]
	fn missing_direction_defaults_to_desc() {
		assert_eq!(
			parse_sort(Some("publishYear")),
			SortSpec { field: SortField::PublishYear, direction: SortDirection::Desc }
		);
	}

	#[test]
	fn unknown_field_falls_back_to_default() {
		assert_eq!(parse_sort(Some("password:asc")), SortSpec::default());
		assert_eq!(parse_sort(Some("")), SortSpec::default());
		assert_eq!(parse_sort(None), SortSpec::default());
	}

	#[test]
	fn unknown_direction_is_treated_as_desc() {
		assert_eq!(
			parse_sort(Some("rating:sideways")),
			SortSpec { field: SortField::Rating, direction: SortDirection::Desc }
		);
	}
}
