use std::sync::OnceLock;

use regex::Regex;

fn digit_runs() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();

	RE.get_or_init(|| Regex::new(r"\d+").expect("Digit-run pattern must compile."))
}

/// Extracts a publish year from free-text date fields like "Jan 04, 1996" or
/// "1998?". Only a standalone run of exactly four digits counts, so malformed
/// text never yields a truncated or out-of-range year.
pub fn extract_year(text: &str) -> Option<i32> {
	for run in digit_runs().find_iter(text) {
		if run.as_str().len() != 4 {
			continue;
		}

		return run.as_str().parse().ok();
	}

	None
}

#[cfg(test)]
mod tests {
	use super::extract_year;

	#[test]
	fn extracts_standalone_four_digit_run() {
		assert_eq!(extract_year("Jan 04, 1996"), Some(1_996));
		assert_eq!(extract_year("1998?"), Some(1_998));
		assert_eq!(extract_year("published circa 1850 in London"), Some(1_850));
	}

	#[test]
	fn takes_the_first_four_digit_run() {
		assert_eq!(extract_year("reprinted 2004, first published 1922"), Some(2_004));
	}

	#[test]
	fn skips_longer_digit_runs() {
		assert_eq!(extract_year("catalogue 123456"), None);
		assert_eq!(extract_year("id 99999 but printed 2001"), Some(2_001));
	}

	#[test]
	fn yields_nothing_for_short_runs_or_empty_text() {
		assert_eq!(extract_year("vol. 12, no. 3"), None);
		assert_eq!(extract_year(""), None);
	}
}
