/// 1x1 transparent PNG served when no cover can be resolved, so clients
/// always receive renderable image bytes.
pub const PLACEHOLDER_PNG: &[u8] = &[
	0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
	0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xB5,
	0x1C, 0x0C, 0x02, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60,
	0x60, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x2B, 0x09, 0x4D, 0x84, 0x00, 0x00, 0x00, 0x00,
	0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub const PLACEHOLDER_MIME: &str = "image/png";

/// Mime type assumed for stored cover bytes that predate mime tracking.
pub const DEFAULT_COVER_MIME: &str = "image/jpeg";

#[cfg(test)]
mod tests {
	use super::PLACEHOLDER_PNG;

	#[test]
	fn placeholder_is_a_png() {
		assert!(!PLACEHOLDER_PNG.is_empty());
		assert_eq!(&PLACEHOLDER_PNG[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
	}
}
