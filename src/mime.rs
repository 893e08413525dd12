//! Content types that static responses must carry regardless of what the
//! general-purpose guesser thinks.

pub const MANIFEST: &str = "application/manifest+json";
pub const JAVASCRIPT: &str = "application/javascript";

/// Returns the forced content type for `path`, if any.
///
/// `None` means the standard guess stands.
#[must_use]
pub fn override_for(path: &str) -> Option<&'static str> {
    if path.ends_with(".webmanifest") || path.ends_with("manifest.json") {
        return Some(MANIFEST);
    }
    let (_, ext) = path.rsplit_once('.')?;
    let mime = match ext {
        "js" | "mjs" => JAVASCRIPT,
        "css" => "text/css",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}
