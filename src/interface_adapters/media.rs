// Resolve a stored media path to a URL the browser or CLI can fetch.
//
// Absolute URLs pass through, `/uploads/...` and other rooted paths are
// prefixed with the backend origin, and bare file names are assumed to live
// under `/uploads/`.
pub fn image_url(origin: &str, image_path: &str) -> Option<String> {
    let image_path = image_path.trim();
    if image_path.is_empty() {
        return None;
    }
    if image_path.starts_with("http://") || image_path.starts_with("https://") {
        return Some(image_path.to_string());
    }

    let origin = origin.trim_end_matches('/');
    if image_path.starts_with('/') {
        Some(format!("{origin}{image_path}"))
    } else {
        Some(format!("{origin}/uploads/{image_path}"))
    }
}
