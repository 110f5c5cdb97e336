use url::Url;

/// Turns a slug into whitespace-separated words: every `-` and `_` becomes a
/// single space. Everything else passes through untouched.
pub fn parse_slug(slug: &str) -> String {
    slug.chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect()
}

/// The last non-empty path segment of `url`, percent-decoded. Relative URLs
/// and bare paths are accepted. Returns an empty string when there is no
/// path segment.
pub fn slug_from_url(url: &str) -> String {
    let url = url.trim();
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .map(str::to_string),
    };
    let Some(segment) = segment else {
        return String::new();
    };
    match urlencoding::decode(&segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment,
    }
}
