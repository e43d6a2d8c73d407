/// Drops the scheme and any trailing slash for display.
pub fn strip_url(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url)
}

pub fn looks_like_url(input: &str) -> bool {
    let input = input.trim();
    (input.starts_with("http://") || input.starts_with("https://")) && !input.contains(char::is_whitespace)
}
