use url::Url;

/// Normalize a handle, `@handle` or pasted profile URL into a bare username.
///
/// Never fails. Input that looks like a URL is reduced to a single path
/// piece without `/` or `\`, so sanitizing the result again is a no-op.
pub fn sanitize_username(raw: &str) -> String {
    let handle = raw.trim_start_matches(is_handle_prefix).trim_end();
    if handle.is_empty() {
        return String::new();
    }

    let candidate = if looks_like_url(handle) {
        username_from_url(handle)
    } else {
        handle.to_string()
    };

    candidate
        .split('?')
        .next()
        .unwrap_or_default()
        .trim_start_matches(is_handle_prefix)
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}

fn is_handle_prefix(c: char) -> bool {
    c == '@' || c.is_whitespace()
}

fn looks_like_url(input: &str) -> bool {
    input.contains("http") || input.contains("www.") || input.contains('/')
}

fn username_from_url(input: &str) -> String {
    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    match Url::parse(&with_scheme) {
        Ok(url) => {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|parts| parts.filter(|p| !p.is_empty()).collect())
                .unwrap_or_default();

            // TikTok and YouTube put the handle in an `@name` segment that is
            // not necessarily the last one (`/@name/video/123`)
            segments
                .iter()
                .find(|segment| segment.starts_with('@'))
                .or_else(|| segments.last())
                .map_or_else(|| last_segment(input), |segment| (*segment).to_string())
        }
        Err(e) => {
            tracing::debug!("URL parsing failed for '{}', splitting on '/': {}", input, e);
            last_segment(input)
        }
    }
}

/// Last non-empty `/` or `\` separated piece before any query or fragment.
fn last_segment(input: &str) -> String {
    input
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split(['/', '\\'])
        .rev()
        .find(|part| !part.is_empty())
        .unwrap_or_default()
        .to_string()
}
