use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use url::Url;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").expect("tag pattern"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention pattern"));

/// NFKC-normalize, drop invisible characters, collapse whitespace and trim.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.nfkc() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if is_invisible(c) {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// Zero-width, bidi and other invisible format characters, plus C0/C1 controls.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{061C}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{FEFF}'
    ) || c.is_control()
}

/// Parse a display count such as `"1,204"`, `"12.3K"` or `"2M"`.
///
/// Anything that does not parse yields 0; a bad counter never fails a record.
pub fn parse_count(raw: &str) -> u64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0;
    }
    let (number, multiplier) = if let Some(rest) = cleaned.strip_suffix(['K', 'k']) {
        (rest, 1_000.0)
    } else if let Some(rest) = cleaned.strip_suffix(['M', 'm']) {
        (rest, 1_000_000.0)
    } else {
        (cleaned, 1.0)
    };
    match number.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => (value * multiplier).trunc() as u64,
        _ => 0,
    }
}

/// Hashtags in `text`, deduplicated case-insensitively; first spelling wins.
pub fn extract_tags(text: &str) -> Vec<String> {
    collect_unique(&TAG_RE, text)
}

/// Mentions in `text`, deduplicated case-insensitively; first spelling wins.
pub fn extract_mentions(text: &str) -> Vec<String> {
    collect_unique(&MENTION_RE, text)
}

fn collect_unique(re: &Regex, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|word| seen.insert(word.to_lowercase()))
        .map(ToOwned::to_owned)
        .collect()
}

/// Canonical form of a permalink used as a dedup key.
///
/// Drops query and fragment, lowercases scheme and host, trims a trailing
/// slash. Strings that are not absolute URLs are cut at `?`/`#` and trimmed.
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => {
            let cut = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
            cut.trim_end_matches('/').to_string()
        }
    }
}

/// Last non-empty path segment of a canonical URL, used when an item has no id.
pub fn id_from_url(canonical: &str) -> String {
    let path = match Url::parse(canonical) {
        Ok(url) => url.path().to_string(),
        Err(_) => canonical.to_string(),
    };
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{canonical_url, id_from_url, normalize_text, parse_count};

    #[test]
    fn normalize_collapses_and_strips() {
        assert_eq!(normalize_text("  a\u{200B}b \n\t c  "), "ab c");
        assert_eq!(normalize_text("\u{FEFF}"), "");
    }

    #[test]
    fn normalize_strips_bidi_and_format_marks() {
        for mark in [
            '\u{00AD}', '\u{061C}', '\u{180E}', '\u{200C}', '\u{200D}', '\u{200E}',
            '\u{200F}', '\u{202A}', '\u{202E}', '\u{2060}', '\u{2066}', '\u{2069}',
        ] {
            assert_eq!(normalize_text(&format!("a{mark}b")), "ab", "U+{:04X}", mark as u32);
        }
        assert_eq!(
            normalize_text("\u{200F}hello\u{200E}"),
            normalize_text("hello")
        );
    }

    #[test]
    fn normalize_applies_compatibility_forms() {
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_text("\u{FF28}\u{FF49}"), "Hi");
    }

    #[test]
    fn counts_follow_display_suffixes() {
        assert_eq!(parse_count("12.3K"), 12_300);
        assert_eq!(parse_count(" 1,204 "), 1_204);
        assert_eq!(parse_count("2M"), 2_000_000);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("K"), 0);
        assert_eq!(parse_count("-5"), 0);
    }

    #[test]
    fn canonical_url_drops_query_and_fragment() {
        assert_eq!(
            canonical_url("HTTPS://Example.com/u/status/42/?s=20#top"),
            "https://example.com/u/status/42"
        );
        assert_eq!(canonical_url("https://example.com/"), "https://example.com");
        assert_eq!(canonical_url("/u/status/42?x=1"), "/u/status/42");
        assert_eq!(canonical_url("   "), "");
    }

    #[test]
    fn id_is_last_path_segment() {
        assert_eq!(id_from_url("https://example.com/u/status/42"), "42");
        assert_eq!(id_from_url("/u/status/7"), "7");
        assert_eq!(id_from_url("https://example.com"), "");
    }
}
