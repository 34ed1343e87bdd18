//! URL canonicalization and link keys.
//!
//! A link key is the storage identity of an article. It is built from a
//! canonicalized URL so that mirrors, tracking-parameter variants and `/amp`
//! renditions of the same article collapse onto one key:
//!
//! ```text
//! https://www.bbc.co.uk/news/world-68123456?utm_source=tw  ->  bbc.com/a/68123456
//! https://lite.cnn.com/2025/05/06/politics/budget-vote     ->  cnn.com/a/budget-vote
//! https://example.com/                                     ->  example.com
//! not a url                                                ->  not a url
//! ```
//!
//! # Key construction
//!
//! 1. A numeric run of at least [`MIN_ARTICLE_ID_LEN`] digits in the path or a
//!    remaining query value is taken as the article ID (longest wins): `host/a/<id>`
//! 2. Otherwise the last meaningful path segment, without extension, lowercased,
//!    prefixed with the publish day when known: `host/a/<yyyymmdd>-<slug>`
//! 3. Otherwise `host` plus whatever path and query remain
//!
//! Input that does not parse as an absolute http(s) URL comes back trimmed and
//! otherwise untouched; callers must accept such non-canonical keys.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Shortest digit run treated as an article ID.
pub const MIN_ARTICLE_ID_LEN: usize = 6;

/// Outlets reachable under several hostnames, mapped to one canonical host.
const HOST_ALIASES: &[(&str, &str)] = &[
    ("lite.cnn.com", "cnn.com"),
    ("edition.cnn.com", "cnn.com"),
    ("us.cnn.com", "cnn.com"),
    ("amp.cnn.com", "cnn.com"),
    ("text.npr.org", "npr.org"),
    ("bbc.co.uk", "bbc.com"),
    ("m.bbc.co.uk", "bbc.com"),
    ("m.bbc.com", "bbc.com"),
    ("amp.theguardian.com", "theguardian.com"),
    ("mobile.reuters.com", "reuters.com"),
    ("mobile.nytimes.com", "nytimes.com"),
    ("m.aljazeera.com", "aljazeera.com"),
    ("m.apnews.com", "apnews.com"),
];

/// Final path segments that name a page template rather than an article.
const GENERIC_SEGMENTS: &[&str] = &["index", "default", "article", "story", "amp"];

static TRACKING_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(utm_[a-z0-9_]*|[a-z]*clid|msclkid|ref|ref_src|ref_url|referrer|referer|mc_cid|mc_eid|igshid|cmpid|ocid|smid|smtyp|at_[a-z_]+|_ga|_gl|spm)$",
    )
    .expect("tracking parameter pattern is valid")
});

static ARTICLE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\d{{{MIN_ARTICLE_ID_LEN},}}")).expect("article id pattern is valid")
});

/// Returns `true` for query parameter names that only carry tracking data.
pub fn is_tracking_param(name: &str) -> bool {
    TRACKING_PARAM.is_match(name)
}

fn canonical_host(host: &str) -> String {
    let lower = host.to_lowercase();
    let bare = lower.strip_prefix("www.").unwrap_or(&lower);
    HOST_ALIASES
        .iter()
        .find(|(alias, _)| *alias == bare)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| bare.to_string())
}

/// Canonicalize an article URL.
///
/// Forces `https`, lowercases the host and strips `www.`, maps host aliases,
/// drops tracking parameters, a trailing `/amp` segment, empty segments,
/// trailing slashes and the fragment.
///
/// Returns `None` when `raw` is not an absolute http(s) URL with a host.
pub fn canonicalize_url(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_scheme("https").ok()?;
    let host = canonical_host(url.host_str()?);
    url.set_host(Some(&host)).ok()?;
    url.set_port(None).ok()?;
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }

    let mut segments: Vec<String> = url
        .path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    if segments.last().is_some_and(|s| s.eq_ignore_ascii_case("amp")) {
        segments.pop();
    }
    url.set_path(&format!("/{}", segments.join("/")));

    Some(url)
}

fn longest_article_id(url: &Url) -> Option<String> {
    let path_ids = url
        .path_segments()
        .into_iter()
        .flatten()
        .flat_map(|seg| ARTICLE_ID.find_iter(seg).map(|m| m.as_str().to_string()).collect::<Vec<_>>());
    let query_ids = url
        .query_pairs()
        .flat_map(|(_, v)| ARTICLE_ID.find_iter(&v).map(|m| m.as_str().to_string()).collect::<Vec<_>>());

    let mut best: Option<String> = None;
    for id in path_ids.chain(query_ids) {
        if best.as_ref().is_none_or(|b| id.len() > b.len()) {
            best = Some(id);
        }
    }
    best
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => segment,
    }
}

fn article_slug(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    segments.iter().rev().find_map(|seg| {
        let decoded = urlencoding::decode(seg)
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| seg.to_string());
        let slug = strip_extension(&decoded).trim().to_lowercase();
        (!slug.is_empty() && !GENERIC_SEGMENTS.contains(&slug.as_str())).then_some(slug)
    })
}

fn day_prefix(published_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(published_ms).map(|dt| dt.format("%Y%m%d").to_string())
}

/// Derive the storage identity of an article URL.
///
/// `published_ms` should only be passed when the feed's date actually parsed;
/// a fallback "now" would give the same article a different key every day.
pub fn link_key(raw: &str, published_ms: Option<i64>) -> String {
    let Some(url) = canonicalize_url(raw) else {
        return raw.trim().to_string();
    };
    let host = url.host_str().unwrap_or_default();

    if let Some(id) = longest_article_id(&url) {
        return format!("{host}/a/{id}");
    }

    if let Some(slug) = article_slug(&url) {
        return match published_ms.and_then(day_prefix) {
            Some(day) => format!("{host}/a/{day}-{slug}"),
            None => format!("{host}/a/{slug}"),
        };
    }

    let path = url.path().trim_end_matches('/');
    match url.query() {
        Some(q) if path.is_empty() => format!("{host}/?{q}"),
        Some(q) => format!("{host}{path}?{q}"),
        None => format!("{host}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAY_6_2025_NOON_MS: i64 = 1_746_532_800_000;

    #[test]
    fn test_tracking_slash_and_amp_variants_share_a_key() {
        let variants = [
            "https://www.example.com/world/fire-downtown",
            "http://example.com/world/fire-downtown/",
            "https://example.com/world/fire-downtown?utm_source=tw&utm_medium=social",
            "https://example.com/world/fire-downtown/amp",
            "https://EXAMPLE.com/world/fire-downtown/amp/#comments",
            "https://example.com/world/fire-downtown?fbclid=abc123&gclid=x",
        ];
        for v in variants {
            assert_eq!(link_key(v, None), "example.com/a/fire-downtown", "variant {v}");
        }
    }

    #[test]
    fn test_different_articles_get_different_keys() {
        assert_ne!(
            link_key("https://example.com/world/fire-downtown", None),
            link_key("https://example.com/world/council-budget", None)
        );
    }

    #[test]
    fn test_day_prefix_when_date_known() {
        assert_eq!(
            link_key("https://example.com/world/fire-downtown", Some(MAY_6_2025_NOON_MS)),
            "example.com/a/20250506-fire-downtown"
        );
        assert_ne!(
            link_key("https://example.com/live", Some(MAY_6_2025_NOON_MS)),
            link_key("https://example.com/live", Some(MAY_6_2025_NOON_MS + 86_400_000))
        );
    }

    #[test]
    fn test_numeric_article_id() {
        assert_eq!(
            link_key("https://www.bbc.co.uk/news/world-europe-68123456?at_medium=RSS", None),
            "bbc.com/a/68123456"
        );
        assert_eq!(
            link_key("https://site.com/article.php?id=1234567&fbclid=abc", Some(MAY_6_2025_NOON_MS)),
            "site.com/a/1234567"
        );
        assert_eq!(link_key("https://site.com/2025/123456/story-12345678", None), "site.com/a/12345678");
    }

    #[test]
    fn test_short_numbers_are_not_ids() {
        assert_eq!(link_key("https://site.com/2025/05/06/big-story", None), "site.com/a/big-story");
    }

    #[test]
    fn test_host_aliases() {
        assert_eq!(
            link_key("https://lite.cnn.com/2025/05/06/politics/budget-vote", None),
            link_key("https://edition.cnn.com/2025/05/06/politics/budget-vote/index.html", None)
        );
        assert_eq!(link_key("https://text.npr.org/nx-s1-5", None), "npr.org/a/nx-s1-5");
    }

    #[test]
    fn test_extension_and_encoding() {
        assert_eq!(link_key("https://x.com/news/Big-Story.html", None), "x.com/a/big-story");
        assert_eq!(link_key("https://x.com/news/caf%C3%A9-prices", None), "x.com/a/café-prices");
    }

    #[test]
    fn test_no_path_fallback() {
        assert_eq!(link_key("https://www.cnn.com/", None), "cnn.com");
        assert_eq!(link_key("https://x.com/?p=42&utm_source=a", None), "x.com/?p=42");
    }

    #[test]
    fn test_unparseable_input_is_returned_trimmed() {
        assert_eq!(link_key("  not a url  ", None), "not a url");
        assert_eq!(link_key("mailto:desk@example.com", None), "mailto:desk@example.com");
        assert_eq!(link_key("", None), "");
    }

    #[test]
    fn test_canonicalize_url() {
        let url = canonicalize_url("http://www.Example.com:80/a//b/amp/?ref=home&q=1#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a/b?q=1");
    }

    #[test]
    fn test_is_tracking_param() {
        for name in ["utm_source", "UTM_Campaign", "fbclid", "gclid", "msclkid", "ref", "mc_cid"] {
            assert!(is_tracking_param(name), "{name}");
        }
        for name in ["id", "p", "page", "story"] {
            assert!(!is_tracking_param(name), "{name}");
        }
    }
}
