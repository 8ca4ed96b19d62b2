use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use itertools::Itertools;

pub(crate) const BASE_URL: &str = "https://www.vlr.gg";

/// Placeholder image VLR serves when an entity has no logo/avatar uploaded.
pub(crate) const VLR_IMAGE: &str = "/img/vlr/tmp/vlr.png";

/// Trim a scraped string and strip embedded newline/tab characters.
///
/// This deliberately does not collapse inner spaces; VLR nests text inside
/// heavily indented markup, so only the indentation characters go.
pub fn clean_string(s: &str) -> String {
    s.replace(['\n', '\t'], "").trim().to_string()
}

/// Lossy numeric conversion for scraped stat cells.
///
/// Strips a trailing `%`, then tries an integer parse followed by a float
/// parse. Empty text, the literal `nan` (VLR prints that for some player
/// stats) and anything unparsable all become `0` -- callers cannot tell an
/// explicit zero apart from garbage at this layer.
pub fn clean_number_string(s: &str) -> f64 {
    let text = s.trim();
    let text = text.strip_suffix('%').unwrap_or(text).trim();
    if text.is_empty() || text == "nan" {
        return 0.0;
    }
    if let Ok(i) = text.parse::<i64>() {
        return i as f64;
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Normalize an image `src` attribute to an absolute, fetchable URL.
///
/// Already-absolute URLs pass through unchanged, the site's placeholder
/// image is rooted at the VLR base URL, and everything else is assumed to
/// be protocol-relative.
pub fn get_image_url(src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else if src == VLR_IMAGE || src.starts_with("/img/") {
        format!("{BASE_URL}{src}")
    } else {
        format!("https:{src}")
    }
}

/// Expand an anchor `href` to an absolute URL, or `None` for blank input.
pub fn expand_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with("//") {
        Some(format!("https:{href}"))
    } else if href.starts_with('/') {
        Some(format!("{BASE_URL}{href}"))
    } else {
        Some(format!("https://{href}"))
    }
}

/// Attach the configured source timezone to a naive timestamp and convert
/// it to UTC. VLR renders times without any offset, in the timezone the
/// scraper is configured to browse in.
pub fn fix_datetime_tz(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        .with_timezone(&Utc)
}

/// Lookup key for the name->id side table: lowercased, spaces to underscores.
/// Two distinct teams sharing a simplified form collide (last write wins).
pub fn simplify_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Persistence key form of a display name: lowercased, whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().join(" ")
}
