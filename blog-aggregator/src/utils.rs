/// Text processing utilities
pub mod text {
    use once_cell::sync::Lazy;
    use regex::Regex;

    /// Upper bound for every excerpt, in characters.
    pub const EXCERPT_MAX_CHARS: usize = 200;
    const ELLIPSIS: &str = "...";

    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    static RE_MD_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
    static RE_MD_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
    static RE_MD_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());
    static RE_MD_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").unwrap());
    static RE_MD_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
    static RE_MD_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").unwrap());
    static RE_MD_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").unwrap());
    static RE_MD_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
    static RE_MD_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

    /// Collapse runs of whitespace into single spaces and trim.
    pub fn collapse_whitespace(text: &str) -> String {
        RE_WS.replace_all(text, " ").trim().to_string()
    }

    /// Remove HTML tags and decode entities.
    pub fn strip_html(html: &str) -> String {
        let without_tags = RE_TAGS.replace_all(html, " ");
        let decoded = html_escape::decode_html_entities(&without_tags);
        collapse_whitespace(&decoded)
    }

    /// Reduce a Markdown body to plain prose: headings, code, images and
    /// list markers go; link text and emphasized text stay.
    pub fn strip_markdown(body: &str) -> String {
        let out = RE_MD_FENCE.replace_all(body, "");
        let out = RE_MD_HEADING.replace_all(&out, "");
        let out = RE_MD_INLINE_CODE.replace_all(&out, "");
        let out = RE_MD_IMAGE.replace_all(&out, "");
        let out = RE_MD_LINK.replace_all(&out, "$1");
        let out = RE_MD_BULLET.replace_all(&out, "");
        let out = RE_MD_NUMBERED.replace_all(&out, "");
        let out = RE_MD_BOLD.replace_all(&out, "$1");
        let out = RE_MD_ITALIC.replace_all(&out, "$1");
        collapse_whitespace(&out)
    }

    /// Cut `text` to at most `max_chars` characters. Text that has to be cut
    /// ends with `...` and the marker counts toward the bound.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let keep = max_chars.saturating_sub(ELLIPSIS.len());
        let mut out: String = text.chars().take(keep).collect();
        out.push_str(ELLIPSIS);
        out
    }

    pub fn truncate_excerpt(text: &str) -> String {
        truncate_chars(text, EXCERPT_MAX_CHARS)
    }
}

/// Date utilities
pub mod time {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    /// Parse the date formats the sources emit. Naive values are taken as UTC.
    pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Like [`parse_date`], but a missing or unreadable value becomes "now".
    pub fn normalize_date(raw: Option<&str>) -> DateTime<Utc> {
        raw.and_then(parse_date).unwrap_or_else(Utc::now)
    }
}
