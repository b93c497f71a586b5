//! Pure input checks shared by the auth and posts handlers. Nothing in
//! here touches the store; handlers reject before any query runs.

use lazy_static::lazy_static;
use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Minimum 6 characters with at least one letter and one digit. Applied to
/// registration and password change alike.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Trim and escape the HTML-significant characters before the text is
/// stored or echoed back.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

pub fn is_valid_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Absent or non-numeric values fall back to page=1 / limit=10; explicit
/// out-of-range values are rejected.
pub fn validate_pagination(
    page: Option<&str>,
    limit: Option<&str>,
) -> Result<Pagination, String> {
    let page = page.and_then(|v| v.parse::<i64>().ok()).unwrap_or(1);
    let limit = limit.and_then(|v| v.parse::<i64>().ok()).unwrap_or(10);

    if page < 1 {
        return Err("page must be at least 1".into());
    }
    if !(1..=100).contains(&limit) {
        return Err("limit must be between 1 and 100".into());
    }

    Ok(Pagination { page, limit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(is_valid_email("demo@example.com"));
        assert!(is_valid_email("a.b-c@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn password_needs_length_letter_and_digit() {
        assert!(is_strong_password("abc123"));
        assert!(is_strong_password("longerpassword1"));
        assert!(!is_strong_password("ab1")); // too short
        assert!(!is_strong_password("abcdef")); // no digit
        assert!(!is_strong_password("123456")); // no letter
    }

    #[test]
    fn sanitize_escapes_markup() {
        assert_eq!(
            sanitize_text("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt;"
        );
        assert_eq!(sanitize_text(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn sanitize_trims_and_keeps_plain_text() {
        assert_eq!(sanitize_text("  a quiet poem  "), "a quiet poem");
    }

    #[test]
    fn url_check() {
        assert!(is_valid_url("https://example.com/song.mp3"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn pagination_defaults() {
        let p = validate_pagination(None, None).unwrap();
        assert_eq!(p, Pagination { page: 1, limit: 10 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn pagination_non_numeric_falls_back() {
        let p = validate_pagination(Some("abc"), Some("xyz")).unwrap();
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn pagination_rejects_out_of_bounds() {
        assert!(validate_pagination(Some("0"), None).is_err());
        assert!(validate_pagination(None, Some("0")).is_err());
        assert!(validate_pagination(None, Some("500")).is_err());
    }

    #[test]
    fn pagination_offset_math() {
        let p = validate_pagination(Some("3"), Some("20")).unwrap();
        assert_eq!(p.offset(), 40);
    }
}
