use axum::http::HeaderMap;
use serde::Serialize;

use crate::state::AppState;
use axum::Router;

pub mod agent;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

/// Snapshot of one request's client, built from headers only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorInfo {
    pub ip: String,
    pub user_agent: String,
    pub platform: String,
    pub browser: String,
    pub language: String,
    pub path: String,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl VisitorInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        // Proxies append to x-forwarded-for; the first entry is the client.
        let ip = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("unknown")
            .to_string();
        let user_agent = header_str(headers, "user-agent").unwrap_or("Unknown").to_string();

        Self {
            platform: agent::detect_platform(&user_agent).to_string(),
            browser: agent::detect_browser(&user_agent).to_string(),
            language: header_str(headers, "accept-language")
                .unwrap_or("Unknown")
                .to_string(),
            path: header_str(headers, "referer").unwrap_or("/").to_string(),
            ip,
            user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn captures_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert(
            "user-agent",
            HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0"),
        );
        headers.insert("accept-language", HeaderValue::from_static("id-ID,id;q=0.9"));
        headers.insert("referer", HeaderValue::from_static("/posts"));

        let info = VisitorInfo::from_headers(&headers);
        assert_eq!(info.ip, "203.0.113.9");
        assert_eq!(info.platform, "Windows");
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.language, "id-ID,id;q=0.9");
        assert_eq!(info.path, "/posts");
    }

    #[test]
    fn missing_headers_fall_back() {
        let info = VisitorInfo::from_headers(&HeaderMap::new());
        assert_eq!(info.ip, "unknown");
        assert_eq!(info.user_agent, "Unknown");
        assert_eq!(info.platform, "Unknown");
        assert_eq!(info.browser, "Unknown");
        assert_eq!(info.path, "/");
    }

    #[test]
    fn serializes_camel_case() {
        let info = VisitorInfo::from_headers(&HeaderMap::new());
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(r#""userAgent""#));
    }
}
