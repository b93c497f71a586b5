//! Substring heuristics over the User-Agent header. Deliberately crude:
//! good enough for the notification messages and the visitor log.

pub fn detect_platform(user_agent: &str) -> &'static str {
    if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        "iOS"
    } else if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Mac") {
        "MacOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

pub fn detect_browser(user_agent: &str) -> &'static str {
    if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else if user_agent.contains("Edge") {
        "Edge"
    } else if user_agent.contains("Opera") {
        "Opera"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_CHROME: &str =
        "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120.0 Mobile Safari/537.36";
    const IPHONE_SAFARI: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Version/17.0 Safari/605.1.15";
    const WINDOWS_FIREFOX: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0";

    #[test]
    fn platform_detection() {
        assert_eq!(detect_platform(ANDROID_CHROME), "Android");
        assert_eq!(detect_platform(IPHONE_SAFARI), "iOS");
        assert_eq!(detect_platform(WINDOWS_FIREFOX), "Windows");
        assert_eq!(detect_platform("curl/8.4.0"), "Unknown");
    }

    #[test]
    fn browser_detection() {
        assert_eq!(detect_browser(ANDROID_CHROME), "Chrome");
        assert_eq!(detect_browser(IPHONE_SAFARI), "Safari");
        assert_eq!(detect_browser(WINDOWS_FIREFOX), "Firefox");
        assert_eq!(detect_browser("curl/8.4.0"), "Unknown");
    }
}
