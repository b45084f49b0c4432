use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use std::sync::atomic::{AtomicUsize, Ordering};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:134.0) Gecko/20100101 Firefox/134.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36",
];

/// Round-robin browser headers so consecutive requests don't share a fingerprint.
/// Each adapter owns its own rotator.
#[derive(Debug)]
pub struct HeaderRotator {
    referer: &'static str,
    extra: Vec<(&'static str, &'static str)>,
    next: AtomicUsize,
}

impl HeaderRotator {
    pub fn new(referer: &'static str) -> Self {
        Self {
            referer,
            extra: Vec::new(),
            next: AtomicUsize::new(0),
        }
    }

    /// Add a fixed header sent with every request
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.extra.push((name, value));
        self
    }

    pub fn next_headers(&self) -> HeaderMap {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % USER_AGENTS.len();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENTS[i]));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-NG,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static(self.referer));
        for (name, value) in &self.extra {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotates() {
        let rotator = HeaderRotator::new("https://www.sportybet.com/ng/sport/football/");
        let first = rotator.next_headers();
        let second = rotator.next_headers();
        assert_ne!(first.get(USER_AGENT), second.get(USER_AGENT));

        for _ in 0..USER_AGENTS.len() - 2 {
            rotator.next_headers();
        }
        assert_eq!(rotator.next_headers().get(USER_AGENT), first.get(USER_AGENT));
    }

    #[test]
    fn test_extra_headers_are_sent() {
        let rotator = HeaderRotator::new("https://www.sportybet.com/").with_header("clientid", "web");
        let headers = rotator.next_headers();
        assert_eq!(headers.get("clientid").unwrap(), "web");
        assert_eq!(headers.get(REFERER).unwrap(), "https://www.sportybet.com/");
    }
}
