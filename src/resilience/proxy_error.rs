//! Proxy-side failure reported through the `x-lunar-error` response header.

use http::HeaderMap;

use crate::routing::headers::ERROR;

/// A failure the proxy reported instead of the destination's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyError {
    pub code: String,
}

impl ProxyError {
    /// Present whenever the header is, even with an empty or unreadable value.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(ERROR)?;
        let code = value.to_str().unwrap_or_default().trim().to_string();
        Some(Self { code })
    }

    /// The code if it is a known one, "unknown" otherwise.
    pub fn code_label(&self) -> &'static str {
        match self.code.as_str() {
            "1" => "1",
            "2" => "2",
            "3" => "3",
            "4" => "4",
            "5" => "5",
            _ => "unknown",
        }
    }

    pub fn message(&self) -> &'static str {
        match self.code.as_str() {
            "1" => {
                "Proxy could not find the x-lunar-host header and is not set to use query params"
            }
            "2" => "The endpoint cannot be reached",
            "3" => "Gateway timeout",
            "4" => "Proxy could not find the endpoint",
            "5" => "Proxy could not resolve host",
            _ => "Unknown error, check the proxy logs for more information",
        }
    }
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "proxy error {:?}: {}", self.code, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_absent_header() {
        assert_eq!(ProxyError::from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_known_code() {
        let mut headers = HeaderMap::new();
        headers.insert(ERROR, HeaderValue::from_static("3"));
        let err = ProxyError::from_headers(&headers).unwrap();
        assert_eq!(err.code, "3");
        assert_eq!(err.message(), "Gateway timeout");
        assert_eq!(err.code_label(), "3");
    }

    #[test]
    fn test_unknown_codes_share_a_label() {
        for raw in ["", "42", "timeout", "1 "] {
            let mut headers = HeaderMap::new();
            headers.insert(ERROR, HeaderValue::from_str(raw).unwrap());
            let err = ProxyError::from_headers(&headers).unwrap();
            let expected = if raw == "1 " { "1" } else { "unknown" };
            assert_eq!(err.code_label(), expected, "{raw:?}");
        }
    }

    #[test]
    fn test_empty_value_still_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert(ERROR, HeaderValue::from_static(""));
        let err = ProxyError::from_headers(&headers).unwrap();
        assert!(err.message().starts_with("Unknown error"));
    }

    #[test]
    fn test_first_value_used() {
        let mut headers = HeaderMap::new();
        headers.append(ERROR, HeaderValue::from_static("5"));
        headers.append(ERROR, HeaderValue::from_static("2"));
        assert_eq!(ProxyError::from_headers(&headers).unwrap().code, "5");
    }
}
