use url::{ParseError, Url};

pub fn to_url(host: &str) -> Result<Url, ParseError> {
    Url::parse(host)
}

/// Appends `path` to `base`, keeping any path prefix the base already carries.
/// `Url::join` would drop the last base segment when it lacks a trailing slash.
pub fn endpoint_url(base: &Url, path: &str) -> Result<Url, ParseError> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    to_url(&format!("{}/{}", base, path))
}

#[cfg(test)]
mod cfg_tests {
    use crate::utils::urls::{endpoint_url, to_url};

    #[test]
    pub fn test_endpoint_url() {
        let base = to_url("http://localhost:8000").unwrap();
        assert_eq!(
            endpoint_url(&base, "/analyze_document").unwrap().as_str(),
            "http://localhost:8000/analyze_document"
        );

        let base = to_url("http://ai.internal:8000/").unwrap();
        assert_eq!(
            endpoint_url(&base, "analyze_document").unwrap().as_str(),
            "http://ai.internal:8000/analyze_document"
        );

        let base = to_url("https://gateway.example.com/fastapi").unwrap();
        assert_eq!(
            endpoint_url(&base, "/analyze_document").unwrap().as_str(),
            "https://gateway.example.com/fastapi/analyze_document"
        );
    }

    #[test]
    pub fn test_to_url_rejects_garbage() {
        assert!(to_url("not a url").is_err());
    }
}
