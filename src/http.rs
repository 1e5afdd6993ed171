// src/http.rs
// Shared HTTP client and API endpoint helpers

use std::time::Duration;
use url::Url;

use crate::error::Result;

/// Default request timeout for config fetches and tracking posts
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create the shared HTTP client.
///
/// Built once at startup and handed to both the config source and the
/// event sink so they share one connection pool.
pub fn create_shared_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Join path segments onto the API base, percent-encoding each segment
fn endpoint(api_base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(api_base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// `GET {API_BASE}/api/website/{publicKey}/config`
pub fn config_url(api_base: &str, public_key: &str) -> Result<Url> {
    endpoint(api_base, &["api", "website", public_key, "config"])
}

/// `POST {API_BASE}/api/widget/{widgetId}/track`
pub fn track_url(api_base: &str, widget_id: &str) -> Result<Url> {
    endpoint(api_base, &["api", "widget", widget_id, "track"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_shared_client() {
        let client = create_shared_client(DEFAULT_TIMEOUT);
        drop(client);
    }

    #[test]
    fn test_config_url() {
        let url = config_url("http://127.0.0.1:5000", "pk-123").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/website/pk-123/config");
    }

    #[test]
    fn test_track_url_with_trailing_slash_base() {
        let url = track_url("https://widgets.example.com/", "w-1").unwrap();
        assert_eq!(url.as_str(), "https://widgets.example.com/api/widget/w-1/track");
    }

    #[test]
    fn test_segments_are_encoded() {
        let url = config_url("http://localhost:5000", "a/b c").unwrap();
        assert_eq!(url.path(), "/api/website/a%2Fb%20c/config");
    }

    #[test]
    fn test_invalid_base() {
        assert!(config_url("not a url", "pk").is_err());
    }
}
