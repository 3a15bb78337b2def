use crate::error::ImportError;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const CRAWLER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

/// One named set of request headers tried against a page.
///
/// Recipe sites frequently reject generic scripted clients while serving
/// traffic that looks like a real browser or a well-known crawler, so the
/// fetcher walks these profiles in order until one gets a 2xx response.
#[derive(Debug, Clone, Copy)]
pub struct FetchProfile {
    pub name: &'static str,
    headers: &'static [(&'static str, &'static str)],
}

const DESKTOP_HEADERS: &[(&str, &str)] = &[
    ("user-agent", DESKTOP_USER_AGENT),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
];

const CRAWLER_HEADERS: &[(&str, &str)] = &[
    ("user-agent", CRAWLER_USER_AGENT),
    ("accept", "text/html,application/xhtml+xml"),
];

const MOBILE_HEADERS: &[(&str, &str)] = &[
    ("user-agent", MOBILE_USER_AGENT),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
];

/// Profiles in the order they are attempted.
pub fn default_profiles() -> Vec<FetchProfile> {
    vec![
        FetchProfile {
            name: "desktop",
            headers: DESKTOP_HEADERS,
        },
        FetchProfile {
            name: "crawler",
            headers: CRAWLER_HEADERS,
        },
        FetchProfile {
            name: "mobile",
            headers: MOBILE_HEADERS,
        },
    ]
}

impl FetchProfile {
    fn header_map(&self) -> Result<HeaderMap, ImportError> {
        let mut map = HeaderMap::new();
        for &(name, value) in self.headers {
            map.insert(HeaderName::from_static(name), value.parse()?);
        }
        Ok(map)
    }
}

/// Fetches a page body, falling through an ordered list of header profiles.
pub struct PageFetcher {
    client: Client,
    profiles: Vec<FetchProfile>,
}

impl PageFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, ImportError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            profiles: default_profiles(),
        })
    }

    /// Fetch the page body, trying each profile strictly in order.
    ///
    /// The first 2xx response wins and no further profiles are attempted.
    /// A non-2xx status or transport error moves on to the next profile;
    /// once every profile has failed the error carries the last failure.
    pub async fn fetch(&self, url: &str) -> Result<String, ImportError> {
        let mut last_failure: Option<String> = None;

        for profile in &self.profiles {
            debug!("Fetching {} with '{}' profile", url, profile.name);
            match self.try_profile(url, profile).await {
                Ok(body) => {
                    debug!("'{}' profile succeeded for {}", profile.name, url);
                    return Ok(body);
                }
                Err(reason) => {
                    warn!("'{}' profile failed for {}: {}", profile.name, url, reason);
                    last_failure = Some(reason);
                }
            }
        }

        Err(ImportError::FetchError(last_failure.unwrap_or_else(|| {
            "no fetch profiles configured".to_string()
        })))
    }

    async fn try_profile(&self, url: &str, profile: &FetchProfile) -> Result<String, String> {
        let headers = profile.header_map().map_err(|e| e.to_string())?;
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP status {status}"));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_order() {
        let profiles = default_profiles();
        let names: Vec<&str> = profiles.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["desktop", "crawler", "mobile"]);
    }

    #[test]
    fn test_profiles_build_header_maps() {
        for profile in default_profiles() {
            let map = profile.header_map().unwrap();
            assert!(map.contains_key("user-agent"));
        }
    }

    #[test]
    fn test_desktop_profile_looks_like_a_browser() {
        let profiles = default_profiles();
        let map = profiles[0].header_map().unwrap();
        assert!(map.contains_key("sec-fetch-mode"));
        assert!(map.contains_key("upgrade-insecure-requests"));
    }

    #[tokio::test]
    async fn test_fetch_success_first_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>hello</body></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(None).unwrap();
        let body = fetcher.fetch(&format!("{}/recipe", server.url())).await.unwrap();
        assert!(body.contains("hello"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_all_profiles_fail() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe")
            .with_status(403)
            .expect(3)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(None).unwrap();
        let result = fetcher.fetch(&format!("{}/recipe", server.url())).await;

        match result {
            Err(ImportError::FetchError(reason)) => {
                assert!(reason.contains("403"), "unexpected reason: {reason}");
            }
            other => panic!("expected FetchError, got {other:?}"),
        }
        mock.assert_async().await;
    }
}
