use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::CatalogError;
use crate::models::{Feed, Paged, TitleDetail, TitleSummary, VideosResponse};

/// Sub-resources fetched inline with a title's details.
const DETAIL_APPEND: &str = "credits,recommendations";

/// Image size profiles served by the image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Posters and cast thumbnails.
    Poster,
    /// Full-width backdrops.
    Backdrop,
}

impl ImageSize {
    fn segment(self) -> &'static str {
        match self {
            Self::Poster => "w500",
            Self::Backdrop => "original",
        }
    }
}

/// Error body the catalog sends with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    status_message: Option<String>,
}

/// Thin async client for the catalog. Cheap to clone; clones share the
/// connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    image_base_url: String,
    api_key: String,
    language: String,
}

impl CatalogClient {
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("movie-space/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// Build a GET for `path` with the credential and locale injected ahead
    /// of the call-specific parameters.
    pub fn request(&self, path: &str, params: &[(&str, String)]) -> Result<reqwest::Request, CatalogError> {
        let request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .build()?;
        Ok(request)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, CatalogError> {
        let request = self.request(path, params)?;
        debug!(path, "catalog request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiStatus>(&body)
                .ok()
                .and_then(|s| s.status_message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());
            warn!(path, status = status.as_u16(), %message, "catalog returned an error");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// One page of a listing feed.
    pub async fn feed(&self, feed: Feed, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        match feed {
            Feed::Popular => self.popular(page).await,
            Feed::NowPlaying => self.now_playing(page).await,
            Feed::TopRated => self.top_rated(page).await,
            Feed::Upcoming => self.upcoming(page).await,
        }
    }

    pub async fn popular(&self, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        self.listing(Feed::Popular, page).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        self.listing(Feed::NowPlaying, page).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        self.listing(Feed::TopRated, page).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        self.listing(Feed::Upcoming, page).await
    }

    async fn listing(&self, feed: Feed, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        self.get_json(feed.path(), &[("page", page.to_string())]).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<Paged<TitleSummary>, CatalogError> {
        self.get_json(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn details(&self, id: u64) -> Result<TitleDetail, CatalogError> {
        self.get_json(
            &format!("/movie/{id}"),
            &[("append_to_response", DETAIL_APPEND.to_string())],
        )
        .await
    }

    pub async fn videos(&self, id: u64) -> Result<VideosResponse, CatalogError> {
        self.get_json(&format!("/movie/{id}/videos"), &[]).await
    }

    /// Resolve a partial image path against the CDN.
    pub fn image_url(&self, path: &str, size: ImageSize) -> String {
        image_url(&self.image_base_url, path, size)
    }
}

/// Join a CDN base, a size profile and a partial image path.
pub fn image_url(base: &str, path: &str, size: ImageSize) -> String {
    format!("{}/{}{}", base.trim_end_matches('/'), size.segment(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(base_url: &str) -> CatalogClient {
        let config = AppConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            language: "ru-RU".to_string(),
            ..AppConfig::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    fn query_map(request: &reqwest::Request) -> HashMap<String, String> {
        request.url().query_pairs().into_owned().collect()
    }

    /// Serve one canned HTTP response and hand back the request line.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_request_injects_credentials_and_locale() {
        let client = client_for("https://catalog.example/3/");
        let request = client
            .request(Feed::TopRated.path(), &[("page", "3".to_string())])
            .unwrap();

        assert_eq!(request.url().path(), "/3/movie/top_rated");
        let query = query_map(&request);
        assert_eq!(query["api_key"], "test-key");
        assert_eq!(query["language"], "ru-RU");
        assert_eq!(query["page"], "3");
    }

    #[test]
    fn test_search_query_is_encoded() {
        let client = client_for("https://catalog.example/3");
        let request = client
            .request("/search/movie", &[("query", "the dark knight & co".to_string())])
            .unwrap();
        assert_eq!(query_map(&request)["query"], "the dark knight & co");
        assert!(!request.url().as_str().contains(' '));
    }

    #[test]
    fn test_image_url_profiles() {
        let client = client_for("https://catalog.example/3");
        assert_eq!(
            client.image_url("/abc.jpg", ImageSize::Poster),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            client.image_url("/abc.jpg", ImageSize::Backdrop),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_feed_decodes_page() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"page": 2, "results": [{"id": 1, "title": "A", "vote_average": 7.1}], "total_pages": 5, "total_results": 100}"#,
        )
        .await;
        let client = client_for(&base);

        let page = client.popular(2).await.unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.results[0].title, "A");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /movie/popular?"));
        assert!(request_line.contains("page=2"));
    }

    #[tokio::test]
    async fn test_details_requests_appended_resources() {
        let (base, server) = serve_once("200 OK", r#"{"id": 42, "title": "Answer"}"#).await;
        let client = client_for(&base);

        let detail = client.details(42).await.unwrap();
        assert_eq!(detail.summary.title, "Answer");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /movie/42?"));
        assert!(request_line.contains("append_to_response=credits%2Crecommendations"));
    }

    #[tokio::test]
    async fn test_error_status_carries_service_message() {
        let (base, _server) = serve_once(
            "401 Unauthorized",
            r#"{"status_code": 7, "status_message": "Invalid API key: You must be granted a valid key."}"#,
        )
        .await;
        let client = client_for(&base);

        match client.feed(Feed::TopRated, 1).await {
            Err(CatalogError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.starts_with("Invalid API key"));
            }
            other => panic!("expected status error, got {:?}", other.map(|p| p.page)),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (base, _server) = serve_once("200 OK", r#"{"results": "nope"}"#).await;
        let client = client_for(&base);
        assert!(matches!(client.feed(Feed::Upcoming, 1).await, Err(CatalogError::Decode(_))));
    }
}
