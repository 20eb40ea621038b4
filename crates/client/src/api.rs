//! REST API client for the asset catalog.
//!
//! Wraps the catalog HTTP API (assets, tags, auth, upload presign) using
//! [`reqwest`]. Each [`ApiClient`] owns a cookie jar, so a login made
//! through one instance authenticates every later call on it, and the
//! `csrf_token` cookie the API hands out is echoed back on mutating calls.

use std::sync::Arc;
use std::time::Duration;

use assethub_core::asset::{Asset, AssetList, CreatedAsset, NewAsset};
use assethub_core::tag::{Tag, TagList, TagName};
use assethub_core::types::DbId;
use assethub_core::upload::{DownloadUrl, PresignResult};
use assethub_core::user::{LoginRequest, SignupRequest, User};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use validator::Validate;

use crate::config::{parse_api_url, ClientConfig};
use crate::csrf;
use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Collaborator trait
// ---------------------------------------------------------------------------

/// The catalog operations the store and upload workflow depend on.
///
/// [`ApiClient`] is the HTTP implementation; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /assets`
    async fn list_assets(&self) -> Result<Vec<Asset>, ApiError>;

    /// `POST /assets`, returning exactly one created asset.
    async fn create_asset(&self, payload: &NewAsset) -> Result<Asset, ApiError>;

    /// `DELETE /assets/{id}`
    async fn delete_asset(&self, id: DbId) -> Result<(), ApiError>;

    /// `GET /tags`
    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError>;

    /// `POST /tags`
    async fn create_tag(&self, name: &TagName) -> Result<Tag, ApiError>;

    /// `PUT /tags/{id}`
    async fn update_tag(&self, id: DbId, name: &TagName) -> Result<Tag, ApiError>;

    /// `DELETE /tags/{id}`
    async fn delete_tag(&self, id: DbId) -> Result<(), ApiError>;

    /// Request a one-time storage write target for `filename`.
    async fn presign_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<PresignResult, ApiError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client for the catalog API.
#[derive(Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    api_url: String,
    /// Parsed `api_url`, used to look up cookies for this API.
    cookie_url: Url,
    presign_path: String,
}

impl ApiClient {
    /// Create a client with a fresh cookie session.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    /// Create a client around an existing cookie jar (useful for sharing a
    /// session or seeding cookies).
    pub fn with_jar(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self, ApiError> {
        let cookie_url = parse_api_url(&config.api_url)?;

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            jar,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            cookie_url,
            presign_path: config.presign_path.clone(),
        })
    }

    /// The anti-forgery token currently held in the session, if any.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.cookie_url)?;
        let header = header.to_str().ok()?;
        csrf::token_from_cookie_header(header).map(str::to_string)
    }

    /// Return the logged-in user, or `None` when the session is anonymous.
    #[tracing::instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let response = self.request(Method::GET, "/auth/").send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    /// Log in; the session cookie is kept in this client's jar.
    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, ApiError> {
        credentials.validate()?;
        let response = self
            .request(Method::POST, "/auth/login")
            .json(credentials)
            .send()
            .await?;
        let user: User = Self::parse_response(response).await?;
        tracing::info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    /// Create an account and log in as it.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError> {
        request.validate()?;
        let response = self
            .request(Method::POST, "/auth/signup")
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// End the session on the server. The cookie jar keeps whatever
    /// cookies the response sets.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.request(Method::POST, "/auth/logout").send().await?;
        Self::check_status(response).await
    }

    /// Get a short-lived signed read URL for a stored object key.
    #[tracing::instrument(skip(self))]
    pub async fn presign_download(&self, key: &str) -> Result<String, ApiError> {
        let response = self
            .request(Method::GET, "/uploads/get-url")
            .query(&[("key", key)])
            .send()
            .await?;
        let download: DownloadUrl = Self::parse_response(response).await?;
        Ok(download.url)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Start a request against the API, attaching the anti-forgery header
    /// to mutating methods when the session holds a token.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = if csrf::is_mutating(&method) {
            self.csrf_token()
        } else {
            None
        };
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.header(csrf::CSRF_HEADER, token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`] carrying
    /// the server's message on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), body = %body, "API call rejected");
            return Err(ApiError::from_status(status, &body));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for ApiClient {
    #[tracing::instrument(skip(self))]
    async fn list_assets(&self) -> Result<Vec<Asset>, ApiError> {
        let response = self.request(Method::GET, "/assets").send().await?;
        let list: AssetList = Self::parse_response(response).await?;
        Ok(list.into_vec())
    }

    #[tracing::instrument(skip(self, payload), fields(name = %payload.name))]
    async fn create_asset(&self, payload: &NewAsset) -> Result<Asset, ApiError> {
        let response = self
            .request(Method::POST, "/assets")
            .json(payload)
            .send()
            .await?;
        let created: CreatedAsset = Self::parse_response(response).await?;
        created
            .into_asset()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_asset(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/assets/{id}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let response = self.request(Method::GET, "/tags").send().await?;
        let list: TagList = Self::parse_response(response).await?;
        Ok(list.into_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn create_tag(&self, name: &TagName) -> Result<Tag, ApiError> {
        let response = self
            .request(Method::POST, "/tags")
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_tag(&self, id: DbId, name: &TagName) -> Result<Tag, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/tags/{id}"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_tag(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/tags/{id}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn presign_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<PresignResult, ApiError> {
        let response = self
            .request(Method::GET, &self.presign_path)
            .query(&[("filename", filename), ("contentType", content_type)])
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Accept one connection on a local port, answer it with `status` and
    /// `body`, and hand back the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&raw) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });
        (format!("http://{addr}/api"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..head_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= head_end + 4 + length
    }

    fn client_for(api_url: &str, cookie: Option<&str>) -> ApiClient {
        let config = ClientConfig::new(api_url);
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = cookie {
            jar.add_cookie_str(cookie, &Url::parse(api_url).unwrap());
        }
        ApiClient::with_jar(&config, jar).unwrap()
    }

    fn client_with_cookie(cookie: Option<&str>) -> ApiClient {
        let config = ClientConfig::new("http://localhost:5000/api/");
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = cookie {
            let url = Url::parse("http://localhost:5000/").unwrap();
            jar.add_cookie_str(cookie, &url);
        }
        ApiClient::with_jar(&config, jar).unwrap()
    }

    #[test]
    fn url_joins_base_and_path() {
        let client = client_with_cookie(None);
        assert_eq!(client.url("/tags/3"), "http://localhost:5000/api/tags/3");
    }

    #[test]
    fn csrf_token_read_from_jar() {
        let client = client_with_cookie(Some("csrf_token=tok123; Path=/"));
        assert_eq!(client.csrf_token().as_deref(), Some("tok123"));
    }

    #[test]
    fn mutating_request_carries_token() {
        let client = client_with_cookie(Some("csrf_token=tok123; Path=/"));
        let request = client
            .request(Method::DELETE, "/assets/4")
            .build()
            .unwrap();
        assert_eq!(
            request
                .headers()
                .get(csrf::CSRF_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("tok123")
        );
    }

    #[test]
    fn read_request_has_no_token() {
        let client = client_with_cookie(Some("csrf_token=tok123; Path=/"));
        let request = client.request(Method::GET, "/assets").build().unwrap();
        assert!(request.headers().get(csrf::CSRF_HEADER).is_none());
    }

    #[test]
    fn no_cookie_means_no_header() {
        let client = client_with_cookie(None);
        assert!(client.csrf_token().is_none());
        let request = client.request(Method::POST, "/tags").build().unwrap();
        assert!(request.headers().get(csrf::CSRF_HEADER).is_none());
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ClientConfig::new("not a url");
        let err = ApiClient::new(&config).unwrap_err();
        assert_matches!(&err, ApiError::Config(c) if c.var == "ASSETHUB_API_URL");
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[tokio::test]
    async fn login_validates_before_sending() {
        // Port 9 (discard) is never contacted: validation fails first.
        let client = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9/api")).unwrap();
        let result = client
            .login(&LoginRequest {
                email: "nope".into(),
                password: "pw".into(),
            })
            .await;
        assert_matches!(result, Err(ApiError::Invalid(_)));
    }

    #[tokio::test]
    async fn anonymous_session_has_no_current_user() {
        let (url, server) = serve_once("401 UNAUTHORIZED", r#"{"error":"Unauthorized"}"#).await;
        let client = client_for(&url, None);

        assert_eq!(client.current_user().await.unwrap(), None);
        assert!(server.await.unwrap().starts_with("GET /api/auth/ HTTP/1.1"));
    }

    #[tokio::test]
    async fn current_user_is_returned_when_logged_in() {
        let (url, server) =
            serve_once("200 OK", r#"{"id":1,"username":"Demo","email":"demo@aa.io"}"#).await;
        let client = client_for(&url, None);

        let user = client.current_user().await.unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.username.as_deref(), Some("Demo"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn current_user_surfaces_other_failures() {
        let (url, server) = serve_once("500 INTERNAL SERVER ERROR", r#"{"error":"boom"}"#).await;
        let client = client_for(&url, None);

        let err = client.current_user().await.unwrap_err();
        assert_matches!(err, ApiError::Status { status: 500, ref message } if message == "boom");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn signup_posts_credentials_with_token() {
        let (url, server) =
            serve_once("200 OK", r#"{"id":7,"username":"ana","email":"ana@example.com"}"#).await;
        let client = client_for(&url, Some("csrf_token=tok123; Path=/"));

        let user = client
            .signup(&SignupRequest {
                username: "ana".into(),
                email: "ana@example.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, 7);
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/auth/signup HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-csrftoken: tok123"));
        assert!(request.contains(r#""username":"ana""#));
        assert!(request.contains(r#""email":"ana@example.com""#));
    }

    #[tokio::test]
    async fn signup_validates_before_sending() {
        let client = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9/api")).unwrap();
        let result = client
            .signup(&SignupRequest {
                username: String::new(),
                email: "ana@example.com".into(),
                password: "secret".into(),
            })
            .await;
        assert_matches!(result, Err(ApiError::Invalid(_)));
    }

    #[tokio::test]
    async fn logout_is_a_post_with_token() {
        let (url, server) = serve_once("200 OK", "{}").await;
        let client = client_for(&url, Some("csrf_token=tok123; Path=/"));

        client.logout().await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/auth/logout HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-csrftoken: tok123"));
    }

    #[tokio::test]
    async fn download_url_is_requested_by_key() {
        let (url, server) = serve_once("200 OK", r#"{"url":"https://s3/get/abc123.png?sig=1"}"#).await;
        let client = client_for(&url, Some("csrf_token=tok123; Path=/"));

        let signed = client.presign_download("abc123.png").await.unwrap();

        assert_eq!(signed, "https://s3/get/abc123.png?sig=1");
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/uploads/get-url?key=abc123.png HTTP/1.1"));
        assert!(!request.to_ascii_lowercase().contains("x-csrftoken"));
    }

    #[tokio::test]
    async fn download_url_failure_keeps_server_message() {
        let (url, server) = serve_once("400 BAD REQUEST", r#"{"error":"key required"}"#).await;
        let client = client_for(&url, None);

        let err = client.presign_download("").await.unwrap_err();
        assert_eq!(err.to_string(), "key required");
        server.await.unwrap();
    }
}
