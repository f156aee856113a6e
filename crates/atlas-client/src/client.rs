//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use atlas_config::{Connection, ConnectionResolver, Secret};
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::api::{EntitiesApi, SearchApi, TypeDefsApi};
use crate::error::{Error, Result, classify_status};
use crate::types::ServerResponse;

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of hits requested per search page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// REST prefix for every catalog endpoint.
const API_PREFIX: &str = "api/atlas/v2/";

/// Atlas catalog client.
///
/// Bound to one connection for its lifetime. Clones share the same HTTP
/// session, which pools TCP connections across calls. Every call blocks the
/// current thread; the client never retries.
///
/// # Example
///
/// ```no_run
/// use atlas_client::{AttributeFilter, CatalogClient};
///
/// # fn example() -> atlas_client::Result<()> {
/// let client = CatalogClient::builder()
///     .base_url("http://localhost:21000")
///     .credentials("admin", "admin")
///     .build()?;
///
/// let hits = client
///     .search()
///     .by_attributes(&AttributeFilter::new().with("name", "placements.csv"))?;
/// println!("{} hits", hits.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::blocking::Client,
    pub(crate) base_url: Url,
    pub(crate) username: String,
    pub(crate) secret: Secret,
    pub(crate) timeout: Duration,
    pub(crate) page_size: usize,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("username", &self.inner.username)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl CatalogClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client for a resolved connection.
    pub fn from_connection(connection: &Connection) -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(connection.base_url())
            .credentials(&connection.username, connection.secret.expose());
        if let Some(timeout) = connection.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Resolve `connection_id` and build a client for it.
    pub fn connect<R>(resolver: &R, connection_id: &str) -> Result<Self>
    where
        R: ConnectionResolver + ?Sized,
    {
        let connection = resolver.resolve(connection_id)?;
        tracing::debug!(
            connection = %connection.id,
            url = %connection.base_url(),
            "connecting to catalog"
        );
        Self::from_connection(&connection)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Hits requested per search page unless a call overrides it.
    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the type definitions API.
    pub fn typedefs(&self) -> TypeDefsApi {
        TypeDefsApi::new(self.clone())
    }

    /// Access the entities API.
    pub fn entities(&self) -> EntitiesApi {
        EntitiesApi::new(self.clone())
    }

    /// Access the search API.
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("{}{}", API_PREFIX, path))
            .map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) fn get(&self, path: &str) -> Result<ServerResponse> {
        self.get_with_query(path, &[] as &[(&str, &str)])
    }

    /// Make a GET request with query parameters.
    pub(crate) fn get_with_query<Q>(&self, path: &str, query: &Q) -> Result<ServerResponse>
    where
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(method = "GET", url = %url, "catalog request");
        let request = self.inner.http.get(url).query(query);
        self.send(request)
    }

    /// Make a POST request with a JSON body.
    pub(crate) fn post(&self, path: &str, body: &Value) -> Result<ServerResponse> {
        let url = self.url(path)?;
        tracing::debug!(method = "POST", url = %url, "catalog request");
        let request = self.inner.http.post(url).json(body);
        self.send(request)
    }

    /// Authenticate, bound by the timeout, send, and classify the response.
    fn send(&self, request: RequestBuilder) -> Result<ServerResponse> {
        let response = request
            .basic_auth(&self.inner.username, Some(self.inner.secret.expose()))
            .timeout(self.inner.timeout)
            .send()?;
        handle_response(response)
    }
}

/// Handle a response, extracting the body or error.
fn handle_response(response: Response) -> Result<ServerResponse> {
    let status = response.status();
    let text = response.text()?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "catalog returned an error status");
        return Err(classify_status(status.as_u16(), text));
    }

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|e| Error::MalformedResponse {
            reason: format!("response body is not JSON: {}", e),
            body: text.clone(),
        })?
    };

    Ok(ServerResponse {
        status: status.as_u16(),
        body,
    })
}

/// Builder for creating a [`CatalogClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    username: Option<String>,
    secret: Option<Secret>,
    timeout: Duration,
    page_size: usize,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            username: None,
            secret: None,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: None,
        }
    }

    /// Set the base URL of the catalog, e.g. `http://atlas:21000`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the basic-auth credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.secret = Some(Secret::new(password));
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of hits requested per search page.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CatalogClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;
        let username = self
            .username
            .ok_or_else(|| Error::Config("credentials are required".to_string()))?;
        let secret = self
            .secret
            .ok_or_else(|| Error::Config("credentials are required".to_string()))?;
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be positive".to_string()));
        }

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("atlas-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(CatalogClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                username,
                secret,
                timeout: self.timeout,
                page_size: self.page_size,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
