//! Trefle API HTTP client

use crate::endpoint::{Endpoint, Identifier, Method, Relation};
use crate::error::{
    check_argument_value, unsupported_operation, Result, TrefleError, JSON_MESSAGE,
    REDIRECTS_MESSAGE, TIMEOUT_MESSAGE,
};
use crate::types::{Page, Query, RequestParams};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::form_urlencoded;

const BASE_URL: &str = "https://trefle.io/";
const DEFAULT_VERSION: &str = "v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Total request attempts for one call, including the first
const MAX_ATTEMPTS: u32 = 5;
/// Base factor for exponential backoff between attempts
const BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Server statuses worth retrying
const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

const WHAT_VALUES: [&str; 2] = ["plants", "species"];
const MODIFIER_VALUES: [&str; 2] = ["distributions", "genus"];

/// Client for the Trefle botanical reference API
///
/// Fetching methods take `&mut self` because the client keeps the most
/// recently fetched page as its one-entry response cache. Concurrent
/// callers should use one client each.
pub struct TrefleClient {
    token: String,
    version: String,
    base_url: String,
    page_size: Option<u32>,
    http: reqwest::Client,
    result: Option<Page>,
}

impl TrefleClient {
    /// Create a client with the default base URL, version `v1` and a
    /// 30 second timeout
    pub fn new(token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            token: token.into(),
            version: DEFAULT_VERSION.to_string(),
            base_url: BASE_URL.to_string(),
            page_size: None,
            http,
            result: None,
        }
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Select the API generation. Generation `v0` authenticates with a
    /// bearer header; later generations use a `token` query parameter.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Request pages of this size on every call
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Use a custom connect/read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        self
    }

    /// The most recently fetched page, if any
    pub fn cached(&self) -> Option<&Page> {
        self.result.as_ref()
    }

    fn api_version_url(&self) -> String {
        format!("{}api/{}/", self.base_url, self.version)
    }

    fn uses_bearer(&self) -> bool {
        self.version == "v0"
    }

    /// Resolve an endpoint path against the API base. A leading slash
    /// resolves against the bare host, bypassing the versioned prefix.
    fn full_url(&self, endpoint: &str) -> String {
        match endpoint.strip_prefix('/') {
            Some(stripped) => format!("{}{}", self.base_url, stripped),
            None => format!("{}{}", self.api_version_url(), endpoint),
        }
    }

    /// Build request parameters for an endpoint or absolute URL, merging
    /// the default query parameters with call-time ones (call-time wins)
    fn request_params(&self, endpoint: &str, extra: &[(&str, &str)]) -> RequestParams {
        let url = if endpoint.starts_with("http") {
            endpoint.to_string()
        } else {
            self.full_url(endpoint)
        };
        let mut query = Query::new();
        if !self.uses_bearer() {
            query.insert("token".to_string(), self.token.clone());
        }
        if let Some(page_size) = self.page_size {
            query.insert("page_size".to_string(), page_size.to_string());
        }
        for (key, value) in extra {
            query.insert((*key).to_string(), (*value).to_string());
        }
        RequestParams {
            url,
            query,
            method: Method::Get,
            body: None,
        }
    }

    /// The URL with its query string encoded (spaces as `+`); identity
    /// key for the one-entry response cache
    fn parametrized_url(params: &RequestParams) -> String {
        if params.query.is_empty() {
            return params.url.clone();
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.query.iter())
            .finish();
        let separator = if params.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", params.url, separator, encoded)
    }

    /// Issue the request, retrying on retryable server statuses with
    /// exponential backoff
    async fn send_with_retry(&self, params: &RequestParams, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 1;
        loop {
            let request = match params.method {
                Method::Get => self.http.get(url),
                Method::Post => match &params.body {
                    Some(body) => self.http.post(url).json(body),
                    None => self.http.post(url),
                },
            };
            let request = if self.uses_bearer() {
                request.bearer_auth(&self.token)
            } else {
                request
            };

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    error!("{}", TIMEOUT_MESSAGE);
                    return Err(TrefleError::Timeout);
                }
                Err(e) if e.is_redirect() => {
                    error!("{}", REDIRECTS_MESSAGE);
                    return Err(TrefleError::TooManyRedirects);
                }
                Err(e) => {
                    let err = TrefleError::Http(e.to_string());
                    error!("{}", err);
                    return Err(err);
                }
            };

            let status = response.status().as_u16();
            if attempt < MAX_ATTEMPTS && RETRY_STATUSES.contains(&status) {
                let delay = BACKOFF_BASE * 2u32.pow(attempt - 1);
                warn!(
                    "Server returned {}, retrying in {:?} (attempt {}/{})",
                    status, delay, attempt, MAX_ATTEMPTS
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            return Ok(response);
        }
    }

    /// Run a built request through the identity cache, the retrying
    /// transport and outcome classification.
    ///
    /// A repeated request to the exact parametrized URL of the cached
    /// page is answered from the cache without touching the network. On
    /// success the cached page is replaced wholesale; any failure leaves
    /// it untouched.
    async fn fetch(&mut self, params: RequestParams) -> Result<Value> {
        let url = Self::parametrized_url(&params);
        if let Some(page) = &self.result {
            if page.url == url {
                debug!("Returning cached page for {}", url);
                return Ok(page.body.clone());
            }
        }

        debug!("{} {}", params.method, url);
        let response = self.send_with_retry(&params, &url).await?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                let err = TrefleError::Http(e.to_string());
                error!("{}", err);
                return Err(err);
            }
        };

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                error!("{}", TIMEOUT_MESSAGE);
                return Err(TrefleError::Timeout);
            }
            Err(_) => {
                error!("{}", JSON_MESSAGE);
                return Err(TrefleError::Json);
            }
        };

        self.result = Some(Page::new(url, body.clone()));
        Ok(body)
    }

    /// Query a taxonomy endpoint, optionally scoped to one record.
    ///
    /// With an identifier the path is `"<endpoint>/<identifier>"`,
    /// otherwise the bare collection.
    pub async fn endpoint(
        &mut self,
        endpoint: Endpoint,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        let path = match identifier {
            Some(identifier) => format!(
                "{}/{}",
                endpoint,
                urlencoding::encode(&identifier.to_string())
            ),
            None => endpoint.to_string(),
        };
        let params = self.request_params(&path, extra);
        self.fetch(params).await
    }

    /// Dispatch a symbolic operation name: endpoint names query that
    /// endpoint, navigation names follow the matching pagination link.
    /// Unknown names fail without issuing a request.
    pub async fn call(
        &mut self,
        name: &str,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Option<Value>> {
        if let Some(endpoint) = Endpoint::from_name(name) {
            return self.endpoint(endpoint, identifier, extra).await.map(Some);
        }
        if let Some(relation) = Relation::from_name(name) {
            return self.navigate(relation, extra).await;
        }
        Err(unsupported_operation(name))
    }

    pub async fn kingdoms(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Kingdoms, identifier, extra).await
    }

    pub async fn subkingdoms(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Subkingdoms, identifier, extra).await
    }

    pub async fn divisions(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Divisions, identifier, extra).await
    }

    pub async fn division_classes(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::DivisionClasses, identifier, extra).await
    }

    pub async fn division_orders(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::DivisionOrders, identifier, extra).await
    }

    pub async fn families(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Families, identifier, extra).await
    }

    pub async fn genus(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Genus, identifier, extra).await
    }

    pub async fn plants(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Plants, identifier, extra).await
    }

    pub async fn species(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Species, identifier, extra).await
    }

    pub async fn distributions(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.endpoint(Endpoint::Distributions, identifier, extra).await
    }

    /// Full-text search over plants or species
    ///
    /// `what` defaults to `"plants"` and may only be `"plants"` or
    /// `"species"`.
    pub async fn search(
        &mut self,
        q: &str,
        what: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        if let Some(value) = what {
            check_argument_value("what", value, &WHAT_VALUES)?;
        }
        let what = what.unwrap_or("plants");
        let mut query = vec![("q", q)];
        query.extend_from_slice(extra);
        let params = self.request_params(&format!("{}/search", what), &query);
        self.fetch(params).await
    }

    /// Report a data problem on a plant or species record
    pub async fn report_error(
        &mut self,
        identifier: Identifier,
        notes: &str,
        what: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        if let Some(value) = what {
            check_argument_value("what", value, &WHAT_VALUES)?;
        }
        let what = what.unwrap_or("plants");
        let path = format!(
            "{}/{}/report",
            what,
            urlencoding::encode(&identifier.to_string())
        );
        let mut params = self.request_params(&path, extra);
        params.method = Method::Post;
        params.body = Some(json!({ "notes": notes }));
        self.fetch(params).await
    }

    /// All plants within a distribution zone or a genus
    ///
    /// `modifier` may only be `"distributions"` or `"genus"`.
    pub async fn plants_by(
        &mut self,
        modifier: &str,
        identifier: Identifier,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        check_argument_value("modifier", modifier, &MODIFIER_VALUES)?;
        let path = format!(
            "{}/{}/plants",
            modifier,
            urlencoding::encode(&identifier.to_string())
        );
        let params = self.request_params(&path, extra);
        self.fetch(params).await
    }

    /// List all corrections, or fetch one by identifier
    pub async fn corrections(
        &mut self,
        identifier: Option<Identifier>,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        let path = match identifier {
            Some(identifier) => format!(
                "corrections/{}",
                urlencoding::encode(&identifier.to_string())
            ),
            None => "corrections".to_string(),
        };
        let params = self.request_params(&path, extra);
        self.fetch(params).await
    }

    /// Submit a correction against a species record
    pub async fn submit_correction(
        &mut self,
        identifier: Identifier,
        correction: Value,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        let path = format!(
            "corrections/species/{}",
            urlencoding::encode(&identifier.to_string())
        );
        let mut params = self.request_params(&path, extra);
        params.method = Method::Post;
        params.body = Some(correction);
        self.fetch(params).await
    }

    /// Claim a browser-scoped JWT bound to the given origin.
    ///
    /// The auth endpoint lives outside the versioned API prefix.
    pub async fn auth(&mut self, origin: &str, extra: &[(&str, &str)]) -> Result<Value> {
        let mut query = vec![("origin", origin)];
        query.extend_from_slice(extra);
        let mut params = self.request_params("/api/auth/claim", &query);
        params.method = Method::Post;
        self.fetch(params).await
    }

    /// Follow a pagination relation from the most recently fetched page.
    ///
    /// Returns `Ok(None)` when nothing is cached yet or the cached page
    /// has no such link; absence of a page is normal, not an error.
    pub async fn navigate(
        &mut self,
        relation: Relation,
        extra: &[(&str, &str)],
    ) -> Result<Option<Value>> {
        let target = match self.result.as_ref().and_then(|page| page.link(relation)) {
            Some(target) => target.to_string(),
            None => return Ok(None),
        };
        let params = self.request_params(&target, extra);
        self.fetch(params).await.map(Some)
    }

    pub async fn next(&mut self, extra: &[(&str, &str)]) -> Result<Option<Value>> {
        self.navigate(Relation::Next, extra).await
    }

    pub async fn prev(&mut self, extra: &[(&str, &str)]) -> Result<Option<Value>> {
        self.navigate(Relation::Prev, extra).await
    }

    pub async fn first(&mut self, extra: &[(&str, &str)]) -> Result<Option<Value>> {
        self.navigate(Relation::First, extra).await
    }

    pub async fn last(&mut self, extra: &[(&str, &str)]) -> Result<Option<Value>> {
        self.navigate(Relation::Last, extra).await
    }
}

impl fmt::Display for TrefleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trefle API client with token id: '{}', querying version: '{}'",
            self.token, self.version
        )
    }
}
