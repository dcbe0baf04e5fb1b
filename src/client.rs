//! HTTP client for the provisioning server REST API
//!
//! Thin typed layer over `reqwest`: every path is relative to `<base_url>/api/`,
//! create bodies are wrapped in the singular resource key, and non-success
//! statuses become [`Error::NotFound`] or [`Error::Http`].

use crate::config::{Credentials, HarnessConfig};
use crate::{Error, Result};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A server resource addressable as `<COLLECTION>/<id>`.
pub trait Resource: DeserializeOwned {
    /// Collection path relative to the API root, e.g. `environments`
    const COLLECTION: &'static str;
    /// Key wrapping create payloads, e.g. `{"environment": {...}}`
    const PAYLOAD_KEY: &'static str;

    fn id(&self) -> u64;

    /// Path of a single member of the collection
    fn member_path(id: u64) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }
}

/// Envelope returned by index endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub subtotal: Option<u64>,
    pub results: Vec<T>,
}

/// Client for a provisioning server
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl ApiClient {
    /// Build a client from harness configuration
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");

        match &self.credentials {
            Some(creds) => builder.basic_auth(&creds.username, Some(&creds.password)),
            None => builder,
        }
    }

    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response> {
        debug!(method = %method, path = %path, "Sending request");
        let resp = builder.send().await?;
        let status = resp.status();
        debug!(method = %method, path = %path, status = status.as_u16(), "Received response");

        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                path: path.to_string(),
            });
        }

        // Body is best-effort context; a failed read leaves it empty.
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Http {
            status: status.as_u16(),
            path: path.to_string(),
            body,
        })
    }

    /// GET a path and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .send(Method::GET, path, self.request(Method::GET, path))
            .await?;
        Ok(resp.json().await?)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        let resp = self.send(Method::POST, path, builder).await?;
        Ok(resp.json().await?)
    }

    /// DELETE a path, discarding whatever the server returns
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, self.request(Method::DELETE, path))
            .await?;
        Ok(())
    }

    /// Create a resource under its own collection
    pub async fn create<R, B>(&self, draft: &B) -> Result<R>
    where
        R: Resource,
        B: Serialize,
    {
        self.create_at::<R, B>(R::COLLECTION, draft).await
    }

    /// Create a resource by posting to `path`, wrapping the draft in `R::PAYLOAD_KEY`
    pub async fn create_at<R, B>(&self, path: &str, draft: &B) -> Result<R>
    where
        R: Resource,
        B: Serialize,
    {
        let mut payload = serde_json::Map::new();
        payload.insert(R::PAYLOAD_KEY.to_string(), serde_json::to_value(draft)?);
        let created: R = self.post(path, &payload).await?;
        debug!(collection = R::COLLECTION, id = created.id(), "Created resource");
        Ok(created)
    }

    /// Read a resource by id
    pub async fn read<R: Resource>(&self, id: u64) -> Result<R> {
        self.get(&R::member_path(id)).await
    }

    /// Delete a resource by id
    pub async fn remove<R: Resource>(&self, id: u64) -> Result<()> {
        self.delete(&R::member_path(id)).await
    }

    /// List the first page of a collection
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
        let page: ListResponse<R> = self.get(R::COLLECTION).await?;
        Ok(page.results)
    }
}
