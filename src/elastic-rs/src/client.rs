use crate::transport::{Credentials, HttpTransport, PreparedRequest, Transport};
use crate::{ClientError, Result};
use elastic_core::{ClientConfig, Header, IndexRecord, BULK_HEADERS, STANDARD_HEADERS, URI_HEALTH, URI_INDICES};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

/// Elasticsearch REST API Client
pub struct Client {
    base_url: String,
    credentials: Credentials,
    transport: Box<dyn Transport>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        #[serde(default)]
        reason: String,
    },
    // Pre-5.x services send the error as a bare string
    Plain(String),
}

impl Client {
    /// Create a new client for the given base URL and basic-auth credentials
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_transport(base_url, username, password, HttpTransport::new())
    }

    /// Create a client from a loaded configuration, applying its TLS options
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::with_transport(
            config.url.clone(),
            config.username.clone(),
            config.password.clone(),
            transport,
        ))
    }

    /// Create a client that sends requests through a custom transport
    pub fn with_transport(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        transport: impl Transport + 'static,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            credentials: Credentials {
                username: username.into(),
                password: password.into(),
            },
            transport: Box::new(transport),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the service is reachable and the credentials are accepted
    pub async fn check_connection(&self) -> Result<()> {
        let url = format!("{}{}", self.base_url, URI_HEALTH);
        self.request("CheckConnection", Method::GET, url, None, STANDARD_HEADERS)
            .await?;
        Ok(())
    }

    /// List user indices in the order the service reports them. System
    /// indices (names starting with `.`) are left out.
    ///
    /// A count that fails to parse is reported as 0 docs. Use
    /// [`IndexRecord::parse_doc_count`] on the returned record to tell a
    /// malformed count from an empty index.
    pub async fn list_indices(&self) -> Result<Vec<IndexRecord>> {
        const OP: &str = "ListIndices";

        let url = format!("{}{}", self.base_url, URI_INDICES);
        let body = self
            .request(OP, Method::GET, url, None, STANDARD_HEADERS)
            .await?;

        let records: Vec<IndexRecord> = serde_json::from_slice(&body)
            .map_err(|source| ClientError::Decode { operation: OP, source })?;

        let mut indices = Vec::with_capacity(records.len());
        for mut record in records {
            if record.name.is_empty() {
                tracing::warn!(uuid = %record.uuid, "Skipping index with empty name");
                continue;
            }
            if record.is_hidden() {
                continue;
            }

            record.docs = match record.parse_doc_count() {
                Ok(Some(n)) => n,
                Ok(None) => {
                    tracing::debug!(index = %record.name, "No document count reported, using 0");
                    0
                }
                Err(e) => {
                    tracing::warn!(
                        index = %record.name,
                        count = ?record.count,
                        "Unparseable document count, using 0: {}",
                        e
                    );
                    0
                }
            };
            indices.push(record);
        }

        Ok(indices)
    }

    /// Create an index. The name is lowercased.
    pub async fn create_index(&self, name: impl AsRef<str>) -> Result<()> {
        let url = self.index_url(name.as_ref());
        self.request("CreateIndex", Method::PUT, url, None, STANDARD_HEADERS)
            .await?;
        Ok(())
    }

    /// Delete an index. The name is lowercased.
    pub async fn delete_index(&self, name: impl AsRef<str>) -> Result<()> {
        let url = self.index_url(name.as_ref());
        self.request("DeleteIndex", Method::DELETE, url, None, STANDARD_HEADERS)
            .await?;
        Ok(())
    }

    /// Add or replace a document. An empty id lets the service generate one.
    pub async fn index_document(
        &self,
        index: impl AsRef<str>,
        id: impl AsRef<str>,
        document: impl Into<String>,
    ) -> Result<()> {
        let url = self.doc_url(index.as_ref(), id.as_ref());
        self.request(
            "IndexDocument",
            Method::POST,
            url,
            Some(document.into()),
            STANDARD_HEADERS,
        )
        .await?;
        Ok(())
    }

    /// Update some fields of an existing document
    pub async fn update_document(
        &self,
        index: impl AsRef<str>,
        id: impl AsRef<str>,
        partial: impl AsRef<str>,
    ) -> Result<()> {
        const OP: &str = "UpdateDocument";

        let id = require_id(OP, id.as_ref())?;
        let url = format!("{}/_update", self.doc_url(index.as_ref(), id));
        let body = format!(r#"{{"doc": {}}}"#, partial.as_ref());

        self.request(OP, Method::POST, url, Some(body), STANDARD_HEADERS)
            .await?;
        Ok(())
    }

    /// Delete a document by id
    pub async fn delete_document(&self, index: impl AsRef<str>, id: impl AsRef<str>) -> Result<()> {
        const OP: &str = "DeleteDocument";

        let id = require_id(OP, id.as_ref())?;
        let url = self.doc_url(index.as_ref(), id);

        self.request(OP, Method::DELETE, url, None, STANDARD_HEADERS)
            .await?;
        Ok(())
    }

    /// Fetch a document by id, returning the response body unmodified
    pub async fn get_document(&self, index: impl AsRef<str>, id: impl AsRef<str>) -> Result<Vec<u8>> {
        let url = self.doc_url(index.as_ref(), id.as_ref());
        self.request("GetDocument", Method::GET, url, None, STANDARD_HEADERS)
            .await
    }

    /// Run a set of newline-delimited JSON actions against an index. The
    /// response is returned as-is; per-item failures are for the caller to
    /// inspect.
    pub async fn bulk(&self, index: impl AsRef<str>, ndjson: impl Into<String>) -> Result<Vec<u8>> {
        let url = format!("{}/_doc/_bulk", self.index_url(index.as_ref()));
        self.request("Bulk", Method::POST, url, Some(ndjson.into()), BULK_HEADERS)
            .await
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{}", self.base_url, index.to_lowercase())
    }

    fn doc_url(&self, index: &str, id: &str) -> String {
        format!("{}/_doc/{}", self.index_url(index), id)
    }

    /// Send one authenticated request and return the body of a 200 response
    async fn request(
        &self,
        operation: &'static str,
        method: Method,
        url: String,
        body: Option<String>,
        headers: &[Header],
    ) -> Result<Vec<u8>> {
        tracing::debug!(operation, method = %method, url = %url, "Sending request");

        let request = PreparedRequest {
            method,
            url,
            body,
            headers: headers.to_vec(),
            credentials: self.credentials.clone(),
        };

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;

        tracing::debug!(operation, status = response.status.as_u16(), "Received response");

        if response.status != StatusCode::OK {
            let reason = error_reason(&response.body);
            tracing::warn!(
                operation,
                status = response.status.as_u16(),
                reason = %reason,
                "Request failed"
            );
            return Err(api_error(operation, response.status, reason));
        }

        Ok(response.body)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

fn require_id<'a>(operation: &'static str, id: &'a str) -> Result<&'a str> {
    if id.is_empty() {
        return Err(ClientError::Validation {
            operation,
            message: "id must be specified".to_string(),
        });
    }
    Ok(id)
}

/// Pull `error.reason` out of a failure body. An empty body gives an empty
/// reason; a body of any other shape gives the decode error text.
fn error_reason(body: &[u8]) -> String {
    if body.iter().all(u8::is_ascii_whitespace) {
        return String::new();
    }

    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: ErrorDetail::Structured { reason },
        }) => reason,
        Ok(ErrorResponse {
            error: ErrorDetail::Plain(reason),
        }) => reason,
        Err(e) => e.to_string(),
    }
}

fn api_error(operation: &'static str, status: StatusCode, reason: String) -> ClientError {
    let status_text = status.canonical_reason().unwrap_or("Unknown Status");
    let message = if reason.is_empty() {
        status_text.to_string()
    } else {
        format!("{} - {}", status_text, reason)
    };

    ClientError::Api {
        operation,
        status: status.as_u16(),
        reason,
        message,
    }
}
