//! Elastic Client Library
//!
//! HTTP client for the index, document and bulk endpoints of an
//! Elasticsearch-compatible REST API.
//!
//! ```rust,no_run
//! use elastic_rs::Client;
//!
//! # async fn example() -> elastic_rs::Result<()> {
//! let client = Client::new("http://localhost:9200", "elastic", "changeme");
//! client.check_connection().await?;
//! client.create_index("Articles").await?;
//! client.index_document("articles", "1", r#"{"title": "Hello"}"#).await?;
//! for index in client.list_indices().await? {
//!     println!("{} ({} docs)", index.name, index.docs);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod transport;

pub use client::Client;
pub use elastic_core::{ClientConfig, Header, Health, IndexRecord, IndexStatus};
pub use transport::{BoxError, Credentials, HttpTransport, PreparedRequest, RawResponse, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{operation}: request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{operation}: {message}")]
    Api {
        operation: &'static str,
        status: u16,
        reason: String,
        message: String,
    },

    #[error("{operation}: {message}")]
    Validation {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: failed to decode response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ClientError::Config(message.into())
    }

    /// Name of the operation that failed, if the error came from one
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            ClientError::Transport { operation, .. }
            | ClientError::Api { operation, .. }
            | ClientError::Validation { operation, .. }
            | ClientError::Decode { operation, .. } => Some(*operation),
            ClientError::Config(_) => None,
        }
    }

    /// HTTP status of a failed response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
