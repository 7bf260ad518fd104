use crate::{ClientError, Result};
use elastic_core::{ClientConfig, Header};
use reqwest::{Method, StatusCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const PEM_CERT_MARKER: &[u8] = b"-----BEGIN CERTIFICATE-----";

/// Basic-auth credentials, fixed when the client is built
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A fully formed request, ready to hand to a transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<Header>,
    pub credentials: Credentials,
}

/// Status and fully buffered body of a response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends a prepared request and buffers the response
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> std::result::Result<RawResponse, BoxError>;
}

/// reqwest-backed transport used outside of tests
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build a transport honoring the TLS options in the config
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if config.insecure_skip_verify {
            tracing::warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if !config.ca_cert_path.is_empty() {
            let pem = std::fs::read(&config.ca_cert_path).map_err(|e| {
                ClientError::config(format!("reading {}: {}", config.ca_cert_path, e))
            })?;
            // rustls skips non-PEM input silently instead of failing
            if !pem.windows(PEM_CERT_MARKER.len()).any(|w| w == PEM_CERT_MARKER) {
                return Err(ClientError::config(format!(
                    "{} contains no PEM certificate",
                    config.ca_cert_path
                )));
            }
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClientError::config(format!("parsing {}: {}", config.ca_cert_path, e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::config(format!("building HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: PreparedRequest) -> std::result::Result<RawResponse, BoxError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .basic_auth(
                &request.credentials.username,
                Some(&request.credentials.password),
            );

        for h in &request.headers {
            builder = builder.header(h.key, h.value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        // bytes() consumes the response, returning the connection to the pool
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("elastic-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_from_config_defaults() {
        assert!(HttpTransport::from_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_from_config_insecure_skip_verify() {
        let config = ClientConfig {
            insecure_skip_verify: true,
            ..Default::default()
        };
        assert!(HttpTransport::from_config(&config).is_ok());
    }

    #[test]
    fn test_from_config_missing_ca_file() {
        let config = ClientConfig {
            ca_cert_path: "/nonexistent/elastic-ca.pem".to_string(),
            ..Default::default()
        };

        let err = HttpTransport::from_config(&config).err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(err.operation(), None);
        assert!(err.to_string().contains("/nonexistent/elastic-ca.pem"));
    }

    #[test]
    fn test_from_config_rejects_non_pem_file() {
        let path = temp_file("not-a-cert.pem", "this is not a certificate\n");
        let config = ClientConfig {
            ca_cert_path: path.to_string_lossy().into_owned(),
            ..Default::default()
        };

        let result = HttpTransport::from_config(&config);
        std::fs::remove_file(&path).ok();

        let err = result.err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("no PEM certificate"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "elastic".to_string(),
            password: "hunter2".to_string(),
        };
        let out = format!("{:?}", creds);
        assert!(out.contains("elastic"));
        assert!(!out.contains("hunter2"));
    }
}
