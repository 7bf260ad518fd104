use serde::{Deserialize, Serialize};

#[derive(Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// PEM file with an extra root certificate to trust
    #[serde(default)]
    pub ca_cert_path: String,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("ca_cert_path", &self.ca_cert_path)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: String::new(),
            password: String::new(),
            insecure_skip_verify: false,
            ca_cert_path: String::new(),
        }
    }
}
