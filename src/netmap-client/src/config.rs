use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`crate::UrlSet`], mirroring the original agent's
/// `client.HTTP` struct field for field.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub urls: Vec<String>,
    pub timeout: Option<Duration>,
    pub content_encoding: Option<String>,
    pub headers: HashMap<String, String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bearer_token_file: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(urls: Vec<String>) -> Self {
        ClientConfig {
            urls,
            ..Default::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn gzip(mut self) -> Self {
        self.content_encoding = Some("gzip".to_string());
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn bearer_token_file(mut self, path: PathBuf) -> Self {
        self.bearer_token_file = Some(path);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
pub(crate) const POOL_MAX_IDLE_PER_HOST: usize = 10;
