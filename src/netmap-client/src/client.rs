use std::io::Write as _;

use rand::seq::SliceRandom;
use reqwest::{Method, StatusCode};

use crate::config::{ClientConfig, DEFAULT_TIMEOUT, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST};
use crate::error::ClientError;

/// A set of candidate base URLs tried in shuffled order until one request
/// succeeds. Used both by the agent (talking to `netserver`) and by the
/// webhook forwarder (talking out to alert receivers).
#[derive(Clone)]
pub struct UrlSet {
    urls: Vec<String>,
    inner: reqwest::Client,
    config: ClientConfig,
}

pub struct Response {
    pub status: StatusCode,
    pub body: bytes::Bytes,
}

impl UrlSet {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()?;
        Ok(UrlSet {
            urls: config.urls.clone(),
            inner,
            config,
        })
    }

    /// Shuffles the URL set and tries `method path` against each in turn,
    /// returning the first 2xx response. `body`, when present, is sent as a
    /// JSON-encoded request body (gzip-compressed first if configured).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<Response, ClientError> {
        let mut order = self.urls.clone();
        order.shuffle(&mut rand::thread_rng());

        let payload = match body {
            Some(bytes) if self.config.content_encoding.as_deref() == Some("gzip") => {
                Some(gzip_compress(bytes)?)
            }
            Some(bytes) => Some(bytes.to_vec()),
            None => None,
        };

        for base in &order {
            match self.try_one(&method, base, path, payload.as_deref()).await {
                Ok(resp) if resp.status.is_success() => return Ok(resp),
                Ok(resp) => {
                    tracing::warn!(url = %base, status = %resp.status, "request did not succeed");
                }
                Err(err) => {
                    tracing::warn!(url = %base, error = %err, "request failed");
                }
            }
        }
        Err(ClientError::AllUrlsFailed)
    }

    async fn try_one(
        &self,
        method: &Method,
        base: &str,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<Response, ClientError> {
        let mut builder = self.inner.request(method.clone(), format!("{base}{path}"));

        if *method == Method::POST || *method == Method::PUT {
            builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json");
        }
        if self.config.content_encoding.as_deref() == Some("gzip") {
            builder = builder.header(reqwest::header::CONTENT_ENCODING, "gzip");
        }
        if let Some(path) = &self.config.bearer_token_file {
            let token = std::fs::read_to_string(path).map_err(|source| ClientError::BearerTokenRead {
                path: path.display().to_string(),
                source,
            })?;
            builder = builder.bearer_auth(token.trim());
        }
        for (key, value) in &self.config.headers {
            builder = builder.header(key, value);
        }
        if self.config.username.is_some() || self.config.password.is_some() {
            builder = builder.basic_auth(
                self.config.username.clone().unwrap_or_default(),
                self.config.password.clone(),
            );
        }
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        let resp = builder.send().await.map_err(|source| ClientError::Transport {
            url: base.to_string(),
            source,
        })?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|source| ClientError::Transport {
            url: base.to_string(),
            source,
        })?;
        Ok(Response { status, body })
    }
}

fn gzip_compress(data: &[u8]) -> Result<Vec<u8>, ClientError> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).map_err(ClientError::Compress)?;
    encoder.finish().map_err(ClientError::Compress)
}
