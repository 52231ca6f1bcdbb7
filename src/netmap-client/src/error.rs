use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no URL in the set produced a successful response")]
    AllUrlsFailed,
    #[error("failed to read bearer token file {path}: {source}")]
    BearerTokenRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to gzip request body: {0}")]
    Compress(#[source] std::io::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<ClientError> for netmap_types::NetmapError {
    fn from(err: ClientError) -> Self {
        netmap_types::NetmapError::PeerUnreachable(err.to_string())
    }
}
