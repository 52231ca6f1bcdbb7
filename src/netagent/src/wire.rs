use serde::Deserialize;

/// The read side of the `{status,error,warnings,data}` envelope every
/// `netserver` endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
pub struct WireEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> WireEnvelope<T> {
    pub fn into_data(self) -> Result<T, anyhow::Error> {
        match self.data {
            Some(data) if self.status == "success" => Ok(data),
            _ => Err(anyhow::anyhow!(
                "server returned an error envelope: {}",
                self.error.unwrap_or_else(|| "unknown error".into())
            )),
        }
    }
}
