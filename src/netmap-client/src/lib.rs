//! URL-set HTTP client used by the agent to talk to `netserver` and by the
//! webhook forwarder to talk out to alert receivers.

mod client;
mod config;
mod error;

pub use client::{Response, UrlSet};
pub use config::ClientConfig;
pub use error::ClientError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_sets_fields() {
        let cfg = ClientConfig::new(vec!["http://a".into(), "http://b".into()])
            .gzip()
            .basic_auth("user", "pass")
            .header("X-Test", "1");
        assert_eq!(cfg.urls.len(), 2);
        assert_eq!(cfg.content_encoding.as_deref(), Some("gzip"));
        assert_eq!(cfg.username.as_deref(), Some("user"));
        assert_eq!(cfg.headers.get("X-Test").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn url_set_fails_over_all_urls() {
        let cfg = ClientConfig::new(vec![
            "http://127.0.0.1:1".into(),
            "http://127.0.0.1:2".into(),
        ]);
        let set = UrlSet::new(cfg).unwrap();
        let err = set
            .request(reqwest::Method::GET, "/healthy", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
