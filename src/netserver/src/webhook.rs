use netmap_client::UrlSet;

/// Forwards an incoming alert payload to every configured notifier,
/// unchanged and in the background. No retry; failures are logged.
pub fn forward(notifiers: &UrlSet, body: bytes::Bytes) {
    let notifiers = notifiers.clone();
    tokio::spawn(async move {
        if let Err(err) = notifiers
            .request(reqwest::Method::POST, "/api/v1/alerts", Some(&body))
            .await
        {
            tracing::warn!(error = %err, "webhook forward failed");
        }
    });
}
