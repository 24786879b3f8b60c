//! # Statistics Streaming
//!
//! The admin `Statistics` stream sends one aggregated snapshot per
//! interval: counts by method and by consumer for calls made inside
//! the window. Each subscriber aggregates independently from its own
//! attach point.

#[cfg(test)]
mod tests {
    use crate::helpers::{open_stream, spawn_gate, SseStream};
    use std::time::Duration;
    use tokio::time::timeout;

    const ACL: &str = r#"{
        "svc1": ["/callgate.Biz/*"],
        "svc2": ["/callgate.Biz/Add"],
        "admin": ["/callgate.Admin/*"]
    }"#;

    async fn next_snapshot(stream: &mut SseStream) -> serde_json::Value {
        timeout(Duration::from_secs(3), stream.next_json())
            .await
            .expect("timeout waiting for snapshot")
            .expect("stream should not end")
    }

    async fn call(client: &reqwest::Client, base: &str, consumer: &str, method: &str) {
        let response = client
            .post(format!("{base}/callgate.Biz/{method}"))
            .header("consumer", consumer)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_first_window_aggregates_calls() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();
        let mut stats = open_stream(
            &client,
            &format!("{base}/callgate.Admin/Statistics?interval_seconds=1"),
            "admin",
        )
        .await;

        call(&client, &base, "svc1", "Check").await;
        call(&client, &base, "svc1", "Check").await;
        call(&client, &base, "svc2", "Add").await;

        let snapshot = next_snapshot(&mut stats).await;
        assert_eq!(snapshot["by_method"]["/callgate.Biz/Check"], 2);
        assert_eq!(snapshot["by_method"]["/callgate.Biz/Add"], 1);
        assert_eq!(snapshot["by_consumer"]["svc1"], 2);
        assert_eq!(snapshot["by_consumer"]["svc2"], 1);
        assert!(snapshot["timestamp"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_quiet_window_still_sends_a_snapshot() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();
        let mut stats = open_stream(
            &client,
            &format!("{base}/callgate.Admin/Statistics?interval_seconds=1"),
            "admin",
        )
        .await;

        let snapshot = next_snapshot(&mut stats).await;
        assert_eq!(snapshot["by_method"], serde_json::json!({}));
        assert_eq!(snapshot["by_consumer"], serde_json::json!({}));
        assert_eq!(snapshot["timestamp"], 0);
    }

    #[tokio::test]
    async fn test_subscribers_count_independently() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();
        let url = format!("{base}/callgate.Admin/Statistics?interval_seconds=1");

        let mut first = open_stream(&client, &url, "admin").await;
        let mut second = open_stream(&client, &url, "admin").await;

        call(&client, &base, "svc1", "Check").await;
        call(&client, &base, "svc1", "Check").await;

        // Both see the business calls; the first also saw the second's
        // own connect, so only the shared keys are compared.
        let first_snapshot = next_snapshot(&mut first).await;
        let second_snapshot = next_snapshot(&mut second).await;
        assert_eq!(first_snapshot["by_method"]["/callgate.Biz/Check"], 2);
        assert_eq!(second_snapshot["by_method"]["/callgate.Biz/Check"], 2);
    }

    #[tokio::test]
    async fn test_missing_interval_is_rejected() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{base}/callgate.Admin/Statistics"))
            .header("consumer", "admin")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["kind"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{base}/callgate.Admin/Statistics?interval_seconds=0"))
            .header("consumer", "admin")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }
}
