//! # Call Log Streaming
//!
//! The admin `Logging` stream relays the live call log: one event per
//! allowed call, in publish order, starting from the moment the
//! subscriber attached. Denied calls must never show up.

#[cfg(test)]
mod tests {
    use crate::helpers::{open_stream, spawn_gate, SseStream};
    use callgate_bus::CallEvent;
    use std::time::Duration;
    use tokio::time::timeout;

    const ACL: &str = r#"{
        "svc1": ["/callgate.Biz/*"],
        "admin": ["/callgate.Admin/*"]
    }"#;

    async fn next_event(stream: &mut SseStream) -> CallEvent {
        let value = timeout(Duration::from_secs(2), stream.next_json())
            .await
            .expect("timeout waiting for call event")
            .expect("stream should not end");
        serde_json::from_value(value).expect("call event shape")
    }

    async fn call(client: &reqwest::Client, base: &str, consumer: &str, method: &str) -> u16 {
        client
            .post(format!("{base}/callgate.Biz/{method}"))
            .header("consumer", consumer)
            .send()
            .await
            .unwrap()
            .status()
            .as_u16()
    }

    #[tokio::test]
    async fn test_call_log_streams_in_publish_order() {
        let (handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();
        let mut log = open_stream(&client, &format!("{base}/callgate.Admin/Logging"), "admin").await;

        assert_eq!(call(&client, &base, "svc1", "Check").await, 200);
        assert_eq!(call(&client, &base, "svc1", "Add").await, 200);
        assert_eq!(call(&client, &base, "svc1", "Check").await, 200);

        let host = handle.local_addr().to_string();
        for expected in ["/callgate.Biz/Check", "/callgate.Biz/Add", "/callgate.Biz/Check"] {
            let event = next_event(&mut log).await;
            assert_eq!(event.method, expected);
            assert_eq!(event.consumer, "svc1");
            assert_eq!(event.host, host);
            assert!(event.timestamp > 0);
        }
    }

    #[tokio::test]
    async fn test_denied_calls_are_never_logged() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();
        let mut log = open_stream(&client, &format!("{base}/callgate.Admin/Logging"), "admin").await;

        // Denied: unknown consumer. Then an allowed sentinel.
        assert_eq!(call(&client, &base, "intruder", "Check").await, 401);
        assert_eq!(call(&client, &base, "svc1", "Test").await, 200);

        let event = next_event(&mut log).await;
        assert_eq!(event.consumer, "svc1");
        assert_eq!(event.method, "/callgate.Biz/Test");
    }

    #[tokio::test]
    async fn test_no_backfill_for_late_subscriber() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();

        // This call happens before anyone subscribes; it is gone.
        assert_eq!(call(&client, &base, "svc1", "Check").await, 200);

        let mut log = open_stream(&client, &format!("{base}/callgate.Admin/Logging"), "admin").await;
        assert_eq!(call(&client, &base, "svc1", "Add").await, 200);

        let event = next_event(&mut log).await;
        assert_eq!(event.method, "/callgate.Biz/Add");
    }

    #[tokio::test]
    async fn test_admin_streams_observe_each_other() {
        let (_handle, base) = spawn_gate(ACL).await;
        let client = reqwest::Client::new();
        let url = format!("{base}/callgate.Admin/Logging");

        let mut first = open_stream(&client, &url, "admin").await;
        // The second subscriber's own connect goes through the chain,
        // so the first stream sees it.
        let _second = open_stream(&client, &url, "admin").await;

        let event = next_event(&mut first).await;
        assert_eq!(event.consumer, "admin");
        assert_eq!(event.method, "/callgate.Admin/Logging");
    }
}
