//! # Authorization Flows
//!
//! The access policy decides every call: wildcard and exact grants,
//! unknown consumers, and the ways a caller can fail to identify
//! itself. Denials must stay opaque on the wire.

#[cfg(test)]
mod tests {
    use crate::helpers::spawn_gate;
    use reqwest::StatusCode;

    const ACL_WILDCARD: &str = r#"{"svc1": ["/callgate.Biz/*"]}"#;

    #[tokio::test]
    async fn test_wildcard_grant_covers_all_service_methods() {
        let (_handle, base) = spawn_gate(ACL_WILDCARD).await;
        let client = reqwest::Client::new();

        for method in ["Check", "Add", "Test"] {
            let response = client
                .post(format!("{base}/callgate.Biz/{method}"))
                .header("consumer", "svc1")
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "method {method}");
            let body: serde_json::Value = response.json().await.unwrap();
            assert_eq!(body, serde_json::json!({}));
        }
    }

    #[tokio::test]
    async fn test_exact_grant_covers_one_method_only() {
        let (_handle, base) = spawn_gate(r#"{"svc1": ["/callgate.Biz/Check"]}"#).await;
        let client = reqwest::Client::new();

        let allowed = client
            .post(format!("{base}/callgate.Biz/Check"))
            .header("consumer", "svc1")
            .send()
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        let denied = client
            .post(format!("{base}/callgate.Biz/Add"))
            .header("consumer", "svc1")
            .send()
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_consumer_denied_opaquely() {
        let (_handle, base) = spawn_gate(ACL_WILDCARD).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/callgate.Biz/Check"))
            .header("consumer", "svc2")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The denial carries no hint of why.
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["kind"], "unauthenticated");
        assert_eq!(body["message"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_missing_identity_denied() {
        let (_handle, base) = spawn_gate(ACL_WILDCARD).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/callgate.Biz/Check"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_repeated_identity_header_denied() {
        let (_handle, base) = spawn_gate(ACL_WILDCARD).await;
        let client = reqwest::Client::new();

        // Two consumer headers is an ambiguous identity, not a merge.
        let response = client
            .post(format!("{base}/callgate.Biz/Check"))
            .header("consumer", "svc1")
            .header("consumer", "svc1")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_biz_grant_does_not_open_admin() {
        let (_handle, base) = spawn_gate(ACL_WILDCARD).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{base}/callgate.Admin/Logging"))
            .header("consumer", "svc1")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_body_is_ignored() {
        let (_handle, base) = spawn_gate(ACL_WILDCARD).await;
        let client = reqwest::Client::new();

        // The unary methods carry no payload; any body is acceptable.
        let response = client
            .post(format!("{base}/callgate.Biz/Check"))
            .header("consumer", "svc1")
            .body(r#"{"ignored": true}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({}));
    }
}
