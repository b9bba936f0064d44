#[cfg(test)]
mod test {
    use crate::config::proc_loader::parse_config;
    use crate::config::proc_validator::validate_service_config;
    use crate::config::marketplace::AuthStrategy;

    const BASE: &str = r#"
settings:
  server:
    host: 0.0.0.0
    port: "8080"
  metrics:
    is_enabled: true
  logging:
    level: debug
    format: json
  http:
    timeout_seconds: 30
marketplace:
  auth_strategy: client_credentials_assumed_role
  token_url: https://api.amazon.com/auth/o2/token
  client_id: client
  client_secret: secret
  marketplace_id: ATVPDKIKX0DER
  include_items: true
  identity:
    role_arn: arn:aws:iam::123456789012:role/SellingPartner
    region: us-east-1
    access_key_id: AKIDEXAMPLE
    secret_access_key: secret
destination:
  base: appBase
  table: Orders
  token: pat
  forward_mode: fire_and_forget
"#;

    #[tokio::test]
    async fn full_config_is_accepted() {
        let cfg = parse_config(BASE.to_owned()).await.unwrap();
        assert_eq!(
            cfg.marketplace.auth_strategy,
            AuthStrategy::ClientCredentialsAssumedRole
        );
        let identity = cfg.marketplace.identity.as_ref().unwrap();
        assert_eq!(identity.session_name, "order-sync");
        assert_eq!(identity.sts_endpoint(), "https://sts.us-east-1.amazonaws.com");
        assert_eq!(cfg.marketplace.credentials.scope, "sellingpartnerapi::notifications");
        assert_eq!(cfg.settings.http.timeout_seconds, Some(30));
        assert!(cfg.marketplace.include_items);
    }

    #[tokio::test]
    async fn errors_are_aggregated() {
        let content = BASE
            .replace("port: \"8080\"", "port: \"http\"")
            .replace("auth_strategy: client_credentials_assumed_role", "auth_strategy: refresh_token")
            .replace("token: pat", "token: \"\"");
        let cfg: crate::ServiceConfig = serde_yaml::from_str(&content).unwrap();

        let errors = validate_service_config(&cfg).await.unwrap_err();

        assert!(errors.iter().any(|e| e.contains("settings.server.port")), "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("marketplace.refresh_token")), "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("marketplace.identity is only used")), "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("destination.token")), "{errors:?}");
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[tokio::test]
    async fn assumed_role_without_identity_is_rejected() {
        let start = BASE.find("  identity:").unwrap();
        let end = BASE.find("destination:").unwrap();
        let content = format!("{}{}", &BASE[..start], &BASE[end..]);

        let err = parse_config(content).await.unwrap_err();
        assert!(err.to_string().contains("marketplace.identity is required"), "{err}");
    }

    #[tokio::test]
    async fn invalid_log_level_is_rejected() {
        let content = BASE.replace("level: debug", "level: verbose");
        let err = parse_config(content).await.unwrap_err();
        assert!(err.to_string().contains("settings.logging.level"), "{err}");
    }

    #[tokio::test]
    async fn metrics_path_on_builtin_route_is_rejected() {
        for path in ["/health", "/check/destination", "/sync"] {
            let content = BASE.replace(
                "    is_enabled: true\n",
                &format!("    is_enabled: true\n    path: {}\n", path),
            );
            let err = parse_config(content).await.unwrap_err();
            assert!(
                err.to_string().contains("collides with a built-in route"),
                "{path}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn metrics_path_on_builtin_route_is_allowed_when_disabled() {
        let content = BASE.replace("is_enabled: true", "is_enabled: false\n    path: /health");
        let cfg = parse_config(content).await.unwrap();
        assert!(!cfg.settings.metrics.is_enabled);
    }

    #[tokio::test]
    async fn session_name_outside_sts_charset_is_rejected() {
        for name in ["\"order sync\"", "x", "\"order/sync\""] {
            let content = BASE.replace(
                "    secret_access_key: secret\n",
                &format!("    secret_access_key: secret\n    session_name: {}\n", name),
            );
            let err = parse_config(content).await.unwrap_err();
            assert!(
                err.to_string().contains("marketplace.identity.session_name"),
                "{name}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn session_name_with_allowed_punctuation_is_accepted() {
        let content = BASE.replace(
            "    secret_access_key: secret\n",
            "    secret_access_key: secret\n    session_name: order-sync@host.example_1+=,\n",
        );
        let cfg = parse_config(content).await.unwrap();
        let identity = cfg.marketplace.identity.as_ref().unwrap();
        assert_eq!(identity.session_name, "order-sync@host.example_1+=,");
    }
}
