//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks strategy-specific credential requirements
//! - Checks server / logging / metrics / destination invariants

use crate::config::destination::DestinationConfig;
use crate::config::marketplace::{AuthStrategy, MarketplaceConfig};
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::BUILTIN_ROUTES;
use regex::Regex;
use tracing::{error, info};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Character set and length STS accepts for `RoleSessionName`.
const SESSION_NAME_PATTERN: &str = r"^[A-Za-z0-9_+=,.@-]{2,64}$";

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_marketplace(&cfg.marketplace, &mut errors);
    validate_destination(&cfg.destination, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }
    if settings.metrics.is_enabled && BUILTIN_ROUTES.contains(&settings.metrics.path.as_str()) {
        errors.push(format!(
            "settings.metrics.path '{}' collides with a built-in route",
            settings.metrics.path
        ));
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
    if settings.http.timeout_seconds == Some(0) {
        errors.push("settings.http.timeout_seconds must be > 0".to_string());
    }
}

fn validate_marketplace(mp: &MarketplaceConfig, errors: &mut Vec<String>) {
    require_url("marketplace.token_url", &mp.token_url, errors);
    require_url("marketplace.api_base", &mp.api_base, errors);
    require("marketplace.client_id", &mp.credentials.client_id, errors);
    require("marketplace.client_secret", &mp.credentials.client_secret, errors);
    require("marketplace.marketplace_id", &mp.marketplace_id, errors);

    match mp.auth_strategy {
        AuthStrategy::RefreshToken => {
            let missing = mp
                .credentials
                .refresh_token
                .as_deref()
                .map(|t| t.trim().is_empty())
                .unwrap_or(true);
            if missing {
                errors.push(
                    "marketplace.refresh_token is required for auth_strategy 'refresh_token'"
                        .to_string(),
                );
            }
        }
        AuthStrategy::ClientCredentials | AuthStrategy::ClientCredentialsAssumedRole => {
            require("marketplace.scope", &mp.credentials.scope, errors);
        }
    }

    match (&mp.identity, mp.auth_strategy.assumes_identity()) {
        (Some(identity), true) => {
            require("marketplace.identity.role_arn", &identity.role_arn, errors);
            require("marketplace.identity.region", &identity.region, errors);
            require("marketplace.identity.access_key_id", &identity.access_key_id, errors);
            require(
                "marketplace.identity.secret_access_key",
                &identity.secret_access_key,
                errors,
            );
            validate_session_name(&identity.session_name, errors);
            if let Some(endpoint) = &identity.sts_endpoint {
                require_url("marketplace.identity.sts_endpoint", endpoint, errors);
            }
            if let Some(duration) = identity.duration_seconds {
                if !(900..=43_200).contains(&duration) {
                    errors.push(format!(
                        "marketplace.identity.duration_seconds {} must be within 900..=43200",
                        duration
                    ));
                }
            }
        }
        (None, true) => errors.push(format!(
            "marketplace.identity is required for auth_strategy '{}'",
            mp.auth_strategy.as_str()
        )),
        (Some(_), false) => errors.push(format!(
            "marketplace.identity is only used with auth_strategy 'client_credentials_assumed_role', got '{}'",
            mp.auth_strategy.as_str()
        )),
        (None, false) => {}
    }
}

fn validate_destination(dest: &DestinationConfig, errors: &mut Vec<String>) {
    require_url("destination.api_base", &dest.api_base, errors);
    require("destination.base", &dest.base, errors);
    require("destination.table", &dest.table, errors);
    require("destination.token", &dest.token, errors);
}

fn validate_session_name(name: &str, errors: &mut Vec<String>) {
    let re = Regex::new(SESSION_NAME_PATTERN).expect("static session name regex");
    if !re.is_match(name) {
        errors.push(format!(
            "marketplace.identity.session_name '{}' must be 2-64 characters of [A-Za-z0-9_+=,.@-]",
            name
        ));
    }
}

fn require(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{} must not be empty", field));
    }
}

fn require_url(field: &str, value: &str, errors: &mut Vec<String>) {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(format!("{} '{}' must be an http(s) URL", field, value));
    }
}
