use serde::Deserialize;
use std::fmt;

pub const DEFAULT_DESTINATION_API_BASE: &str = "https://api.airtable.com/v0";

/// ================================
/// Destination store
/// ================================
#[derive(Deserialize, Clone)]
pub struct DestinationConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base (workspace) identifier.
    pub base: String,
    pub table: String,
    pub token: String,
    #[serde(default)]
    pub forward_mode: ForwardMode,
}

impl DestinationConfig {
    /// Create-record / list endpoint for the configured table.
    pub fn table_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.base),
            urlencoding::encode(&self.table)
        )
    }
}

impl fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("api_base", &self.api_base)
            .field("base", &self.base)
            .field("table", &self.table)
            .field("token", &"***")
            .field("forward_mode", &self.forward_mode)
            .finish()
    }
}

/// What a failed push does to the sync result.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForwardMode {
    /// Failures are listed per order and excluded from the synced count.
    #[default]
    Report,
    /// Failures are logged and dropped; every fetched order counts as synced.
    FireAndForget,
}

fn default_api_base() -> String {
    DEFAULT_DESTINATION_API_BASE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_encodes_table_name() {
        let cfg = DestinationConfig {
            api_base: "https://api.airtable.com/v0/".to_owned(),
            base: "appBase".to_owned(),
            table: "Amazon Orders".to_owned(),
            token: "pat".to_owned(),
            forward_mode: ForwardMode::default(),
        };
        assert_eq!(
            cfg.table_url(),
            "https://api.airtable.com/v0/appBase/Amazon%20Orders"
        );
        assert!(!format!("{:?}", cfg).contains("pat\""));
    }

    #[test]
    fn table_url_encodes_base() {
        let cfg = DestinationConfig {
            api_base: "https://api.airtable.com/v0".to_owned(),
            base: "app Base/1".to_owned(),
            table: "Orders".to_owned(),
            token: "pat".to_owned(),
            forward_mode: ForwardMode::default(),
        };
        assert_eq!(
            cfg.table_url(),
            "https://api.airtable.com/v0/app%20Base%2F1/Orders"
        );
    }
}
