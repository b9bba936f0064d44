use serde::Deserialize;

use crate::config::destination::DestinationConfig;
use crate::config::marketplace::MarketplaceConfig;
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub marketplace: MarketplaceConfig,
    pub destination: DestinationConfig,
}
