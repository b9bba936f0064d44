pub use axum::Router;
pub use tokio::task::JoinHandle;

use reqwest::Client;
use std::net::SocketAddr;

use crate::config::destination::{DestinationConfig, ForwardMode};
use crate::config::marketplace::{AuthStrategy, LwaCredentials, MarketplaceConfig};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn marketplace_config(
    strategy: AuthStrategy,
    token_url: String,
    api_base: String,
) -> MarketplaceConfig {
    MarketplaceConfig {
        auth_strategy: strategy,
        token_url,
        api_base,
        credentials: LwaCredentials {
            client_id: "amzn1.application-oa2-client.test".to_owned(),
            client_secret: "client-secret".to_owned(),
            refresh_token: Some("Atzr|refresh".to_owned()),
            scope: "sellingpartnerapi::notifications".to_owned(),
        },
        marketplace_id: "ATVPDKIKX0DER".to_owned(),
        created_after: None,
        include_items: false,
        identity: None,
    }
}

pub fn destination_config(api_base: String, forward_mode: ForwardMode) -> DestinationConfig {
    DestinationConfig {
        api_base,
        base: "appBase".to_owned(),
        table: "Orders".to_owned(),
        token: "pat-dest".to_owned(),
        forward_mode,
    }
}
