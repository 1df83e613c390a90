use std::{net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{
    Res, api,
    config::Config,
    etsy::EtsyClient,
    management::{PkceSessions, TokenManager},
};

/// State shared by every handler.
pub struct AppState {
    pub client: EtsyClient,
    pub tokens: TokenManager,
    pub sessions: PkceSessions,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config) -> Self {
        let tokens = TokenManager::new(config.token_file.clone());
        let sessions = PkceSessions::new(config.pkce_session_ttl);
        Self {
            client: EtsyClient::new(config),
            tokens,
            sessions,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/auth/login", get(api::login))
        .route("/auth/callback", get(api::callback))
        .route("/token/refresh", post(api::refresh))
        .route("/tokens", get(api::tokens))
        .route("/listings", post(api::create_listing))
        .route("/me", get(api::me))
        .route("/shops/listings", get(api::shop_listings))
        .route("/shops/shipping-profiles", get(api::shipping_profiles))
        .route("/return-policies", get(api::return_policies))
        .route(
            "/etsy/seller-taxonomy/nodes",
            get(api::seller_taxonomy_nodes),
        )
        .layer(Extension(state))
}

/// Binds the configured address and serves the REST surface until the
/// process is stopped.
pub async fn start_api_server(config: Config) -> Res<()> {
    let listener = bind(config.server_addr).await?;
    serve(listener, config).await
}

/// Binds the listener; connections are queued from here on, so anything that
/// points a client at the server may run before [`serve`] is awaited.
pub async fn bind(addr: SocketAddr) -> Res<TcpListener> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    Ok(listener)
}

pub async fn serve(listener: TcpListener, config: Config) -> Res<()> {
    let app = router(AppState::new(config).shared());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
