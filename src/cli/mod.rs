//! # CLI Module
//!
//! Command implementations behind the `etsy-proxy` binary.
//!
//! - [`serve`] - runs the REST proxy, optionally opening the Etsy login in a browser
//! - [`refresh`] - refreshes the stored token without starting the server

mod auth;

pub use auth::refresh;

use crate::{config::Config, error, info, server, warning};

pub async fn serve(config: Config, open: bool) {
    let listener = match server::bind(config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot bind {}: {}", config.server_addr, e),
    };
    let addr = listener.local_addr().unwrap_or(config.server_addr);
    let login_url = format!("http://{}/auth/login", addr);
    info!("Etsy proxy listening on http://{}", addr);
    info!("Authorize at {}", login_url);

    // The listener is bound, so the browser's first request is queued.
    if open && webbrowser::open(&login_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            login_url
        );
    }

    if let Err(e) = server::serve(listener, config).await {
        error!("Server stopped: {}", e);
    }
}
