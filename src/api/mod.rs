//! # API Module
//!
//! HTTP handlers of the local REST surface. Each handler maps an incoming
//! request onto one or more Etsy calls and returns JSON, or an
//! [`ApiError`](crate::error::ApiError) which relays upstream failures with
//! their status code.
//!
//! ## Endpoints
//!
//! - [`login`], [`callback`] - OAuth 2.0 PKCE authorization with Etsy
//! - [`refresh`], [`tokens`] - stored token lifecycle
//! - [`create_listing`] - draft listing with images, inventory and video
//! - [`me`], [`shop_listings`], [`shipping_profiles`], [`return_policies`],
//!   [`seller_taxonomy_nodes`] - forwarded shop queries
//! - [`health`] - liveness and version
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use etsy_proxy::server::{AppState, router};
//!
//! let app = router(AppState::new(config).shared());
//! ```

mod auth;
mod health;
mod listings;
mod shops;
mod token;

pub use auth::{callback, login};
pub use health::health;
pub use listings::create_listing;
pub use shops::{me, return_policies, seller_taxonomy_nodes, shipping_profiles, shop_listings};
pub use token::{refresh, tokens};
