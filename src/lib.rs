//! Etsy Open API v3 Proxy Library
//!
//! This library provides a small backend that authorizes against Etsy with an
//! OAuth 2.0 PKCE flow, keeps the resulting token in a local file and forwards
//! a handful of REST calls (listing creation, media upload, shop queries) to
//! the Etsy Open API.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local REST surface
//! - `cli` - Command implementations used by the binary
//! - `config` - Configuration management and environment variables
//! - `error` - Error types and their HTTP representation
//! - `etsy` - Etsy Open API v3 client
//! - `listing` - Listing validation and the multi-step creation pipeline
//! - `logging` - Tracing subscriber setup
//! - `management` - Token file and PKCE session management
//! - `server` - Router construction and the HTTP server
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers and small utilities
//!
//! # Example
//!
//! ```
//! use etsy_proxy::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> etsy_proxy::Res<()> {
//!     config::load_env().await?;
//!     let cfg = config::Config::from_env()?;
//!     server::start_api_server(cfg).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod etsy;
pub mod listing;
pub mod logging;
pub mod management;
pub mod server;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the application edges (binary, CLI commands) where any error is
/// reported and the process ends. Request handling uses [`error::ApiError`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Token refreshed, expires in {}s", token.expires_in);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal errors in the binary, never inside request handling.
///
/// # Example
///
/// ```
/// error!("Cannot load configuration: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, visit {} manually", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
