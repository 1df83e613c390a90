mod auth;
mod session;

pub use auth::StoreError;
pub use auth::TOKEN_KEY;
pub use auth::TokenManager;
pub use auth::is_invalid_token;
pub use session::PkceSessions;
