mod role;
mod session;

use std::sync::Arc;

pub use role::Role;
pub use session::Session;

/// Session collaborator. Supplies the bearer token and ends the session
/// when the server reports it expired.
pub trait AuthManager {
    fn token(&self) -> Option<String>;
    fn logout(&self);
}

pub type DynAuthManager = Arc<dyn AuthManager + Send + Sync>;
