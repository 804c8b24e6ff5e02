use parking_lot::RwLock;

use super::AuthManager;

/// In-memory session holding the bearer token.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|token| !token.trim().is_empty());

        Self {
            token: RwLock::new(token),
        }
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.read().is_some()
    }
}

impl AuthManager for Session {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    #[tracing::instrument(skip(self))]
    fn logout(&self) {
        if self.token.write().take().is_some() {
            tracing::info!("session cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_signed_out() {
        let session = Session::new(Some("  ".into()));

        assert!(!session.is_signed_in());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn logout_clears_token() {
        let session = Session::new(None);
        session.sign_in("abc");
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.logout();

        assert!(!session.is_signed_in());
    }
}
