//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::db::UserStore;
use crate::services::accounts::AccountService;
use crate::services::auth::AuthService;
use crate::services::password::PasswordHasher;
use crate::services::session::SessionTokens;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc` and is immutable after
/// startup. The credential store is the only shared mutable resource and
/// handles its own synchronization.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: SessionTokens,
    secure_cookies: bool,
}

impl AppState {
    /// Build state from its parts.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, tokens: SessionTokens, secure_cookies: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                hasher: PasswordHasher::new(),
                tokens,
                secure_cookies,
            }),
        }
    }

    /// Build state for a loaded configuration.
    #[must_use]
    pub fn from_config(config: &AdminConfig, store: Arc<dyn UserStore>) -> Self {
        Self::new(
            store,
            SessionTokens::new(&config.session_secret, config.session_lifetime),
            config.secure_cookies(),
        )
    }

    /// The credential store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }

    /// The session token signer.
    #[must_use]
    pub fn tokens(&self) -> &SessionTokens {
        &self.inner.tokens
    }

    /// Whether session cookies are marked `Secure`.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.inner.secure_cookies
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), &self.inner.hasher, &self.inner.tokens)
    }

    /// Account management service bound to this state.
    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self.store(), &self.inner.hasher)
    }
}
