//! Signed-in user session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use url::Url;

use crate::api::GeoApi;
use crate::error::{ApiError, Result};
use crate::model::{LoginCredentials, RegisterData, User};
use crate::storage::TokenStore;

#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub is_authenticated: bool,
}

impl AuthState {
    fn signed_out() -> Self {
        Self {
            user: None,
            loading: false,
            is_authenticated: false,
        }
    }

    fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            loading: false,
            is_authenticated: true,
        }
    }
}

/// What the OAuth provider redirected back with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OAuthCallback {
    Token(String),
    Error(String),
    Empty,
}

impl OAuthCallback {
    /// Accepts a full redirect URL or just `/auth/callback?...`.
    pub fn parse(input: &str) -> Self {
        let parsed = Url::parse(input).or_else(|_| {
            Url::parse("http://localhost").and_then(|base| base.join(input))
        });
        match parsed {
            Ok(url) => Self::from_url(&url),
            Err(e) => {
                warn!(error = %e, "unparseable auth callback");
                OAuthCallback::Empty
            }
        }
    }

    pub fn from_url(url: &Url) -> Self {
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "token" if !value.is_empty() => return OAuthCallback::Token(value.into_owned()),
                "error" if error.is_none() => error = Some(value.into_owned()),
                _ => {}
            }
        }
        error.map_or(OAuthCallback::Empty, OAuthCallback::Error)
    }
}

/// Session state machine: starts loading, then settles on signed in or
/// signed out. Every transition goes through the shared [`TokenStore`], so
/// the API client sees the same token the session does.
pub struct AuthSession {
    api: Arc<dyn GeoApi>,
    tokens: TokenStore,
    state: Mutex<AuthState>,
}

impl AuthSession {
    pub fn new(api: Arc<dyn GeoApi>, tokens: TokenStore) -> Self {
        Self {
            api,
            tokens,
            state: Mutex::new(AuthState {
                user: None,
                loading: true,
                is_authenticated: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, state: AuthState) {
        *self.lock() = state;
    }

    pub fn state(&self) -> AuthState {
        self.lock().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    /// First check on startup.
    pub fn initialize(&self) -> AuthState {
        self.refresh_user();
        self.state()
    }

    /// Resolve the stored token to a user. A token the backend rejects is
    /// dropped.
    pub fn refresh_user(&self) {
        if self.tokens.get().is_none() {
            debug!("no stored token");
            self.set(AuthState::signed_out());
            return;
        }
        match self.api.me() {
            Ok(user) => {
                debug!(email = %user.email, "session restored");
                self.set(AuthState::signed_in(user));
            }
            Err(e) => {
                warn!(error = %e, "stored token rejected, signing out");
                self.tokens.clear();
                self.set(AuthState::signed_out());
            }
        }
    }

    /// Sign in. On any failure the session is left signed out and the
    /// error is returned for the caller to show.
    pub fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        self.lock().loading = true;
        match self.try_login(credentials) {
            Ok(user) => {
                info!(email = %user.email, "signed in");
                self.set(AuthState::signed_in(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(email = %credentials.email, error = %e, "login failed");
                self.tokens.clear();
                self.set(AuthState::signed_out());
                Err(e)
            }
        }
    }

    fn try_login(&self, credentials: &LoginCredentials) -> Result<User> {
        let token = self.api.login(credentials)?;
        self.tokens.set(&token.access_token)?;
        self.api.me()
    }

    /// Create an account. Does not sign in.
    pub fn register(&self, data: &RegisterData) -> Result<User> {
        self.api.register(data)
    }

    /// Always ends signed out, even when the server call fails.
    pub fn logout(&self) {
        if let Err(e) = self.api.logout() {
            warn!(error = %e, "server logout failed");
        }
        self.tokens.clear();
        self.set(AuthState::signed_out());
        info!("signed out");
    }

    /// Finish an OAuth redirect: store the token and resolve the user.
    pub fn complete_oauth(&self, callback: &OAuthCallback) -> Result<User> {
        match callback {
            OAuthCallback::Token(token) => {
                self.tokens.set(token)?;
                self.refresh_user();
                self.user()
                    .ok_or_else(|| ApiError::Unauthorized("Sign-in token was rejected".into()))
            }
            OAuthCallback::Error(message) => {
                self.set(AuthState::signed_out());
                Err(ApiError::Unauthorized(message.clone()))
            }
            OAuthCallback::Empty => {
                self.set(AuthState::signed_out());
                Err(ApiError::Unauthorized("Missing sign-in token".into()))
            }
        }
    }
}
