//! Sign-in bookkeeping: API client token, stored token and auth state kept in sync.

use crate::api::{auth, ApiClient};
use crate::config::AppConfig;
use crate::constants::TOKEN_KEY;
use crate::error::{AppError, Result};
use crate::models::Profile;
use crate::state::AuthState;
use crate::utils::token_store::TokenStore;

pub struct Session {
    client: ApiClient,
    store: TokenStore,
    auth: AuthState,
}

impl Session {
    /// Build the client and pick up a previously stored token, if any
    pub fn open(config: &AppConfig) -> Result<Self> {
        let store = TokenStore::open(&config.data_dir)?;
        let client = ApiClient::new(config)?;
        Ok(Self::with_parts(client, store))
    }

    pub fn with_parts(mut client: ApiClient, store: TokenStore) -> Self {
        let token = match store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                log::warn!("[Session] Could not read stored token: {}", e);
                None
            }
        };
        if token.is_some() {
            log::debug!("[Session] Found stored token");
        }
        client.set_token(token);
        Self {
            client,
            store,
            auth: AuthState::default(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.auth.profile.as_ref()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Profile> {
        self.auth.busy = true;
        let result = auth::sign_in(&self.client, email, password).await;
        self.auth.busy = false;

        let (profile, token) = result?;
        self.store.save(TOKEN_KEY, &token)?;
        self.client.set_token(Some(token));
        self.auth.sign_in(profile.clone());
        Ok(profile)
    }

    /// Validate the stored token. A token the server rejects is forgotten;
    /// network failures are returned and the token is kept for next time.
    pub async fn restore(&mut self) -> Result<Option<Profile>> {
        if !self.client.has_token() {
            return Ok(None);
        }

        self.auth.busy = true;
        let result = auth::is_auth(&self.client).await;
        self.auth.busy = false;

        match result {
            Ok(profile) => {
                self.auth.sign_in(profile.clone());
                Ok(Some(profile))
            }
            Err(AppError::Server { status, .. }) if status == 401 || status == 403 => {
                log::info!("[Session] Stored token rejected ({}), signing out", status);
                self.forget()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Local state is cleared even when the server call fails
    pub async fn log_out(&mut self, from_all: bool) -> Result<()> {
        let result = if self.client.has_token() {
            auth::log_out(&self.client, from_all).await
        } else {
            Ok(())
        };
        if let Err(e) = &result {
            log::warn!("[Session] Log out request failed: {}", e);
        }
        self.forget()?;
        result
    }

    fn forget(&mut self) -> Result<()> {
        self.client.set_token(None);
        self.auth.sign_out();
        self.store.remove(TOKEN_KEY)
    }
}
