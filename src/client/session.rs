//! Client-side session state.
//!
//! [`SessionStore`] mirrors the current token in memory and in a durable
//! slot. It is an explicit value handed to whatever needs session state,
//! not a process global, and every read re-checks expiry: an expired or
//! undecodable token is cleared on sight and reads as "signed out".

use crate::auth::token::{decode_claims, Claims};
use crate::client::store::{DurableError, DurableStore};
use crate::models::now_secs;

/// Durable slot holding the raw token string.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

pub struct SessionStore<S> {
    durable: S,
    current: Option<String>,
}

impl<S: DurableStore> SessionStore<S> {
    /// Starts `Unauthenticated`; call [`initialize`](Self::initialize) to
    /// pick up a previously stored token.
    pub fn new(durable: S) -> Self {
        Self {
            durable,
            current: None,
        }
    }

    /// Load the token from durable storage into memory.
    ///
    /// Safe to call again, e.g. after another process changed the durable
    /// slot; it simply re-reads.
    pub fn initialize(&mut self) -> Result<SessionState, DurableError> {
        self.current = self.durable.load(TOKEN_KEY)?;
        Ok(self.state())
    }

    /// Persist `token` and make it current.
    ///
    /// The durable write happens first; if it fails the in-memory state is
    /// left untouched.
    pub fn set(&mut self, token: &str) -> Result<(), DurableError> {
        self.durable.save(TOKEN_KEY, token)?;
        self.current = Some(token.to_string());
        Ok(())
    }

    /// Sign out. In-memory state is reset even if the durable removal fails.
    pub fn clear(&mut self) -> Result<(), DurableError> {
        self.current = None;
        self.durable.remove(TOKEN_KEY)
    }

    /// The current token, if it is present, decodable and unexpired.
    pub fn get(&mut self) -> Option<String> {
        self.valid_claims()?;
        self.current.clone()
    }

    /// Decoded claims of the current token, for display.
    pub fn claims(&mut self) -> Option<Claims> {
        self.valid_claims()
    }

    pub fn is_signed_in(&mut self) -> bool {
        self.valid_claims().is_some()
    }

    pub fn state(&mut self) -> SessionState {
        if self.is_signed_in() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn durable(&self) -> &S {
        &self.durable
    }

    fn valid_claims(&mut self) -> Option<Claims> {
        let token = self.current.as_deref()?;

        match decode_claims(token) {
            Ok(claims) if !claims.is_expired_at(now_secs()) => Some(claims),
            Ok(claims) => {
                tracing::debug!(action = "session_cleared", reason = "expired", exp = claims.exp, "Session expired");
                self.drop_session();
                None
            }
            Err(e) => {
                tracing::debug!(action = "session_cleared", reason = "malformed", error = %e, "Discarding unreadable session token");
                self.drop_session();
                None
            }
        }
    }

    fn drop_session(&mut self) {
        if let Err(e) = self.clear() {
            tracing::warn!(error = %e, "Failed to remove stored session token");
        }
    }
}
