use std::sync::{Mutex, MutexGuard};

use crate::{
    auth::{Credentials, SessionHooks, TokenPair},
    http::TRACING_TARGET,
};

#[derive(Debug, Default)]
struct SessionState {
    access: Option<String>,
    refresh: Option<String>,
    expired: bool,
}

/// The caller side token store. Endpoint calls read a snapshot of it and
/// write back through [`SessionHooks`], so a single `Session` can be shared
/// between concurrent calls.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                access: Some(access.into()),
                refresh: Some(refresh.into()),
                expired: false,
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // The state is always left consistent, a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn credentials(&self) -> Credentials {
        let state = self.lock();
        Credentials {
            access: state.access.clone(),
            refresh: state.refresh.clone(),
        }
    }

    pub fn set_tokens(&self, tokens: &TokenPair) {
        let mut state = self.lock();
        state.access = Some(tokens.access.clone());
        state.refresh = Some(tokens.refresh.clone());
        state.expired = false;
    }

    /// Signs out. A cleared session is neither authenticated nor expired.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.access = None;
        state.refresh = None;
        state.expired = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().access.is_some()
    }

    /// Set once a refresh has failed; cleared by [`Session::set_tokens`] or
    /// [`Session::clear`].
    pub fn is_expired(&self) -> bool {
        self.lock().expired
    }
}

impl SessionHooks for Session {
    fn on_token_refreshed(&self, tokens: &TokenPair) {
        tracing::debug!(target: TRACING_TARGET, "storing refreshed session tokens");
        self.set_tokens(tokens);
    }

    fn on_session_expired(&self) {
        tracing::debug!(target: TRACING_TARGET, "session expired, clearing tokens");
        let mut state = self.lock();
        state.access = None;
        state.refresh = None;
        state.expired = true;
    }
}
