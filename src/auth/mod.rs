pub mod session;

/// The tokens a caller holds for one logical call. Either may be missing:
/// no access token means an anonymous request, no refresh token means a 401
/// is final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
        }
    }

    pub fn access_only(access: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl From<TokenPair> for Credentials {
    fn from(pair: TokenPair) -> Self {
        Self {
            access: Some(pair.access),
            refresh: Some(pair.refresh),
        }
    }
}

/// A freshly minted access token together with the refresh token to use
/// next time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Callbacks fired by [`Executor::execute_with_hooks`](crate::Executor::execute_with_hooks).
///
/// `on_token_refreshed` runs before the retried request is sent, so whatever
/// it persists is visible to other calls from that point on.
/// `on_session_expired` runs when a refresh fails, before the error is
/// returned.
pub trait SessionHooks: Send + Sync {
    fn on_token_refreshed(&self, _tokens: &TokenPair) {}

    fn on_session_expired(&self) {}
}

impl SessionHooks for () {}
