use std::{sync::Arc, time::Duration};

use derive_builder::Builder;
use serde_json::Value;

use crate::{
    ApiError,
    auth::{Credentials, SessionHooks},
    executor::{Executor, Outcome},
    http::{RequestDescriptor, client::InstituteHttpClient},
};

pub(crate) static DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub(crate) static DEFAULT_REFRESH_PATH: &str = "/registration/refresh/";
pub(crate) static BASE_URL_ENV: &str = "INSTITUTE_API_BASE_URL";

fn default_user_agent() -> String {
    format!("institute-client/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Builder, Debug, Clone)]
pub struct InstituteClientOpts {
    /// Root of the REST API, e.g. `https://api.example.edu`. Trailing slashes
    /// are ignored.
    #[builder(setter(into))]
    pub(crate) base_url: String,

    /// Endpoint that exchanges a refresh token for a new access token.
    #[builder(setter(into), default = "DEFAULT_REFRESH_PATH.into()")]
    pub(crate) refresh_path: String,

    /// Per request deadline. Unset means the transport's default.
    #[builder(setter(into, strip_option), default = None)]
    pub(crate) timeout: Option<Duration>,

    #[builder(setter(into), default = "default_user_agent()")]
    pub(crate) user_agent: String,
}

impl InstituteClientOpts {
    /// Reads the base url from `INSTITUTE_API_BASE_URL`, falling back to a
    /// local development server.
    pub fn from_env() -> Self {
        Self::from_base_url_var(std::env::var(BASE_URL_ENV).ok())
    }

    fn from_base_url_var(value: Option<String>) -> Self {
        let base_url = value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn connect_with_client<C: InstituteHttpClient>(self) -> InstituteClient<C> {
        InstituteClient::new(Connection::new(C::new(), self))
    }

    #[cfg(feature = "reqwest")]
    pub fn connect(self) -> InstituteClient<reqwest::Client> {
        self.connect_with_client::<reqwest::Client>()
    }
}

#[derive(Clone)]
pub(crate) struct Connection<C>
where
    C: Clone,
{
    client: C,
    opts: Arc<InstituteClientOpts>,
}

impl<C> Connection<C>
where
    C: InstituteHttpClient + Clone,
{
    pub(crate) fn new(client: C, opts: InstituteClientOpts) -> Self {
        Self {
            client,
            opts: Arc::new(opts),
        }
    }

    pub(crate) fn get_opts(&self) -> Arc<InstituteClientOpts> {
        self.opts.clone()
    }

    pub(crate) fn get_client(&self) -> C {
        self.client.clone()
    }
}

/// Handle to the API. Cheap to clone; every endpoint method goes through
/// the same [`Executor`].
#[derive(Clone)]
pub struct InstituteClient<C: InstituteHttpClient> {
    pub(crate) executor: Executor<C>,
    pub(crate) conn: Connection<C>,
}

impl<C: InstituteHttpClient> InstituteClient<C> {
    pub(crate) fn new(conn: Connection<C>) -> Self {
        Self {
            executor: Executor::new(conn.clone()),
            conn,
        }
    }

    /// Wraps an already configured transport.
    pub fn with_client(client: C, opts: InstituteClientOpts) -> Self {
        Self::new(Connection::new(client, opts))
    }

    pub fn opts(&self) -> Arc<InstituteClientOpts> {
        self.conn.get_opts()
    }

    pub fn executor(&self) -> &Executor<C> {
        &self.executor
    }

    pub async fn execute(&self, descriptor: &RequestDescriptor, credentials: &Credentials) -> Outcome {
        self.executor.execute(descriptor, credentials).await
    }

    pub async fn execute_with_hooks<H: SessionHooks + ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        credentials: &Credentials,
        hooks: &H,
    ) -> Result<Value, ApiError> {
        self.executor
            .execute_with_hooks(descriptor, credentials, hooks)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_defaults() {
        let opts = InstituteClientOptsBuilder::default()
            .base_url("https://api.example.edu//")
            .build()
            .unwrap();

        assert_eq!(opts.base_url(), "https://api.example.edu");
        assert_eq!(opts.refresh_path, "/registration/refresh/");
        assert!(opts.timeout.is_none());
        assert!(opts.user_agent.starts_with("institute-client/"));
    }

    #[test]
    fn builder_requires_a_base_url() {
        assert!(InstituteClientOptsBuilder::default().build().is_err());
    }

    #[test]
    fn timeout_is_optional() {
        let opts = InstituteClientOptsBuilder::default()
            .base_url("http://h")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn unset_or_blank_base_url_falls_back_to_local_server() {
        for value in [None, Some(String::new()), Some("   ".to_string())] {
            let opts = InstituteClientOpts::from_base_url_var(value);

            assert_eq!(opts.base_url(), "http://127.0.0.1:8000");
            assert_eq!(opts.refresh_path, "/registration/refresh/");
            assert!(opts.user_agent.starts_with("institute-client/"));
        }
    }

    #[test]
    fn base_url_variable_is_used_when_set() {
        let opts =
            InstituteClientOpts::from_base_url_var(Some("https://api.example.edu/".to_string()));
        assert_eq!(opts.base_url(), "https://api.example.edu");
    }
}
