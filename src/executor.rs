use serde_json::Value;

use crate::{
    ApiError,
    auth::{Credentials, SessionHooks, TokenPair},
    connection::Connection,
    http::{
        AuthMode, RequestDescriptor, TRACING_TARGET,
        client::{HttpResponse, InstituteHttpClient},
        refresh, response,
    },
};

/// How a single logical call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The first request succeeded.
    Success(Value),
    /// The first request was rejected with a 401, the tokens were refreshed
    /// and the retry succeeded.
    RefreshedAndRetried(Value, TokenPair),
    /// The tokens were refreshed but the retry failed anyway. The new pair is
    /// still valid and should be kept.
    RefreshedThenFailed(ApiError, TokenPair),
    /// A 401 could not be recovered because the refresh itself failed.
    SessionExpired(ApiError),
    /// Any other failure.
    Failed(ApiError),
}

impl Outcome {
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Outcome::Success(data) | Outcome::RefreshedAndRetried(data, _) => Ok(data),
            Outcome::RefreshedThenFailed(err, _)
            | Outcome::SessionExpired(err)
            | Outcome::Failed(err) => Err(err),
        }
    }

    pub fn refreshed_tokens(&self) -> Option<&TokenPair> {
        match self {
            Outcome::RefreshedAndRetried(_, tokens) | Outcome::RefreshedThenFailed(_, tokens) => {
                Some(tokens)
            }
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_) | Outcome::RefreshedAndRetried(..))
    }
}

/// Runs requests against protected endpoints. On a 401 it refreshes the
/// access token and retries once; it never refreshes twice for one call and
/// holds no state between calls.
#[derive(Clone)]
pub struct Executor<C: InstituteHttpClient> {
    conn: Connection<C>,
}

impl<C: InstituteHttpClient> Executor<C> {
    pub(crate) fn new(conn: Connection<C>) -> Self {
        Self { conn }
    }

    pub async fn execute(&self, descriptor: &RequestDescriptor, credentials: &Credentials) -> Outcome {
        self.run(descriptor, credentials, &()).await
    }

    /// Same as [`Executor::execute`], reporting token changes through `hooks`
    /// instead of the returned variant.
    pub async fn execute_with_hooks<H: SessionHooks + ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        credentials: &Credentials,
        hooks: &H,
    ) -> Result<Value, ApiError> {
        self.run(descriptor, credentials, hooks).await.into_result()
    }

    async fn run<H: SessionHooks + ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        credentials: &Credentials,
        hooks: &H,
    ) -> Outcome {
        let request_id = uuid::Uuid::new_v4().to_string();
        let bearer = descriptor.bearer_for(credentials.access.as_deref());

        if descriptor.auth == AuthMode::Required && bearer.is_none() {
            tracing::warn!(
                target: TRACING_TARGET,
                request_id = %request_id,
                path = descriptor.path(),
                "protected request attempted without an access token"
            );
            return Outcome::Failed(ApiError::missing_credentials());
        }

        let mut resp = match self.send(descriptor, bearer, &request_id).await {
            Ok(resp) => resp,
            Err(err) => return Outcome::Failed(err),
        };

        let mut refreshed = None;

        let refresh_token = credentials.refresh.as_deref().filter(|r| !r.is_empty());

        if let (401, Some(_), Some(refresh_token)) = (resp.status, bearer, refresh_token) {
            tracing::debug!(
                target: TRACING_TARGET,
                request_id = %request_id,
                path = descriptor.path(),
                "access token rejected, refreshing"
            );

            let tokens = match refresh::refresh_tokens(&self.conn, refresh_token, &request_id).await {
                Ok(tokens) => tokens,
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        request_id = %request_id,
                        status = err.status(),
                        "token refresh failed, session expired"
                    );
                    hooks.on_session_expired();
                    return Outcome::SessionExpired(err);
                }
            };

            hooks.on_token_refreshed(&tokens);

            resp = match self.send(descriptor, Some(&tokens.access), &request_id).await {
                Ok(resp) => resp,
                Err(err) => return Outcome::RefreshedThenFailed(err, tokens),
            };

            refreshed = Some(tokens);
        }

        let data = response::parse_body(&resp.body);

        if !resp.is_success() {
            let err = ApiError::from_response(resp.status, data);

            tracing::warn!(
                target: TRACING_TARGET,
                request_id = %request_id,
                path = descriptor.path(),
                status = err.status(),
                message = err.message(),
                "request failed"
            );

            return match refreshed {
                Some(tokens) => Outcome::RefreshedThenFailed(err, tokens),
                None => Outcome::Failed(err),
            };
        }

        match refreshed {
            Some(tokens) => Outcome::RefreshedAndRetried(data, tokens),
            None => Outcome::Success(data),
        }
    }

    /// Sends an anonymous request once and hands back the raw response, for
    /// callers that need the status of a 2xx answer.
    pub(crate) async fn send_once(&self, descriptor: &RequestDescriptor) -> Result<HttpResponse, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.send(descriptor, None, &request_id).await
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        bearer: Option<&str>,
        request_id: &str,
    ) -> Result<HttpResponse, ApiError> {
        let opts = self.conn.get_opts();
        let request = descriptor.to_http_request(&opts, bearer, request_id)?;

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request_id,
            method = descriptor.method().as_str(),
            path = descriptor.path(),
            authenticated = bearer.is_some(),
            "sending request"
        );

        match self.conn.get_client().send(request).await {
            Ok(resp) => Ok(resp),
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    request_id = %request_id,
                    error = %err,
                    "request could not be sent"
                );
                Err(err.into())
            }
        }
    }
}
