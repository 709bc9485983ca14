use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ApiError,
    auth::TokenPair,
    connection::Connection,
    http::{
        AuthMode, Method, RequestDescriptorBuilder, TRACING_TARGET,
        client::InstituteHttpClient, error::SESSION_EXPIRED_MESSAGE, response,
    },
};

static REFRESH_FAILED_MESSAGE: &str = "Unable to refresh session.";
static REFRESH_REQUIRED_MESSAGE: &str = "Refresh token is required.";

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// The backend only hands out a new access token; `refresh` is read when a
/// rotating backend sends one.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
    refresh: Option<String>,
}

/// Exchanges a refresh token for a new pair. A response without a refresh
/// token keeps the one that was sent.
pub(crate) async fn refresh_tokens<C: InstituteHttpClient>(
    conn: &Connection<C>,
    refresh_token: &str,
    request_id: &str,
) -> Result<TokenPair, ApiError> {
    if refresh_token.trim().is_empty() {
        return Err(ApiError::new(400, REFRESH_REQUIRED_MESSAGE));
    }

    let opts = conn.get_opts();

    let body = serde_json::to_value(RefreshRequest {
        refresh: refresh_token,
    })
    .map_err(|_| ApiError::new(400, REFRESH_FAILED_MESSAGE))?;

    let descriptor = RequestDescriptorBuilder::default()
        .method(Method::Post)
        .path(opts.refresh_path.as_str())
        .auth(AuthMode::Anonymous)
        .body(body)
        .build()
        .map_err(|_| ApiError::new(400, REFRESH_FAILED_MESSAGE))?;

    let request = descriptor.to_http_request(&opts, None, request_id)?;

    let resp = match conn.get_client().send(request).await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET,
                request_id = %request_id,
                error = %err,
                "refresh request could not be sent"
            );
            return Err(ApiError::from_response(
                400,
                json!({ "message": REFRESH_FAILED_MESSAGE }),
            ));
        }
    };

    let data = response::parse_body(&resp.body);

    if resp.is_success() {
        if let Ok(RefreshResponse {
            access: Some(access),
            refresh,
        }) = serde_json::from_value::<RefreshResponse>(data.clone())
        {
            if !access.is_empty() {
                tracing::debug!(target: TRACING_TARGET, request_id = %request_id, "access token refreshed");

                return Ok(TokenPair {
                    access,
                    refresh: refresh
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| refresh_token.to_string()),
                });
            }
        }
    }

    Err(ApiError::with_fallback(
        resp.status,
        data,
        SESSION_EXPIRED_MESSAGE,
    ))
}
