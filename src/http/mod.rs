use std::collections::HashMap;

use derive_builder::Builder;
use serde_json::Value;

use crate::{InstituteError, connection::InstituteClientOpts, this_errors};

pub mod client;
pub mod error;
mod macros;
pub mod multipart;
pub(crate) mod refresh;
pub(crate) mod response;
mod url;

pub(crate) use macros::params;
pub(crate) use url::encode_segment;

pub(crate) const TRACING_TARGET: &str = "institute_client::http";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A request carries a JSON document or a multipart form, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(multipart::MultipartForm),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<multipart::MultipartForm> for RequestBody {
    fn from(form: multipart::MultipartForm) -> Self {
        RequestBody::Multipart(form)
    }
}

/// How a request relates to the caller's access token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// A bearer must be sent. Calling without an access token fails before
    /// anything goes on the wire.
    #[default]
    Required,
    /// A bearer is sent when one is available; a refresh is only attempted
    /// if one was.
    Optional,
    /// Never sends a bearer and never refreshes.
    Anonymous,
}

#[derive(Builder, Debug, Clone)]
pub struct RequestDescriptor {
    #[builder(default)]
    pub(crate) method: Method,

    #[builder(setter(into))]
    pub(crate) path: String,

    #[builder(setter(into), default)]
    pub(crate) params: Vec<(String, String)>,

    #[builder(setter(into), default)]
    pub(crate) body: RequestBody,

    #[builder(default)]
    pub(crate) auth: AuthMode,

    #[builder(setter(into), default = HashMap::new())]
    pub(crate) headers: HashMap<String, String>,
}

impl RequestDescriptor {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn auth(&self) -> AuthMode {
        self.auth
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Picks the token to send, if any, according to the auth mode.
    pub(crate) fn bearer_for<'a>(&self, access_token: Option<&'a str>) -> Option<&'a str> {
        match self.auth {
            AuthMode::Anonymous => None,
            AuthMode::Required | AuthMode::Optional => access_token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub(crate) fn to_http_request(
        &self,
        opts: &InstituteClientOpts,
        bearer: Option<&str>,
        request_id: &str,
    ) -> Result<client::HttpRequest, InstituteError> {
        let url = this_errors!(
            "failed to construct url",
            url::construct_url(&opts.base_url, &self.path, &self.params)
        );

        let mut headers = self.headers.clone();
        set_header(&mut headers, "Accept", "application/json".into());
        set_header(&mut headers, "User-Agent", opts.user_agent.clone());
        set_header(&mut headers, "X-Request-Id", request_id.to_string());

        if let Some(token) = bearer {
            set_header(&mut headers, "Authorization", format!("Bearer {}", token));
        }

        let body = match &self.body {
            RequestBody::Empty => client::HttpBody::Empty,
            RequestBody::Json(value) => {
                set_header(&mut headers, "Content-Type", "application/json".into());
                client::HttpBody::Bytes(this_errors!(
                    "failed to serialise body as json",
                    serde_json::to_vec(value)
                ))
            }
            RequestBody::Multipart(form) => client::HttpBody::Multipart(form.clone()),
        };

        Ok(client::HttpRequest {
            method: self.method,
            url,
            headers,
            body,
            timeout: opts.timeout,
        })
    }
}

/// Header names are case-insensitive, so any caller spelling of `name` is
/// replaced rather than sent alongside.
fn set_header(headers: &mut HashMap<String, String>, name: &str, value: String) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::InstituteClientOptsBuilder;

    fn opts() -> InstituteClientOpts {
        InstituteClientOptsBuilder::default()
            .base_url("https://api.example.edu/")
            .build()
            .unwrap()
    }

    #[test]
    fn json_bodies_get_a_content_type_and_bearer() {
        let descriptor = RequestDescriptorBuilder::default()
            .method(Method::Post)
            .path("/institution/create-course/")
            .body(json!({ "title": "Algebra" }))
            .build()
            .unwrap();

        let request = descriptor
            .to_http_request(&opts(), descriptor.bearer_for(Some("tok")), "rid-1")
            .unwrap();

        assert_eq!(request.url, "https://api.example.edu/institution/create-course/");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-request-id"), Some("rid-1"));
        assert_eq!(request.bearer(), Some("tok"));
        assert_eq!(request.body, client::HttpBody::Bytes(br#"{"title":"Algebra"}"#.to_vec()));
    }

    #[test]
    fn multipart_bodies_leave_content_type_to_the_transport() {
        let form = multipart::MultipartForm::new().text("about", "hi");
        let descriptor = RequestDescriptorBuilder::default()
            .method(Method::Put)
            .path("/student/verify/")
            .body(form.clone())
            .build()
            .unwrap();

        let request = descriptor.to_http_request(&opts(), None, "rid").unwrap();

        assert!(request.header("content-type").is_none());
        assert!(request.bearer().is_none());
        assert_eq!(request.body, client::HttpBody::Multipart(form));
    }

    #[test]
    fn anonymous_requests_never_carry_a_bearer() {
        let descriptor = RequestDescriptorBuilder::default()
            .path("/course/3/")
            .auth(AuthMode::Anonymous)
            .build()
            .unwrap();

        assert_eq!(descriptor.bearer_for(Some("tok")), None);
    }

    #[test]
    fn blank_tokens_are_not_sent() {
        let descriptor = RequestDescriptorBuilder::default()
            .path("/home/feed/")
            .auth(AuthMode::Optional)
            .build()
            .unwrap();

        assert_eq!(descriptor.bearer_for(Some("  ")), None);
        assert_eq!(descriptor.bearer_for(None), None);
    }

    #[test]
    fn built_in_headers_replace_any_caller_spelling() {
        let headers = HashMap::from([
            ("authorization".to_string(), "Bearer stale".to_string()),
            ("accept".to_string(), "text/html".to_string()),
            ("CONTENT-TYPE".to_string(), "text/plain".to_string()),
            ("X-Client".to_string(), "mobile".to_string()),
        ]);
        let descriptor = RequestDescriptorBuilder::default()
            .method(Method::Post)
            .path("/institution/job/create/")
            .body(json!({}))
            .headers(headers)
            .build()
            .unwrap();

        let request = descriptor
            .to_http_request(&opts(), Some("fresh"), "rid")
            .unwrap();

        assert_eq!(request.headers.len(), 6);
        assert_eq!(request.bearer(), Some("fresh"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-client"), Some("mobile"));
        assert!(!request.headers.contains_key("authorization"));
    }
}
