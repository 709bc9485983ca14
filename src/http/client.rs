use std::{collections::HashMap, time::Duration};

use crate::{InstituteError, http::Method, http::multipart::MultipartForm};
use core::future::Future;

#[cfg(feature = "reqwest")]
use reqwest;

#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(MultipartForm),
}

/// A fully resolved request, ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: HttpBody,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn bearer(&self) -> Option<&str> {
        self.header("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The transport the executor sends requests through. Any status code is a
/// successful send; only failing to get a response at all is an error.
pub trait InstituteHttpClient: Clone + Send + Sync + 'static {
    fn new() -> Self;

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, InstituteError>> + Send;
}

#[cfg(feature = "reqwest")]
impl InstituteHttpClient for reqwest::Client {
    fn new() -> Self {
        reqwest::Client::builder()
            .gzip(true)
            .referer(false)
            .build()
            .unwrap_or_default()
    }

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, InstituteError>> + Send {
        use crate::{error, this_errors};

        async move {
            use reqwest::header::HeaderMap;

            let url = this_errors!("failed to parse url", reqwest::Url::parse(&request.url));

            let headers = this_errors!(
                "failed to convert headers",
                request
                    .headers
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            reqwest::header::HeaderName::from_bytes(k.as_bytes())
                                .map_err(|e| error!(e))?,
                            reqwest::header::HeaderValue::from_str(v.as_str())
                                .map_err(|e| error!(e))?,
                        ))
                    })
                    .collect::<Result<
                        Vec<(reqwest::header::HeaderName, reqwest::header::HeaderValue)>,
                        InstituteError,
                    >>()
            );

            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self
                .request(method, url)
                .headers(HeaderMap::from_iter(headers));

            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            builder = match request.body {
                HttpBody::Empty => builder,
                HttpBody::Bytes(bytes) => builder.body(bytes),
                HttpBody::Multipart(form) => builder.multipart(into_reqwest_form(form)?),
            };

            let resp = this_errors!("failed to send request", builder.send().await);
            let status = resp.status().as_u16();
            let bytes = this_errors!("failed to get response bytes", resp.bytes().await);

            Ok(HttpResponse {
                status,
                body: bytes.to_vec(),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
fn into_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, InstituteError> {
    use crate::{http::multipart::Part, this_errors};
    use reqwest::multipart;

    let mut out = multipart::Form::new();

    for (name, part) in form.parts() {
        out = match part {
            Part::Text(value) => out.text(name.clone(), value.clone()),
            Part::File(file) => {
                let mut p = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(mime) = file.mime_type.as_deref() {
                    p = this_errors!("invalid mime type for upload", p.mime_str(mime));
                }
                out.part(name.clone(), p)
            }
        };
    }

    Ok(out)
}
