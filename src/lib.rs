pub mod api;
pub mod auth;
pub(crate) mod connection;
pub(crate) mod errors;
pub(crate) mod executor;
pub(crate) mod http;

pub(crate) use errors::{error, this_errors};

pub use errors::InstituteError;

pub use connection::{
    InstituteClient, InstituteClientOpts, InstituteClientOptsBuilder,
    InstituteClientOptsBuilderError,
};

pub use auth::{Credentials, SessionHooks, TokenPair, session::Session};

pub use http::{
    AuthMode, Method, RequestBody, RequestDescriptor, RequestDescriptorBuilder,
    RequestDescriptorBuilderError,
    client::{HttpBody, HttpRequest, HttpResponse, InstituteHttpClient},
    error::{ApiError, suggests_signup},
    multipart::{FilePart, MultipartForm, Part},
};

pub use api::{
    IdentityDocuments,
    institution::{JobPost, Statistic},
};

pub use executor::{Executor, Outcome};

#[cfg(test)]
pub(crate) mod testing;
