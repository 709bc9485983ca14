use serde::Serialize;
use serde_json::Value;

use crate::{
    ApiError, InstituteClient,
    auth::{Credentials, session::Session},
    http::{
        AuthMode, Method, RequestDescriptor, RequestDescriptorBuilder,
        client::InstituteHttpClient,
        multipart::{FilePart, MultipartForm},
        response,
    },
    this_errors,
};

pub mod institution;
pub mod lecturer;
pub mod registration;
pub mod shared;
pub mod student;

/// The identity uploads every verification and profile form accepts.
/// Missing files are simply not sent.
#[derive(Debug, Clone, Default)]
pub struct IdentityDocuments {
    pub profile_image: Option<FilePart>,
    pub idcard_front: Option<FilePart>,
    pub idcard_back: Option<FilePart>,
    pub residence_front: Option<FilePart>,
    pub residence_back: Option<FilePart>,
}

impl IdentityDocuments {
    pub fn append_to(self, form: MultipartForm) -> MultipartForm {
        form.file_opt("profile_image", self.profile_image)
            .file_opt("idcard_front", self.idcard_front)
            .file_opt("idcard_back", self.idcard_back)
            .file_opt("residence_front", self.residence_front)
            .file_opt("residence_back", self.residence_back)
    }
}

pub(crate) fn request(method: Method, path: impl Into<String>) -> RequestDescriptorBuilder {
    let mut builder = RequestDescriptorBuilder::default();
    builder.method(method).path(path);
    builder
}

pub(crate) fn json_body<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    Ok(this_errors!(
        "failed to serialise request payload",
        serde_json::to_value(payload)
    ))
}

pub(crate) fn build(builder: &RequestDescriptorBuilder) -> Result<RequestDescriptor, ApiError> {
    Ok(this_errors!("failed to build request", builder.build()))
}

/// Fails with a 401 carrying `message` when the session holds no access
/// token, before anything is sent.
pub(crate) fn require_access(session: &Session, message: &str) -> Result<(), ApiError> {
    match session.credentials().access {
        Some(token) if !token.trim().is_empty() => Ok(()),
        _ => Err(ApiError::new(401, message)),
    }
}

impl<C: InstituteHttpClient> InstituteClient<C> {
    /// Runs a descriptor with the session's tokens, writing refreshed tokens
    /// back into it.
    pub(crate) async fn call_with_session(
        &self,
        builder: &RequestDescriptorBuilder,
        session: &Session,
    ) -> Result<Value, ApiError> {
        let descriptor = build(builder)?;
        self.execute_with_hooks(&descriptor, &session.credentials(), session)
            .await
    }

    /// Runs a descriptor as an optional-auth request: with the session's
    /// tokens when a session is given, anonymously otherwise.
    pub(crate) async fn call_with_optional_session(
        &self,
        builder: &mut RequestDescriptorBuilder,
        session: Option<&Session>,
    ) -> Result<Value, ApiError> {
        builder.auth(AuthMode::Optional);

        match session {
            Some(session) => self.call_with_session(builder, session).await,
            None => self.call_anonymous(builder).await,
        }
    }

    pub(crate) async fn call_anonymous(
        &self,
        builder: &mut RequestDescriptorBuilder,
    ) -> Result<Value, ApiError> {
        let descriptor = build(builder.auth(AuthMode::Anonymous))?;
        self.execute(&descriptor, &Credentials::anonymous())
            .await
            .into_result()
    }

    /// Anonymous call for endpoints that may answer 2xx with
    /// `"success": false`. Both kinds of failure keep the response status.
    pub(crate) async fn call_registration(
        &self,
        builder: &mut RequestDescriptorBuilder,
    ) -> Result<Value, ApiError> {
        let descriptor = build(builder.auth(AuthMode::Anonymous))?;
        let resp = self.executor.send_once(&descriptor).await?;
        let data = response::parse_body(&resp.body);

        if !resp.is_success() || response::is_soft_failure(&data) {
            return Err(ApiError::from_response(resp.status, data));
        }

        Ok(data)
    }
}
