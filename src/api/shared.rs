use serde_json::Value;

use crate::{
    ApiError, InstituteClient,
    auth::session::Session,
    http::{
        Method,
        client::InstituteHttpClient,
        encode_segment,
        multipart::{FilePart, MultipartForm},
        params,
    },
};

use super::{request, require_access};

impl<C: InstituteHttpClient> InstituteClient<C> {
    /// The home feed. Signed in users get a personalised feed; without a
    /// session the public one is returned.
    pub async fn feed(&self, session: Option<&Session>) -> Result<Value, ApiError> {
        self.call_with_optional_session(&mut request(Method::Get, "/home/feed/"), session)
            .await
    }

    pub async fn explore(
        &self,
        query: &str,
        filter: Option<&str>,
        session: Option<&Session>,
    ) -> Result<Value, ApiError> {
        let mut builder = request(Method::Get, "/explore/");
        builder.params(params!(("q", query), ("filter", filter)));
        self.call_with_optional_session(&mut builder, session).await
    }

    pub async fn notifications(&self, session: &Session) -> Result<Value, ApiError> {
        self.call_with_session(&request(Method::Get, "/notifications/"), session)
            .await
    }

    /// Sends a document to the backend's automated document check.
    pub async fn check_document(&self, session: &Session, file: FilePart) -> Result<Value, ApiError> {
        require_access(session, "Access token is required for AI document validation.")?;

        let mut builder = request(Method::Post, "/ai/doc/");
        builder.body(MultipartForm::new().file("file", file));
        self.call_with_session(&builder, session).await
    }

    pub async fn course_details(&self, course_id: &str) -> Result<Value, ApiError> {
        let path = format!("/course/{}/", encode_segment(course_id));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }
}
