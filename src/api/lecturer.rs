use serde_json::{Value, json};

use crate::{
    ApiError, InstituteClient,
    auth::session::Session,
    http::{Method, client::InstituteHttpClient, encode_segment, multipart::MultipartForm},
};

use super::request;

impl<C: InstituteHttpClient> InstituteClient<C> {
    pub async fn lecturer_profile(&self, session: &Session) -> Result<Value, ApiError> {
        self.call_with_session(&request(Method::Get, "/lecturer/profile/self/"), session)
            .await
    }

    pub async fn edit_lecturer_profile(
        &self,
        session: &Session,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let mut builder = request(Method::Put, "/lecturer/profile/edit/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    /// Submits the lecturer's verification documents. The form is expected
    /// to carry `phone_number`, `about`, `academic_achievement`, `specialty`,
    /// `skills`, `experience`, `free_time` and the identity uploads.
    pub async fn verify_lecturer(&self, session: &Session, form: MultipartForm) -> Result<Value, ApiError> {
        let mut builder = request(Method::Put, "/lecturer/verify/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn lecturer_schedule(&self, session: &Session) -> Result<Value, ApiError> {
        self.call_with_session(&request(Method::Get, "/lecturer/schedule/"), session)
            .await
    }

    pub async fn apply_to_job(
        &self,
        session: &Session,
        job_id: &str,
        message: Option<&str>,
    ) -> Result<Value, ApiError> {
        let path = format!("/lecturer/job/{}/apply/", encode_segment(job_id));
        let mut builder = request(Method::Post, path);
        builder.body(json!({ "message": message.unwrap_or_default() }));
        self.call_with_session(&builder, session).await
    }

    pub async fn lecturer_public_profile(&self, username: &str) -> Result<Value, ApiError> {
        let path = format!("/lecturer/profile/{}/", encode_segment(username));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }
}
