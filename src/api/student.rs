use serde_json::Value;

use crate::{
    ApiError, InstituteClient,
    auth::session::Session,
    http::{Method, client::InstituteHttpClient, encode_segment, multipart::MultipartForm},
};

use super::request;

impl<C: InstituteHttpClient> InstituteClient<C> {
    pub async fn student_profile(&self, session: &Session) -> Result<Value, ApiError> {
        self.call_with_session(&request(Method::Get, "/student/profile/self/"), session)
            .await
    }

    pub async fn edit_student_profile(
        &self,
        session: &Session,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let mut builder = request(Method::Put, "/student/profile/edit/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    /// The backend identifies the student from the bearer token, so the
    /// path carries no id.
    pub async fn verify_student(&self, session: &Session, form: MultipartForm) -> Result<Value, ApiError> {
        let mut builder = request(Method::Put, "/student/verify/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn student_schedule(&self, session: &Session) -> Result<Value, ApiError> {
        self.call_with_session(&request(Method::Get, "/student/schedule/"), session)
            .await
    }

    pub async fn student_public_profile(&self, username: &str) -> Result<Value, ApiError> {
        let path = format!("/student/profile/{}/", encode_segment(username));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }

    pub async fn student_courses(&self, username: &str) -> Result<Value, ApiError> {
        let path = format!("/student/{}/courses/", encode_segment(username));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        auth::session::Session,
        testing::{MockClient, test_client},
    };

    #[tokio::test]
    async fn refreshed_tokens_are_written_back_to_the_session() {
        let mock = MockClient::default();
        mock.push(401, json!({ "detail": "Given token not valid for any token type" }));
        mock.push(200, json!({ "access": "a2" }));
        mock.push(200, json!({ "username": "sara" }));
        let session = Session::new("a1", "r1");

        let profile = test_client(&mock).student_profile(&session).await.unwrap();

        assert_eq!(profile["username"], "sara");
        assert_eq!(session.credentials().access.as_deref(), Some("a2"));
        assert_eq!(session.credentials().refresh.as_deref(), Some("r1"));
        assert_eq!(
            mock.paths(),
            vec!["/student/profile/self/", "/registration/refresh/", "/student/profile/self/"]
        );
    }

    #[tokio::test]
    async fn failed_refresh_expires_the_session() {
        let mock = MockClient::default();
        mock.push(401, json!({ "detail": "expired" }));
        mock.push(401, json!({ "detail": "Token is blacklisted" }));
        let session = Session::new("a1", "r1");

        let err = test_client(&mock).student_schedule(&session).await.unwrap_err();

        assert_eq!(err.status(), 401);
        assert_eq!(err.message(), "Token is blacklisted");
        assert!(session.is_expired());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn public_course_list_is_anonymous() {
        let mock = MockClient::default();
        mock.push(200, json!([]));

        let courses = test_client(&mock).student_courses("sara").await.unwrap();
        assert_eq!(courses, json!([]));
        assert!(mock.requests()[0].bearer().is_none());
    }
}
