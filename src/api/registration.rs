use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    ApiError, InstituteClient,
    auth::{TokenPair, session::Session},
    http::{Method, client::InstituteHttpClient, params, refresh},
};

use super::{json_body, request, require_access};

static LOGIN_PATH: &str = "/registration/login/";
static SIGNUP_PATH: &str = "/registration/signup/";
static OTP_PATH: &str = "/registration/otp/";
static IS_VERIFIED_PATH: &str = "/registration/is-verified/";

impl<C: InstituteHttpClient> InstituteClient<C> {
    /// Asks the backend to email a one time login code.
    pub async fn request_otp(&self, email: &str) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, LOGIN_PATH);
        builder.body(json!({ "email": email }));
        self.call_registration(&mut builder).await
    }

    /// Registers a new account. The payload shape depends on the role being
    /// registered and is passed through untouched.
    pub async fn signup<T: Serialize>(&self, payload: &T) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, SIGNUP_PATH);
        builder.body(json_body(payload)?);
        self.call_registration(&mut builder).await
    }

    /// Exchanges an emailed code for a token pair. The response carries the
    /// tokens and the user's role; use [`Session::new`] to start a session
    /// from it.
    pub async fn verify_otp(&self, email: &str, otp_code: &str) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, OTP_PATH);
        builder.body(json!({ "email": email, "otp_code": otp_code }));
        self.call_registration(&mut builder).await
    }

    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        refresh::refresh_tokens(&self.conn, refresh_token, &request_id).await
    }

    pub async fn check_verification_status(
        &self,
        session: &Session,
        email: &str,
    ) -> Result<Value, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::new(
                400,
                "Email is required to check verification status.",
            ));
        }

        require_access(
            session,
            "Access token is required to check verification status.",
        )?;

        let mut builder = request(Method::Get, IS_VERIFIED_PATH);
        builder.params(params!(("email", email)));
        self.call_with_session(&builder, session).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        auth::session::Session,
        http::client::HttpBody,
        testing::{MockClient, test_client},
    };

    #[tokio::test]
    async fn request_otp_posts_the_email_anonymously() {
        let mock = MockClient::default();
        mock.push(200, json!({ "success": true, "message": "Code sent" }));

        let data = test_client(&mock).request_otp("ana@uni.edu").await.unwrap();
        assert_eq!(data["message"], "Code sent");

        let sent = mock.requests();
        assert_eq!(mock.paths(), vec!["/registration/login/"]);
        assert!(sent[0].bearer().is_none());
        assert_eq!(
            sent[0].body,
            HttpBody::Bytes(serde_json::to_vec(&json!({ "email": "ana@uni.edu" })).unwrap())
        );
    }

    #[tokio::test]
    async fn unknown_email_suggests_signup() {
        let mock = MockClient::default();
        mock.push(404, json!({ "message": "This email is not registered." }));

        let err = test_client(&mock).request_otp("who@uni.edu").await.unwrap_err();
        assert_eq!(err.status(), 404);
        assert!(err.suggests_signup());
    }

    #[tokio::test]
    async fn success_false_is_an_error_even_on_200() {
        let mock = MockClient::default();
        mock.push(200, json!({ "success": false, "errors": { "otp_code": "Invalid code." } }));

        let err = test_client(&mock)
            .verify_otp("ana@uni.edu", "000000")
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid code.");
        assert!(!err.suggests_signup());
    }

    #[tokio::test]
    async fn soft_failure_keeps_the_response_status() {
        let mock = MockClient::default();
        mock.push(201, json!({ "success": false, "message": "Email taken" }));

        let err = test_client(&mock)
            .signup(&json!({ "email": "ana@uni.edu", "role": "student" }))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 201);
        assert_eq!(err.message(), "Email taken");
        assert_eq!(err.data()["success"], false);
    }

    #[tokio::test]
    async fn verification_status_needs_an_email() {
        let mock = MockClient::default();
        let session = Session::new("a", "r");

        let err = test_client(&mock)
            .check_verification_status(&session, " ")
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn verification_status_needs_a_signed_in_session() {
        let mock = MockClient::default();
        let session = Session::anonymous();

        let err = test_client(&mock)
            .check_verification_status(&session, "ana@uni.edu")
            .await
            .unwrap_err();
        assert_eq!(err.status(), 401);
        assert_eq!(
            err.message(),
            "Access token is required to check verification status."
        );
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn verification_status_encodes_the_email() {
        let mock = MockClient::default();
        mock.push(200, json!({ "is_verified": true }));
        let session = Session::new("a", "r");

        test_client(&mock)
            .check_verification_status(&session, "ana+1@uni.edu")
            .await
            .unwrap();

        assert_eq!(mock.paths(), vec!["/registration/is-verified/?email=ana%2B1%40uni.edu"]);
        assert_eq!(mock.requests()[0].bearer(), Some("a"));
    }
}
