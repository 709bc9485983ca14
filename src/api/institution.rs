use std::collections::BTreeMap;

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;

use crate::{
    ApiError, InstituteClient,
    auth::session::Session,
    http::{Method, client::InstituteHttpClient, encode_segment, multipart::MultipartForm},
};

use super::{json_body, request};

static STAT_FALLBACK_MESSAGE: &str = "Unable to fetch this statistic.";

static STAT_ENDPOINTS: [(&str, &str); 6] = [
    ("total_students", "/institution/total-students/"),
    ("total_lecturers", "/institution/total-lecturers/"),
    ("total_staff", "/institution/total-staff/"),
    ("active_students", "/institution/active-students/"),
    ("active_lecturers", "/institution/active-lecturers/"),
    ("active_staff", "/institution/active-staff/"),
];

/// False for `null`, `false`, `0` and `""`. Empty arrays and objects count
/// as present.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One dashboard figure, or the reason it could not be loaded.
pub type Statistic = Result<Value, String>;

#[derive(Debug, Clone, Serialize)]
pub struct JobPost {
    pub title: String,
    pub description: String,
    pub specialty: String,
    pub experience_required: u32,
    pub skills_required: String,
    /// Decimal amount, kept as text so it reaches the backend unrounded.
    pub salary_offer: String,
}

impl<C: InstituteHttpClient> InstituteClient<C> {
    /// Loads every dashboard counter concurrently. A failing counter does
    /// not fail the others.
    pub async fn dashboard_stats(&self, session: &Session) -> BTreeMap<&'static str, Statistic> {
        let builders: Vec<_> = STAT_ENDPOINTS
            .iter()
            .map(|(_, path)| request(Method::Get, *path))
            .collect();

        let results = join_all(
            builders
                .iter()
                .map(|builder| self.call_with_session(builder, session)),
        )
        .await;

        STAT_ENDPOINTS
            .iter()
            .zip(results)
            .map(|((key, _), result)| {
                let stat = result.map_err(|err| {
                    if err.message().is_empty() {
                        STAT_FALLBACK_MESSAGE.to_string()
                    } else {
                        err.message().to_string()
                    }
                });
                (*key, stat)
            })
            .collect()
    }

    /// The institution's timetable. Fails with a 500 when the backend
    /// answers without a `schedule` field.
    pub async fn schedule(&self, session: &Session) -> Result<Value, ApiError> {
        let builder = request(Method::Get, "/institution/schedule/");
        let mut data = self.call_with_session(&builder, session).await?;

        match data.as_object_mut().and_then(|o| o.remove("schedule")) {
            Some(schedule) if is_present(&schedule) => Ok(schedule),
            _ => Err(ApiError::new(500, "Schedule data missing from response.")),
        }
    }

    pub async fn institution_profile(&self, session: &Session) -> Result<Value, ApiError> {
        let builder = request(Method::Get, "/institution/profile/self/");
        self.call_with_session(&builder, session).await
    }

    pub async fn edit_institution_profile(
        &self,
        session: &Session,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let mut builder = request(Method::Put, "/institution/edit/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn verify_institution(
        &self,
        session: &Session,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let mut builder = request(Method::Put, "/institution/verify/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn create_job_post(&self, session: &Session, job: &JobPost) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, "/institution/job/create/");
        builder.body(json_body(job)?);
        self.call_with_session(&builder, session).await
    }

    /// `form` holds `title`, `description` and any number of `images` parts.
    pub async fn create_institution_post(
        &self,
        session: &Session,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, "/institution/create-post/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn create_course(&self, session: &Session, form: MultipartForm) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, "/institution/create-course/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn edit_course(
        &self,
        session: &Session,
        course_id: &str,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let path = format!("/institution/edit-course/{}/", encode_segment(course_id));
        let mut builder = request(Method::Put, path);
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn create_staff(&self, session: &Session, form: MultipartForm) -> Result<Value, ApiError> {
        let mut builder = request(Method::Post, "/institution/staff/create/");
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn staff_details(&self, session: &Session, staff_id: &str) -> Result<Value, ApiError> {
        let path = format!("/institution/staff/{}/", encode_segment(staff_id));
        self.call_with_session(&request(Method::Get, path), session)
            .await
    }

    pub async fn edit_staff(
        &self,
        session: &Session,
        staff_id: &str,
        form: MultipartForm,
    ) -> Result<Value, ApiError> {
        let path = format!("/institution/staff/{}/edit/", encode_segment(staff_id));
        let mut builder = request(Method::Put, path);
        builder.body(form);
        self.call_with_session(&builder, session).await
    }

    pub async fn delete_staff(&self, session: &Session, staff_id: &str) -> Result<Value, ApiError> {
        let path = format!("/institution/staff/{}/delete/", encode_segment(staff_id));
        self.call_with_session(&request(Method::Delete, path), session)
            .await
    }

    pub async fn institution_public_profile(&self, username: &str) -> Result<Value, ApiError> {
        let path = format!("/institution/profile/{}/", encode_segment(username));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }

    pub async fn institution_posts(&self, username: &str) -> Result<Value, ApiError> {
        let path = format!("/institution/{}/posts/", encode_segment(username));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }

    pub async fn institution_jobs(&self, username: &str) -> Result<Value, ApiError> {
        let path = format!("/institution/{}/jobs/", encode_segment(username));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }

    pub async fn job_details(&self, job_id: &str) -> Result<Value, ApiError> {
        let path = format!("/institution/job/{}/", encode_segment(job_id));
        self.call_anonymous(&mut request(Method::Get, path)).await
    }
}
