//! HTTP server for the cadre registry.
//!
//! Wires the JSON API from `cadre-api` onto a SQLite-backed store and adds
//! the transport concerns: configuration, request tracing, and the listener
//! itself (in `main.rs`).

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use cadre_core::store::ProgramStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the application router: the registry API under `/api`, with
/// per-request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ProgramStore + 'static,
{
  Router::new()
    .nest("/api", cadre_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use cadre_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(store))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  // ── People ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_person() {
    let app = app().await;
    let (status, created) = send(
      &app,
      "POST",
      "/api/people",
      Some(json!({
        "first_name": "Maja",
        "last_name": "Lindqvist",
        "email": "maja@example.org",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) =
      send(&app, "GET", &format!("/api/people/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "maja@example.org");
  }

  #[tokio::test]
  async fn missing_person_is_404_with_error_body() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/people/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "person #999 not found");
  }

  #[tokio::test]
  async fn duplicate_institution_name_is_409() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "POST",
      "/api/institutions",
      Some(json!({ "name": "Uppsala University" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
      &app,
      "POST",
      "/api/institutions",
      Some(json!({ "name": "Uppsala University" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Uppsala University"));
  }

  // ── Terms ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn term_sequencer_advances_and_guards_deletion() {
    let app = app().await;
    let (status, spring) = send(&app, "POST", "/api/course-terms", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(spring["season"], "spring");
    assert_eq!(spring["year"], 2019);

    let (_, summer) = send(&app, "POST", "/api/course-terms", None).await;
    assert_eq!(summer["season"], "summer");

    // Only the newest term is deletable.
    let spring_id = spring["id"].as_i64().unwrap();
    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/api/course-terms/{spring_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let summer_id = summer["id"].as_i64().unwrap();
    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/api/course-terms/{summer_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  // ── Courses and enrollment ─────────────────────────────────────────────────

  async fn make_phd_student(app: &Router, email: &str) -> i64 {
    let (_, person) = send(
      app,
      "POST",
      "/api/people",
      Some(json!({
        "first_name": "Test",
        "last_name": "Student",
        "email": email,
      })),
    )
    .await;
    let (_, role) = send(
      app,
      "POST",
      "/api/person-roles",
      Some(json!({
        "person_id": person["id"],
        "kind": "phd_student",
      })),
    )
    .await;
    let (status, student) = send(
      app,
      "POST",
      "/api/phd-students",
      Some(json!({ "person_role_id": role["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    student["id"].as_i64().unwrap()
  }

  #[tokio::test]
  async fn enrollment_flow_over_http() {
    let app = app().await;
    let student_id = make_phd_student(&app, "enrolled@example.org").await;

    let (_, term) = send(&app, "POST", "/api/course-terms", None).await;
    let (status, course) = send(
      &app,
      "POST",
      "/api/courses",
      Some(json!({
        "title": "Research Ethics",
        "course_term_id": term["id"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = course["id"].as_i64().unwrap();

    let (status, _) = send(
      &app,
      "POST",
      &format!("/api/courses/{course_id}/students"),
      Some(json!({ "phd_student_id": student_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, updated) = send(
      &app,
      "PATCH",
      &format!("/api/courses/{course_id}/students/{student_id}"),
      Some(json!({ "is_completed": true, "grade": "pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["grade"], "pass");

    let (status, enrollments) = send(
      &app,
      "GET",
      &format!("/api/phd-students/{student_id}/enrollments"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(enrollments.as_array().unwrap().len(), 1);

    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/api/courses/{course_id}/students/{student_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Withdrawing again reports the missing enrollment.
    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/api/courses/{course_id}/students/{student_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn course_without_anchor_is_400() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/api/courses",
      Some(json!({ "title": "Floating Course" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("anchor") ||
      body["error"].as_str().unwrap().contains("term"));
  }

  // ── Letters ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn letters_attach_to_person_roles() {
    let app = app().await;
    let (_, person) = send(
      &app,
      "POST",
      "/api/people",
      Some(json!({
        "first_name": "Erik",
        "last_name": "Berg",
        "email": "erik@example.org",
      })),
    )
    .await;
    let (_, role) = send(
      &app,
      "POST",
      "/api/person-roles",
      Some(json!({ "person_id": person["id"], "kind": "researcher" })),
    )
    .await;
    let role_id = role["id"].as_i64().unwrap();

    let (status, letter) = send(
      &app,
      "POST",
      &format!("/api/person-roles/{role_id}/letters"),
      Some(json!({ "link": "https://letters.example.org/1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(letter["parent_kind"], "person_role");
    let letter_id = letter["id"].as_i64().unwrap();

    let (status, listed) = send(
      &app,
      "GET",
      &format!("/api/person-roles/{role_id}/letters"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = send(
      &app,
      "PUT",
      &format!("/api/letters/{letter_id}"),
      Some(json!({ "link": "https://letters.example.org/1-amended" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["link"], "https://letters.example.org/1-amended");

    let (status, _) =
      send(&app, "DELETE", &format!("/api/letters/{letter_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // A letter under a different parent kind does not resolve by role id.
    let (status, _) = send(
      &app,
      "GET",
      &format!("/api/courses/{role_id}/letters"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Referential guards ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn person_with_roles_cannot_be_deleted_over_http() {
    let app = app().await;
    let (_, person) = send(
      &app,
      "POST",
      "/api/people",
      Some(json!({
        "first_name": "Hanna",
        "last_name": "Nilsson",
        "email": "hanna@example.org",
      })),
    )
    .await;
    let person_id = person["id"].as_i64().unwrap();
    send(
      &app,
      "POST",
      "/api/person-roles",
      Some(json!({ "person_id": person_id, "kind": "postdoc" })),
    )
    .await;

    let (status, body) =
      send(&app, "DELETE", &format!("/api/people/{person_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("person roles"));
  }
}
