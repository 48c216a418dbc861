//! JSON REST API for Stammbaum.
//!
//! Exposes an axum [`Router`] backed by any
//! [`stammbaum_core::store::PersonStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stammbaum_api::api_router(store.clone(), ApiConfig::default()))
//! ```

pub mod error;
pub mod persons;
pub mod search;
pub mod tree;

use std::sync::Arc;

use axum::{Router, routing::get};
use stammbaum_core::store::PersonStore;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Limits applied by the handlers.
#[derive(Debug, Clone, Copy)]
pub struct ApiConfig {
  /// Largest accepted `depth` / `generations` parameter.
  pub max_depth: u32,
}

impl Default for ApiConfig {
  fn default() -> Self { Self { max_depth: 10 } }
}

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub config: ApiConfig,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, config: ApiConfig) -> Router<()>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route("/persons/search", get(search::handler::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>)
        .put(persons::update::<S>)
        .delete(persons::delete_one::<S>),
    )
    .route("/persons/{id}/profile", get(persons::profile::<S>))
    // Ancestor trees
    .route("/persons/{id}/tree", get(tree::ancestor_tree::<S>))
    .route("/persons/{id}/chart", get(tree::ancestor_chart::<S>))
    .with_state(ApiState { store, config })
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use stammbaum_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store), ApiConfig::default())
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create(app: &Router, body: Value) -> Value {
    let resp = send(app, "POST", "/persons", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
  }

  // ── Persons ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_treats_zero_and_empty_parent_as_none() {
    let app = app().await;
    let eva = create(
      &app,
      json!({
        "given_name": "Eva",
        "family_name": "Berger",
        "birth_date": "1980-05-01",
        "sex": "female",
        "father_id": 0,
        "mother_id": ""
      }),
    )
    .await;
    assert_eq!(eva["father_id"], Value::Null);
    assert_eq!(eva["mother_id"], Value::Null);
    assert_eq!(eva["sex"], "female");

    let id = eva["id"].as_i64().unwrap();
    let resp = send(&app, "GET", &format!("/persons/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["birth_date"], "1980-05-01");
  }

  #[tokio::test]
  async fn create_accepts_parent_id_as_string() {
    let app = app().await;
    let karl = create(&app, json!({ "given_name": "Karl", "family_name": "Berger" })).await;
    let id = karl["id"].to_string();

    let eva = create(
      &app,
      json!({ "given_name": "Eva", "family_name": "Berger", "father_id": id }),
    )
    .await;
    assert_eq!(eva["father_id"], karl["id"]);
  }

  #[tokio::test]
  async fn create_rejects_blank_and_overlong_names() {
    let app = app().await;
    let resp = send(
      &app,
      "POST",
      "/persons",
      Some(json!({ "given_name": "  ", "family_name": "Berger" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let long = "x".repeat(101);
    let resp = send(
      &app,
      "POST",
      "/persons",
      Some(json!({ "given_name": "Eva", "family_name": long })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn create_rejects_unknown_parent() {
    let app = app().await;
    let resp = send(
      &app,
      "POST",
      "/persons",
      Some(json!({ "given_name": "Eva", "family_name": "Berger", "mother_id": 42 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "parent 42 does not exist");
  }

  #[tokio::test]
  async fn update_rejects_unknown_parent() {
    let app = app().await;
    let eva = create(&app, json!({ "given_name": "Eva", "family_name": "Berger" })).await;

    let uri = format!("/persons/{}", eva["id"]);
    let resp = send(&app, "PUT", &uri, Some(json!({ "father_id": 42 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, "GET", &uri, None).await;
    assert!(json_body(resp).await["father_id"].is_null());
  }

  #[tokio::test]
  async fn get_missing_person_is_404() {
    let app = app().await;
    let resp = send(&app, "GET", "/persons/999", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_is_ordered_by_name() {
    let app = app().await;
    create(&app, json!({ "given_name": "Zoe", "family_name": "Adler" })).await;
    create(&app, json!({ "given_name": "Bert", "family_name": "Zimmer" })).await;
    create(&app, json!({ "given_name": "Anna", "family_name": "Adler" })).await;

    let list = json_body(send(&app, "GET", "/persons", None).await).await;
    let given: Vec<_> = list
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["given_name"].as_str().unwrap())
      .collect();
    assert_eq!(given, vec!["Anna", "Zoe", "Bert"]);
  }

  #[tokio::test]
  async fn update_is_partial() {
    let app = app().await;
    let eva = create(
      &app,
      json!({ "given_name": "Eva", "family_name": "Berger", "birth_date": "1980-05-01" }),
    )
    .await;
    let uri = format!("/persons/{}", eva["id"]);

    let resp = send(&app, "PUT", &uri, Some(json!({ "family_name": "Huber" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["given_name"], "Eva");
    assert_eq!(updated["family_name"], "Huber");
    assert_eq!(updated["birth_date"], "1980-05-01");

    let resp = send(&app, "PUT", &uri, Some(json!({ "birth_date": null }))).await;
    assert_eq!(json_body(resp).await["birth_date"], Value::Null);
  }

  #[tokio::test]
  async fn update_rejects_empty_body_and_missing_person() {
    let app = app().await;
    let eva = create(&app, json!({ "given_name": "Eva", "family_name": "Berger" })).await;

    let uri = format!("/persons/{}", eva["id"]);
    let resp = send(&app, "PUT", &uri, Some(json!({}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, "PUT", "/persons/999", Some(json!({ "given_name": "X" }))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_rejects_self_as_parent() {
    let app = app().await;
    let eva = create(&app, json!({ "given_name": "Eva", "family_name": "Berger" })).await;

    let uri = format!("/persons/{}", eva["id"]);
    let resp = send(&app, "PUT", &uri, Some(json!({ "mother_id": eva["id"] }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn delete_reports_success_then_404() {
    let app = app().await;
    let eva = create(&app, json!({ "given_name": "Eva", "family_name": "Berger" })).await;
    let uri = format!("/persons/{}", eva["id"]);

    let resp = send(&app, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["id"], eva["id"]);

    let resp = send(&app, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn profile_lists_relatives() {
    let app = app().await;
    let karl = create(&app, json!({ "given_name": "Karl", "family_name": "Berger" })).await;
    let eva = create(
      &app,
      json!({ "given_name": "Eva", "family_name": "Berger", "father_id": karl["id"] }),
    )
    .await;
    create(
      &app,
      json!({ "given_name": "Paul", "family_name": "Berger", "father_id": karl["id"] }),
    )
    .await;

    let resp = send(&app, "GET", &format!("/persons/{}/profile", eva["id"]), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = json_body(resp).await;
    assert_eq!(profile["parents"]["father"]["given_name"], "Karl");
    assert_eq!(profile["parents"]["mother"], Value::Null);
    assert_eq!(profile["siblings"][0]["given_name"], "Paul");
    assert_eq!(profile["children"], json!([]));

    let resp = send(&app, "GET", "/persons/999/profile", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn search_matches_substring() {
    let app = app().await;
    create(&app, json!({ "given_name": "Maria", "family_name": "Schmidt" })).await;
    create(&app, json!({ "given_name": "Otto", "family_name": "Berg" })).await;

    let hits = json_body(send(&app, "GET", "/persons/search?q=schm", None).await).await;
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["given_name"], "Maria");
  }

  // ── Ancestor trees ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tree_nests_parents_and_omits_keys_at_leaves() {
    let app = app().await;
    let karl = create(&app, json!({ "given_name": "Karl", "family_name": "Berger" })).await;
    let eva = create(
      &app,
      json!({ "given_name": "Eva", "family_name": "Berger", "father_id": karl["id"] }),
    )
    .await;

    let uri = format!("/persons/{}/tree?depth=1", eva["id"]);
    let tree = json_body(send(&app, "GET", &uri, None).await).await;
    assert_eq!(tree["given_name"], "Eva");
    assert_eq!(tree["father"]["given_name"], "Karl");
    assert_eq!(tree["mother"], Value::Null);
    assert!(tree["father"].get("father").is_none());

    let uri = format!("/persons/{}/tree?depth=0", eva["id"]);
    let leaf = json_body(send(&app, "GET", &uri, None).await).await;
    assert!(leaf.get("father").is_none());
    assert!(leaf.get("mother").is_none());
  }

  #[tokio::test]
  async fn tree_rejects_depth_above_limit_and_missing_root() {
    let app = app().await;
    let eva = create(&app, json!({ "given_name": "Eva", "family_name": "Berger" })).await;

    let uri = format!("/persons/{}/tree?depth=11", eva["id"]);
    let resp = send(&app, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, "GET", "/persons/999/tree", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn chart_is_a_pdf_attachment() {
    let app = app().await;
    let maria = create(
      &app,
      json!({ "given_name": "Maria", "family_name": "Huber", "birth_date": "1931-12-04" }),
    )
    .await;
    let eva = create(
      &app,
      json!({ "given_name": "Eva", "family_name": "Berger", "mother_id": maria["id"] }),
    )
    .await;
    let id = eva["id"].as_i64().unwrap();

    let resp = send(&app, "GET", &format!("/persons/{id}/chart"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      format!("attachment; filename=stammbaum_{id}.pdf").as_str(),
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let resp = send(&app, "GET", "/persons/999/chart", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
