//! Handler for `GET /persons/search`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use stammbaum_core::{
  person::Person,
  store::{PersonQuery, PersonStore},
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  /// Substring matched against given and family name, ignoring case.
  pub q: String,
}

/// `GET /persons/search?q=...`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore,
{
  let query = PersonQuery::new(params.q);
  let persons = state
    .store
    .search_persons(&query)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(text = %query.text, hits = persons.len(), "searched persons");
  Ok(Json(persons))
}
