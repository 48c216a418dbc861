//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons` | All persons, by family then given name |
//! | `POST`   | `/persons` | Body: [`NewPersonBody`]; returns 201 + stored person |
//! | `GET`    | `/persons/:id` | 404 if not found |
//! | `PUT`    | `/persons/:id` | Body: [`PatchBody`]; only the keys present are written |
//! | `DELETE` | `/persons/:id` | `{"status":"success","id":id}` |
//! | `GET`    | `/persons/:id/profile` | Parents, siblings and children |
//!
//! Parent ids may be sent as numbers or strings; `0` and `""` mean "no
//! parent". A parent that does not exist is a 400, reported by the store.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use stammbaum_core::{
  person::{NewPerson, Person, PersonId, PersonPatch, PersonProfile, Sex},
  store::PersonStore,
};

use crate::{ApiState, error::ApiError};

/// Longest accepted given or family name, in characters.
pub const MAX_NAME_LEN: usize = 100;

// ─── Body decoding ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum ParentRef {
  Id(i64),
  Text(String),
}

/// Decode a parent reference; `null`, `0` and `""` all decode to `None`.
fn parent_ref<'de, D>(d: D) -> Result<Option<PersonId>, D::Error>
where
  D: Deserializer<'de>,
{
  let id = match Option::<ParentRef>::deserialize(d)? {
    None => return Ok(None),
    Some(ParentRef::Id(id)) => id,
    Some(ParentRef::Text(s)) if s.trim().is_empty() => return Ok(None),
    Some(ParentRef::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom)?,
  };
  Ok((id != 0).then_some(PersonId(id)))
}

/// Like [`parent_ref`], but distinguishes an absent key from an explicit
/// "no parent".
fn patch_parent_ref<'de, D>(d: D) -> Result<Option<Option<PersonId>>, D::Error>
where
  D: Deserializer<'de>,
{
  parent_ref(d).map(Some)
}

/// Marks a present key, so `null` becomes `Some(None)`.
fn present<'de, T, D>(d: D) -> Result<Option<T>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  T::deserialize(d).map(Some)
}

fn validate_name(field: &str, value: String) -> Result<String, ApiError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ApiError::BadRequest(format!("{field} must not be empty")));
  }
  if trimmed.chars().count() > MAX_NAME_LEN {
    return Err(ApiError::BadRequest(format!(
      "{field} must be at most {MAX_NAME_LEN} characters"
    )));
  }
  Ok(trimmed.to_owned())
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /persons`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore,
{
  let persons = state.store.list_persons().await.map_err(ApiError::store)?;
  Ok(Json(persons))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /persons`.
#[derive(Debug, Deserialize)]
pub struct NewPersonBody {
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<NaiveDate>,
  pub sex:         Option<Sex>,
  #[serde(default, deserialize_with = "parent_ref")]
  pub father_id:   Option<PersonId>,
  #[serde(default, deserialize_with = "parent_ref")]
  pub mother_id:   Option<PersonId>,
}

/// `POST /persons`: returns 201 + the stored [`Person`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPersonBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  let input = NewPerson {
    given_name:  validate_name("given_name", body.given_name)?,
    family_name: validate_name("family_name", body.family_name)?,
    birth_date:  body.birth_date,
    sex:         body.sex,
    father_id:   body.father_id,
    mother_id:   body.mother_id,
  };
  let person = state.store.create_person(input).await.map_err(ApiError::store)?;
  tracing::info!(person = %person.id, "created person");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let person = state
    .store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /persons/:id`. Absent keys are left untouched;
/// `null` clears a nullable field.
#[derive(Debug, Default, Deserialize)]
pub struct PatchBody {
  pub given_name:  Option<String>,
  pub family_name: Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub birth_date:  Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "present")]
  pub sex:         Option<Option<Sex>>,
  #[serde(default, deserialize_with = "patch_parent_ref")]
  pub father_id:   Option<Option<PersonId>>,
  #[serde(default, deserialize_with = "patch_parent_ref")]
  pub mother_id:   Option<Option<PersonId>>,
}

impl PatchBody {
  fn into_patch(self) -> Result<PersonPatch, ApiError> {
    Ok(PersonPatch {
      given_name:  self.given_name.map(|n| validate_name("given_name", n)).transpose()?,
      family_name: self.family_name.map(|n| validate_name("family_name", n)).transpose()?,
      birth_date:  self.birth_date,
      sex:         self.sex,
      father_id:   self.father_id,
      mother_id:   self.mother_id,
    })
  }
}

/// `PUT /persons/:id`: returns the updated [`Person`].
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PersonId>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let patch = body.into_patch()?;
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".into()));
  }
  if patch.parent_ids().any(|parent| parent == id) {
    return Err(ApiError::BadRequest(format!("person {id} cannot be its own parent")));
  }

  let person = state
    .store
    .update_person(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  tracing::info!(person = %id, "updated person");
  Ok(Json(person))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /persons/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PersonId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  if !state.store.delete_person(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("person {id} not found")));
  }
  tracing::info!(person = %id, "deleted person");
  Ok(Json(json!({ "status": "success", "id": id })))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /persons/:id/profile`
pub async fn profile<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PersonId>,
) -> Result<Json<PersonProfile>, ApiError>
where
  S: PersonStore,
{
  let profile = state
    .store
    .profile(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(profile))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn parent_refs_accept_numbers_strings_and_blanks() {
    let body: NewPersonBody = serde_json::from_value(json!({
      "given_name": "Eva", "family_name": "Berger", "father_id": "7", "mother_id": 0
    }))
    .unwrap();
    assert_eq!(body.father_id, Some(PersonId(7)));
    assert_eq!(body.mother_id, None);

    let body: NewPersonBody =
      serde_json::from_value(json!({ "given_name": "Eva", "family_name": "Berger" })).unwrap();
    assert_eq!(body.father_id, None);
  }

  #[test]
  fn patch_distinguishes_absent_from_cleared() {
    let body: PatchBody =
      serde_json::from_value(json!({ "father_id": "", "birth_date": null })).unwrap();
    assert_eq!(body.father_id, Some(None));
    assert_eq!(body.birth_date, Some(None));
    assert_eq!(body.mother_id, None);
    assert_eq!(body.sex, None);
  }

  #[test]
  fn garbage_parent_ref_is_rejected() {
    let err = serde_json::from_value::<PatchBody>(json!({ "mother_id": "abc" }));
    assert!(err.is_err());
  }

  #[test]
  fn names_are_trimmed_and_bounded() {
    assert_eq!(validate_name("given_name", "  Eva ".into()).unwrap(), "Eva");
    assert!(validate_name("given_name", "".into()).is_err());
    assert!(validate_name("given_name", "ä".repeat(MAX_NAME_LEN)).is_ok());
    assert!(validate_name("given_name", "ä".repeat(MAX_NAME_LEN + 1)).is_err());
  }
}
